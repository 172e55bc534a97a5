#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::SortingRule;
use sqlx::SqlitePool;

/// Repository trait for sorting rules.
pub trait SortingRuleRepository: Send + Sync {
    /// Persist a rule, returning its new id.
    async fn add(&self, rule: &SortingRule) -> StorageResult<i64>;

    /// Fetch all rules in evaluation (insertion) order.
    async fn list(&self) -> StorageResult<Vec<SortingRule>>;

    /// Delete a rule by id. Returns `true` if a row was removed.
    async fn delete(&self, id: i64) -> StorageResult<bool>;
}

/// SQLite implementation of [`SortingRuleRepository`].
pub struct SqliteSortingRuleRepository {
    pool: SqlitePool,
}

impl SqliteSortingRuleRepository {
    /// Create a new SQLite sorting-rule repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SortingRuleRepository for SqliteSortingRuleRepository {
    async fn add(&self, rule: &SortingRule) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO sorting_rules
                (name, attribute, operator, value, sort_direction, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&rule.name)
        .bind(&rule.attribute)
        .bind(&rule.operator)
        .bind(&rule.value)
        .bind(&rule.sort_direction)
        .bind(rule.created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, name = %rule.name, "sorting rule stored");
        Ok(id)
    }

    async fn list(&self) -> StorageResult<Vec<SortingRule>> {
        let rules = sqlx::query_as::<_, SortingRule>(
            r#"
            SELECT id, name, attribute, operator, value, sort_direction, created_at
            FROM sorting_rules
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM sorting_rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
