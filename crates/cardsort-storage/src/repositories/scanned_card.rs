#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::{CardFilter, ScannedCard};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Repository trait for scanned-card records.
pub trait ScannedCardRepository: Send + Sync {
    /// Persist a scanned card, returning its new id.
    async fn add(&self, card: &ScannedCard) -> StorageResult<i64>;

    /// Fetch cards matching the filter, newest first.
    async fn list(&self, filter: &CardFilter) -> StorageResult<Vec<ScannedCard>>;

    /// Fetch one card by id.
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<ScannedCard>>;

    /// Delete a card by id. Returns `true` if a row was removed.
    async fn delete(&self, id: i64) -> StorageResult<bool>;

    /// Total number of stored cards.
    async fn count(&self) -> StorageResult<i64>;
}

/// SQLite implementation of [`ScannedCardRepository`].
pub struct SqliteScannedCardRepository {
    pool: SqlitePool,
}

impl SqliteScannedCardRepository {
    /// Create a new SQLite scanned-card repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, ocr_name_raw, price, cmc, color_identity, \
     type_line, image_uri, sorted_direction, scanned_at FROM scanned_cards";

impl ScannedCardRepository for SqliteScannedCardRepository {
    async fn add(&self, card: &ScannedCard) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO scanned_cards
                (name, ocr_name_raw, price, cmc, color_identity,
                 type_line, image_uri, sorted_direction, scanned_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&card.name)
        .bind(&card.ocr_name_raw)
        .bind(card.price)
        .bind(card.cmc)
        .bind(&card.color_identity)
        .bind(&card.type_line)
        .bind(&card.image_uri)
        .bind(&card.sorted_direction)
        .bind(card.scanned_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, name = card.name.as_deref().unwrap_or("<unrecognized>"),
            "scanned card stored");
        Ok(id)
    }

    async fn list(&self, filter: &CardFilter) -> StorageResult<Vec<ScannedCard>> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_COLUMNS);

        let mut prefix = " WHERE ";
        if let Some(color) = &filter.color {
            builder
                .push(prefix)
                .push("color_identity LIKE ")
                .push_bind(format!("%{}%", color));
            prefix = " AND ";
        }
        if let Some(min_price) = filter.min_price {
            builder
                .push(prefix)
                .push("price >= ")
                .push_bind(min_price);
            prefix = " AND ";
        }
        if let Some(max_cmc) = filter.max_cmc {
            builder.push(prefix).push("cmc <= ").push_bind(max_cmc);
        }

        builder.push(" ORDER BY scanned_at DESC, id DESC");

        let cards = builder
            .build_query_as::<ScannedCard>()
            .fetch_all(&self.pool)
            .await?;
        Ok(cards)
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<Option<ScannedCard>> {
        let card = sqlx::query_as::<_, ScannedCard>(
            r#"
            SELECT id, name, ocr_name_raw, price, cmc, color_identity,
                   type_line, image_uri, sorted_direction, scanned_at
            FROM scanned_cards
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM scanned_cards WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> StorageResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scanned_cards")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
