//! Integration tests against real SQLite databases (in-memory and on
//! disk).

use cardsort_core::SortDirection;
use cardsort_storage::models::{RuleAttribute, RuleOperator, ScannedCard, SortingRule};
use cardsort_storage::{
    CardFilter, CardProfile, Database, DatabaseConfig, ScannedCardRepository,
    SortingRuleRepository, SqliteScannedCardRepository, SqliteSortingRuleRepository,
    evaluate_rules,
};

async fn repos() -> (
    Database,
    SqliteScannedCardRepository,
    SqliteSortingRuleRepository,
) {
    let db = Database::in_memory().await.unwrap();
    let cards = SqliteScannedCardRepository::new(db.pool().clone());
    let rules = SqliteSortingRuleRepository::new(db.pool().clone());
    (db, cards, rules)
}

#[tokio::test]
async fn test_add_and_fetch_scanned_card() {
    let (_db, cards, _rules) = repos().await;

    let card = ScannedCard::new(Some("Sol Ring".to_string()), SortDirection::Right)
        .with_ocr_raw("Sol Ring")
        .with_price(1.5)
        .with_cmc(1.0)
        .with_color_identity("C")
        .with_type_line("Artifact");

    let id = cards.add(&card).await.unwrap();
    assert!(id > 0);

    let fetched = cards.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(fetched.name.as_deref(), Some("Sol Ring"));
    assert_eq!(fetched.price, Some(1.5));
    assert_eq!(fetched.direction(), SortDirection::Right);
}

#[tokio::test]
async fn test_unrecognized_card_round_trips_null_name() {
    let (_db, cards, _rules) = repos().await;

    let id = cards
        .add(&ScannedCard::new(None, SortDirection::Left).with_ocr_raw("S0l R1ng"))
        .await
        .unwrap();

    let fetched = cards.find_by_id(id).await.unwrap().unwrap();
    assert!(!fetched.is_recognized());
    assert_eq!(fetched.ocr_name_raw.as_deref(), Some("S0l R1ng"));
}

#[tokio::test]
async fn test_list_with_color_filter() {
    let (_db, cards, _rules) = repos().await;

    for (name, colors) in [("Island", "U"), ("Lightning Bolt", "R"), ("Azorius Charm", "WU")] {
        cards
            .add(
                &ScannedCard::new(Some(name.to_string()), SortDirection::Right)
                    .with_color_identity(colors),
            )
            .await
            .unwrap();
    }

    let blue = cards
        .list(&CardFilter::all().with_color("U"))
        .await
        .unwrap();
    let names: Vec<_> = blue.iter().filter_map(|c| c.name.as_deref()).collect();
    assert_eq!(blue.len(), 2);
    assert!(names.contains(&"Island"));
    assert!(names.contains(&"Azorius Charm"));
}

#[tokio::test]
async fn test_list_with_price_and_cmc_filters() {
    let (_db, cards, _rules) = repos().await;

    for (name, price, cmc) in [("Cheap", 0.5, 1.0), ("Mid", 5.0, 3.0), ("Pricy", 50.0, 6.0)] {
        cards
            .add(
                &ScannedCard::new(Some(name.to_string()), SortDirection::Right)
                    .with_price(price)
                    .with_cmc(cmc),
            )
            .await
            .unwrap();
    }

    let filtered = cards
        .list(&CardFilter::all().with_min_price(1.0).with_max_cmc(4.0))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name.as_deref(), Some("Mid"));
}

#[tokio::test]
async fn test_delete_card() {
    let (_db, cards, _rules) = repos().await;

    let id = cards
        .add(&ScannedCard::new(Some("Test".to_string()), SortDirection::Left))
        .await
        .unwrap();
    assert_eq!(cards.count().await.unwrap(), 1);

    assert!(cards.delete(id).await.unwrap());
    assert_eq!(cards.count().await.unwrap(), 0);

    // Deleting a missing row reports false, not an error.
    assert!(!cards.delete(9999).await.unwrap());
}

#[tokio::test]
async fn test_sorting_rule_crud() {
    let (_db, _cards, rules) = repos().await;

    let id = rules
        .add(&SortingRule::new(
            "High CMC Cards",
            RuleAttribute::Cmc,
            RuleOperator::Gt,
            "3",
            SortDirection::Left,
        ))
        .await
        .unwrap();

    let stored = rules.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "High CMC Cards");
    assert_eq!(stored[0].attribute(), Some(RuleAttribute::Cmc));
    assert_eq!(stored[0].operator(), Some(RuleOperator::Gt));
    assert_eq!(stored[0].direction(), Some(SortDirection::Left));

    assert!(rules.delete(id).await.unwrap());
    assert!(rules.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rules_evaluate_in_insertion_order() {
    let (_db, _cards, rules) = repos().await;

    rules
        .add(&SortingRule::new(
            "High CMC",
            RuleAttribute::Cmc,
            RuleOperator::Gt,
            "5",
            SortDirection::Left,
        ))
        .await
        .unwrap();
    rules
        .add(&SortingRule::new(
            "Expensive",
            RuleAttribute::Price,
            RuleOperator::Ge,
            "50.0",
            SortDirection::Right,
        ))
        .await
        .unwrap();

    let stored = rules.list().await.unwrap();

    let both_match = CardProfile {
        name: Some("Both".to_string()),
        cmc: Some(7.0),
        price: Some(60.0),
        ..CardProfile::default()
    };
    // First rule wins even though the second also matches.
    assert_eq!(evaluate_rules(&stored, &both_match), SortDirection::Left);
}

#[tokio::test]
async fn test_on_disk_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.db");
    let path_str = path.to_str().unwrap().to_string();

    {
        let db = Database::new(DatabaseConfig::new(path_str.clone()))
            .await
            .unwrap();
        let cards = SqliteScannedCardRepository::new(db.pool().clone());
        cards
            .add(&ScannedCard::new(Some("Persisted".to_string()), SortDirection::Right))
            .await
            .unwrap();
        db.close().await;
    }

    let db = Database::new(DatabaseConfig::new(path_str)).await.unwrap();
    let cards = SqliteScannedCardRepository::new(db.pool().clone());
    assert_eq!(cards.count().await.unwrap(), 1);
    db.close().await;
}
