//! Runs against a live MongoDB when `FOODHUB_TEST_MONGODB_URI` is set, e.g.
//! `FOODHUB_TEST_MONGODB_URI=mongodb://localhost:27017 cargo test -p foodhub`.
//! Skipped otherwise.
#![cfg(feature = "mongodb")]

use foodhub::{Config, Db, IndexCatalog, IndexSpec, MongoDb, Outcome, SkipReason};

const URI_VAR: &str = "FOODHUB_TEST_MONGODB_URI";

async fn setup(test: &str) -> Option<(MongoDb, Db)> {
    let uri = std::env::var(URI_VAR).ok()?;
    let database = format!("foodhub_test_{test}_{}", std::process::id());

    let driver = MongoDb::connect_with_database(&uri, Some(&database))
        .await
        .unwrap();
    driver.database().drop().await.unwrap();

    Some((driver.clone(), Db::new(driver)))
}

#[tokio::test]
async fn provisions_against_live_server() {
    let Some((driver, db)) = setup("provision").await else {
        return;
    };

    assert!(db.ping().await);

    let catalog = IndexCatalog::food_delivery();
    let first = db.ensure_indexes(&catalog).await;
    assert!(first.is_clean(), "{first:?}");
    assert_eq!(first.created(), catalog.len());

    let second = db.ensure_indexes(&catalog).await;
    assert_eq!(second.skipped_existing(), catalog.len());

    driver.database().drop().await.unwrap();
    db.close().await.unwrap();
}

#[tokio::test]
async fn duplicate_data_on_live_server() {
    let Some((driver, db)) = setup("duplicates").await else {
        return;
    };

    let users = driver.collection_named::<bson::Document>("users");
    users
        .insert_many([
            bson::doc! { "email": "a@example.com" },
            bson::doc! { "email": "a@example.com" },
        ])
        .await
        .unwrap();

    let catalog = IndexCatalog::new([IndexSpec::new("users").asc("email").unique()]).unwrap();
    let report = db.ensure_indexes(&catalog).await;

    assert!(matches!(
        report.get("users", "email_1").unwrap().outcome,
        Outcome::SkippedError(SkipReason::DuplicateDataViolation(_))
    ));
    assert_eq!(users.count_documents(bson::doc! {}).await.unwrap(), 2);

    driver.database().drop().await.unwrap();
    db.close().await.unwrap();
}

#[tokio::test]
async fn unreachable_server_pings_false() {
    if std::env::var(URI_VAR).is_err() {
        return;
    }

    let config = Config::new("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200");
    let db = Db::connect(&config).await.unwrap();

    assert!(!db.ping().await);
}
