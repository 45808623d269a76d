use foodhub::{Db, Error, ExistingIndex, IndexCatalog, IndexSpec, Outcome, SkipReason};
use foodhub_driver_memory::Memory;
use pretty_assertions::assert_eq;
use serde_json::json;

fn users_catalog() -> IndexCatalog {
    IndexCatalog::new([IndexSpec::new("users").asc("email").unique()]).unwrap()
}

fn outcomes(report: &foodhub::ProvisionReport) -> Vec<String> {
    report.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn end_to_end_users_email() {
    let driver = Memory::new();
    let db = Db::new(driver.clone());
    let catalog = users_catalog();

    // Empty collection: created
    let report = db.ensure_indexes(&catalog).await;
    assert_eq!(outcomes(&report), ["users.email_1: created"]);

    // Second run: nothing to do
    let report = db.ensure_indexes(&catalog).await;
    assert_eq!(outcomes(&report), ["users.email_1: skipped-existing"]);

    // Dirty data, index dropped: the constraint can no longer be built
    driver.drop_index("users", "email_1").unwrap();
    driver.insert("users", json!({ "email": "a@example.com", "name": "An" })).unwrap();
    driver.insert("users", json!({ "email": "a@example.com", "name": "Binh" })).unwrap();

    let report = db.ensure_indexes(&catalog).await;
    let entry = report.get("users", "email_1").unwrap();
    assert!(matches!(
        entry.outcome,
        Outcome::SkippedError(SkipReason::DuplicateDataViolation(_))
    ));

    // The collection is left as it was
    assert_eq!(driver.documents("users").len(), 2);
    assert_eq!(driver.index_count("users"), 1);
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let driver = Memory::new();
    let db = Db::new(driver.clone());
    let catalog = IndexCatalog::food_delivery();

    let first = db.ensure_indexes(&catalog).await;
    assert_eq!(first.len(), catalog.len());
    assert_eq!(first.created(), catalog.len());
    assert!(first.is_clean());

    let calls = driver.create_calls();
    let second = db.ensure_indexes(&catalog).await;

    assert_eq!(second.len(), catalog.len());
    assert_eq!(second.skipped_existing(), catalog.len());
    assert_eq!(driver.create_calls(), calls);
}

#[tokio::test]
async fn equal_keys_under_another_name_satisfy() {
    let driver = Memory::new();
    driver
        .seed_index(&IndexSpec::new("users").asc("email").named("A"))
        .unwrap();

    let db = Db::new(driver.clone());
    let catalog = IndexCatalog::new([IndexSpec::new("users").asc("email").named("B")]).unwrap();
    let report = db.ensure_indexes(&catalog).await;

    assert_eq!(outcomes(&report), ["users.B: skipped-existing"]);
    assert_eq!(driver.create_calls(), 0);
    assert_eq!(driver.index_count("users"), 2);
}

#[tokio::test]
async fn failure_is_isolated_to_its_entry() {
    let driver = Memory::new();
    driver.insert("payments", json!({ "orderId": 7, "userId": 1 })).unwrap();
    driver.insert("payments", json!({ "orderId": 7, "userId": 2 })).unwrap();

    let catalog = IndexCatalog::new([
        IndexSpec::new("users").asc("email").unique(),
        IndexSpec::new("orders").asc("userId"),
        IndexSpec::new("payments").asc("orderId").unique(),
        IndexSpec::new("payments").asc("userId"),
        IndexSpec::new("cart").asc("userId").unique(),
    ])
    .unwrap();

    let report = Db::new(driver.clone()).ensure_indexes(&catalog).await;

    assert_eq!(report.len(), 5);
    assert_eq!(report.created(), 4);
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].collection, "payments");
    assert_eq!(errors[0].index, "orderId_1");
    assert!(!report.aborted());
}

#[tokio::test]
async fn explicit_name_taken_by_other_keys() {
    let driver = Memory::new();
    driver
        .seed_index(&IndexSpec::new("orders").asc("customerId").named("by_user"))
        .unwrap();

    let catalog =
        IndexCatalog::new([IndexSpec::new("orders").asc("userId").named("by_user")]).unwrap();
    let report = Db::new(driver.clone()).ensure_indexes(&catalog).await;

    let outcome = &report.get("orders", "by_user").unwrap().outcome;
    assert!(matches!(outcome, Outcome::SkippedError(SkipReason::NameConflict(_))));
    assert_eq!(
        outcome.to_string(),
        "skipped-error(name-conflict: index `by_user` on `orders` already exists with keys [customerId asc])"
    );
    assert_eq!(driver.create_calls(), 0);
}

#[tokio::test]
async fn conflict_from_concurrent_creator_is_satisfied() {
    let driver = Memory::new();

    // Another instance creates the same keys under its own name between our
    // listing and our create call
    let theirs = ExistingIndex {
        unique: true,
        ..ExistingIndex::new("users_email", IndexSpec::new("users").asc("email").fields)
    };
    driver.race_next_create("users", theirs);

    let report = Db::new(driver.clone()).ensure_indexes(&users_catalog()).await;

    assert_eq!(outcomes(&report), ["users.email_1: skipped-existing"]);
    assert_eq!(driver.create_calls(), 1);
    assert_eq!(driver.index_count("users"), 2);
}

#[tokio::test]
async fn two_instances_interleave_and_converge() {
    let shared = Memory::new();
    let a = Db::new(shared.clone());
    let b = Db::new(shared.clone());
    let catalog = IndexCatalog::food_delivery();

    let (ra, rb) = tokio::join!(a.ensure_indexes(&catalog), b.ensure_indexes(&catalog));

    assert!(ra.is_clean(), "{ra}");
    assert!(rb.is_clean(), "{rb}");
    assert_eq!(ra.len(), catalog.len());
    assert_eq!(rb.len(), catalog.len());

    // Both passes listed before either created, and identical creates are
    // accepted by the server
    assert!(ra.created() + rb.created() > catalog.len());

    // `_id_` plus one index per catalog entry on each collection
    assert_eq!(shared.index_count("orders"), 9);
}

#[tokio::test]
async fn conflicting_text_index_is_reported() {
    let driver = Memory::new();
    driver
        .seed_index(&IndexSpec::new("restaurants").text("description"))
        .unwrap();

    let catalog = IndexCatalog::new([IndexSpec::new("restaurants").text("name")]).unwrap();
    let report = Db::new(driver).ensure_indexes(&catalog).await;

    let outcome = &report.get("restaurants", "name_text").unwrap().outcome;
    assert!(matches!(outcome, Outcome::SkippedError(SkipReason::NameConflict(_))));
}

#[tokio::test]
async fn unclassified_errors_are_absorbed() {
    let driver = Memory::new();
    driver.fail_next_create("orders", foodhub::err!("not authorized on shop to execute command"));

    let catalog = IndexCatalog::new([
        IndexSpec::new("orders").asc("userId"),
        IndexSpec::new("orders").asc("status"),
    ])
    .unwrap();
    let report = Db::new(driver).ensure_indexes(&catalog).await;

    assert_eq!(
        outcomes(&report),
        [
            "orders.userId_1: skipped-error(unclassified-database-error: not authorized on shop to execute command)",
            "orders.status_1: created",
        ]
    );
}

#[tokio::test]
async fn unreachable_database_aborts_remaining_entries() {
    let driver = Memory::new();
    driver.set_reachable(false);

    let catalog = IndexCatalog::food_delivery();
    let report = Db::new(driver.clone()).ensure_indexes(&catalog).await;

    assert_eq!(report.len(), catalog.len());
    assert!(report.aborted());
    assert!(report.iter().all(|e| matches!(
        e.outcome,
        Outcome::SkippedError(SkipReason::TransientConnectivityFailure(_))
    )));
    assert_eq!(driver.create_calls(), 0);
}

#[tokio::test]
async fn connectivity_lost_mid_pass() {
    let driver = Memory::new();
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection reset");
    driver.fail_next_create("orders", Error::connectivity(io));

    let catalog = IndexCatalog::new([
        IndexSpec::new("users").asc("email").unique(),
        IndexSpec::new("orders").asc("userId"),
        IndexSpec::new("payments").asc("userId"),
    ])
    .unwrap();
    let report = Db::new(driver.clone()).ensure_indexes(&catalog).await;

    assert_eq!(
        outcomes(&report),
        [
            "users.email_1: created",
            "orders.userId_1: skipped-error(transient-connectivity-failure: database unreachable: connection reset)",
            "payments.userId_1: skipped-error(transient-connectivity-failure: database unreachable (see orders.userId_1))",
        ]
    );
    assert!(report.aborted());
    assert_eq!(driver.create_calls(), 2);
}

#[tokio::test]
async fn listing_failure_carries_context() {
    let driver = Memory::new();
    driver.set_reachable(false);

    let report = Db::new(driver).ensure_indexes(&users_catalog()).await;
    let reason = report.iter().next().unwrap().outcome.skip_reason().unwrap();

    assert_eq!(
        reason.detail(),
        "listing indexes on `users`: database unreachable: connection refused"
    );
}

#[tokio::test]
async fn skipped_entries_name_the_first_failure() {
    let driver = Memory::new();
    driver.set_reachable(false);

    let catalog = IndexCatalog::new([
        IndexSpec::new("users").asc("email").unique(),
        IndexSpec::new("orders").asc("userId"),
    ])
    .unwrap();
    let report = Db::new(driver).ensure_indexes(&catalog).await;

    assert_eq!(
        outcomes(&report),
        [
            "users.email_1: skipped-error(transient-connectivity-failure: listing indexes on `users`: database unreachable: connection refused)",
            "orders.userId_1: skipped-error(transient-connectivity-failure: database unreachable (see users.email_1))",
        ]
    );
}
