//! Config → record reconciliation over real files.

#![allow(clippy::unwrap_used)]

use qwerty_town_core::BusinessId;
use qwerty_town_integration_tests::TestContext;
use qwerty_town_web::store::{StoreError, sync_configs};
use serde_json::json;

fn write(path: &std::path::Path, value: &serde_json::Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn coffee_menu(title: &str) -> serde_json::Value {
    json!({
        "menu_title": title,
        "categories": [{"id": "coffee", "name": "Coffee", "items": [
            {"id": "latte", "name": "Latte", "price": 3.5}
        ]}]
    })
}

#[tokio::test]
async fn sync_updates_stale_records_and_counts_the_rest() {
    let ctx = TestContext::new();
    ctx.seed_business("stale", "Stale Cafe").await;
    ctx.seed_business("current", "Current Cafe").await;
    ctx.seed_business("plain", "Plain Cafe").await;

    // Give "current" the same menu its config will carry
    ctx.store()
        .save_menu(
            &BusinessId::parse("current").unwrap(),
            serde_json::from_value(coffee_menu("Our menu")).unwrap(),
        )
        .await
        .unwrap();

    let configs = ctx.dir.path().join("configs");
    write(
        &configs.join("stale.json"),
        &json!({"business_id": "stale", "panels": {}, "menu": coffee_menu("Drinks")}),
    );
    write(
        &configs.join("plain.json"),
        &json!({"business_id": "plain", "panels": {"map": false}}),
    );
    write(
        &configs.join("orphan.json"),
        &json!({"business_id": "orphan", "panels": {}, "menu": coffee_menu("X")}),
    );
    std::fs::write(configs.join("broken.json"), b"{not json").unwrap();

    let report = sync_configs(ctx.store()).await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.missing, 1);
    assert_eq!(report.failed, 1);

    let stale = ctx
        .store()
        .businesses()
        .get(&BusinessId::parse("stale").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stale.menu.title(), "Drinks");
    assert_eq!(stale.menu.item_count(), 1);

    let records = ctx.store().businesses().load_all().await.unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn sync_without_changes_leaves_file_untouched() {
    let ctx = TestContext::new();
    ctx.seed_business("plain", "Plain Cafe").await;
    let configs = ctx.dir.path().join("configs");
    write(&configs.join("plain.json"), &json!({"business_id": "plain"}));

    let path = ctx.store().businesses().path().to_path_buf();
    let before = std::fs::metadata(&path).unwrap().modified().unwrap();

    let report = sync_configs(ctx.store()).await.unwrap();
    assert_eq!(report.updated, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[tokio::test]
async fn sync_requires_data_files() {
    let ctx = TestContext::new();

    let err = sync_configs(ctx.store()).await.unwrap_err();
    assert!(matches!(err, StoreError::Missing(_)));

    ctx.seed_business("plain", "Plain Cafe").await;
    let err = sync_configs(ctx.store()).await.unwrap_err();
    assert!(matches!(err, StoreError::Missing(ref dir) if dir.ends_with("configs")));
}
