//! Reconciliation pass: copy every config menu into its business record.

use qwerty_town_core::{BusinessId, MenuSync, PanelConfig, SyncReport, sync_menu};

use super::{DataStore, StoreError, read_json};

/// Replay [`sync_menu`] for every config file on disk.
///
/// The business id is taken from the config file name. Configs without a
/// record are counted as `missing`; unreadable configs are logged and counted
/// as `failed`. `businesses.json` is rewritten only if a record changed.
///
/// # Errors
///
/// Returns `StoreError::Missing` if `businesses.json` or the configs
/// directory does not exist, and any error from reading or writing the
/// records file.
#[tracing::instrument(skip(store), fields(businesses = %store.businesses().path().display()))]
pub async fn sync_configs(store: &DataStore) -> Result<SyncReport, StoreError> {
    let businesses = store.businesses();
    if !businesses.exists().await {
        return Err(StoreError::Missing(businesses.path().to_path_buf()));
    }

    let files = store.configs().list().await?;
    tracing::info!(count = files.len(), "Found config files");

    let mut report = SyncReport::default();
    let mut configs: Vec<(BusinessId, PanelConfig)> = Vec::with_capacity(files.len());
    for (stem, path) in files {
        let id = match BusinessId::parse(&stem) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Config file name is not a business id");
                report.failed += 1;
                continue;
            }
        };
        match read_json::<PanelConfig>(&path).await {
            Ok(Some(config)) => configs.push((id, config)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(business_id = %id, error = %e, "Skipping unreadable config");
                report.failed += 1;
            }
        }
    }

    let report = businesses
        .modify_all(|map| {
            for (id, config) in &configs {
                let Some(business) = map.get_mut(id) else {
                    tracing::warn!(business_id = %id, "Config has no matching business record");
                    report.missing += 1;
                    continue;
                };

                let outcome = sync_menu(business, config);
                match outcome {
                    MenuSync::CategoriesUpdated => tracing::info!(
                        business_id = %id,
                        categories = business.menu.categories.len(),
                        items = business.menu.item_count(),
                        "Menu replaced from config"
                    ),
                    MenuSync::TitleUpdated => tracing::info!(
                        business_id = %id,
                        title = business.menu.title(),
                        "Menu title updated from config"
                    ),
                    MenuSync::Unchanged | MenuSync::NoMenu => {
                        tracing::debug!(business_id = %id, ?outcome, "Menu already current");
                    }
                }
                report.record(outcome);
            }
            (report.updated > 0, report)
        })
        .await?;

    tracing::info!(
        updated = report.updated,
        skipped = report.skipped,
        missing = report.missing,
        failed = report.failed,
        "Config sync complete"
    );
    Ok(report)
}
