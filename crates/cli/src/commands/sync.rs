//! Config → record menu reconciliation.

use std::path::PathBuf;

use qwerty_town_core::SyncReport;
use qwerty_town_web::store::{DataStore, sync_configs};

use super::{CommandError, data_dir};

/// Copy each config's menu into its business record and print the tally.
///
/// # Errors
///
/// Returns an error if `businesses.json` or the configs directory is
/// missing, or the records file cannot be read or written.
pub async fn run(data_dir_flag: Option<PathBuf>) -> Result<SyncReport, CommandError> {
    let data_dir = data_dir(data_dir_flag)?;
    tracing::info!(data_dir = %data_dir.display(), "Synchronizing configs");

    let store = DataStore::new(&data_dir);
    let report = sync_configs(&store).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Synchronization finished:");
        println!("  updated: {}", report.updated);
        println!("  unchanged: {}", report.skipped);
        println!("  no matching record: {}", report.missing);
        println!("  unreadable: {}", report.failed);
    }

    Ok(report)
}
