//! Copy JSON records into the `companies` table.
//!
//! Records that already carry a `company_id` are skipped, and unlinked
//! records that match an existing row are linked to it instead of inserted
//! again, so the command can be re-run after a partial failure.

use std::collections::BTreeMap;
use std::path::PathBuf;

use qwerty_town_core::{Business, BusinessId, CompanyId};
use qwerty_town_web::db::{self, Company, CompanyRepository, NewCompany};
use qwerty_town_web::store::{BusinessMap, DataStore};

use super::{CommandError, data_dir, database_url};

/// Insert a `companies` row for every record without one and write the new
/// ids back to `businesses.json`.
///
/// Returns the number of records linked.
///
/// # Errors
///
/// Returns an error if the database or the records file is unavailable.
pub async fn run(data_dir_flag: Option<PathBuf>) -> Result<usize, CommandError> {
    let data_dir = data_dir(data_dir_flag)?;
    let pool = db::create_pool(&database_url()?).await?;
    let repo = CompanyRepository::new(&pool);
    let store = DataStore::new(&data_dir);

    let records = store.businesses().load_all().await?;
    report_dangling(&repo, &records).await?;

    let pending = unlinked(&records);
    let existing = repo.list().await?;
    let (mut linked, missing) = match_existing(&pending, &existing);
    tracing::info!(
        total = records.len(),
        pending = pending.len(),
        reused = linked.len(),
        "Backfilling companies"
    );

    for business in missing {
        let company = repo.create(&NewCompany::from(business)).await?;
        tracing::debug!(business_id = %business.id, company_id = %company.id, "Company created");
        linked.insert(business.id.clone(), company.id);
    }

    let count = store
        .businesses()
        .modify_all(|map| {
            let count = link(map, &linked);
            (count > 0, count)
        })
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Linked {count} record(s) to companies");
    }
    Ok(count)
}

/// Warn about records whose `company_id` names no row.
async fn report_dangling(
    repo: &CompanyRepository<'_>,
    records: &BusinessMap,
) -> Result<(), CommandError> {
    for business in records.values() {
        if let Some(company_id) = business.company_id
            && repo.get_by_id(company_id).await?.is_none()
        {
            tracing::warn!(
                business_id = %business.id,
                company_id = %company_id,
                "Record links to a missing company row"
            );
        }
    }
    Ok(())
}

/// Records without a `company_id`, in id order.
fn unlinked(records: &BusinessMap) -> Vec<&Business> {
    records
        .values()
        .filter(|business| business.company_id.is_none())
        .collect()
}

/// Split pending records into those an existing row already covers and
/// those that still need a row.
fn match_existing<'a>(
    pending: &[&'a Business],
    existing: &[Company],
) -> (BTreeMap<BusinessId, CompanyId>, Vec<&'a Business>) {
    let mut linked = BTreeMap::new();
    let mut missing = Vec::new();
    for &business in pending {
        match existing.iter().find(|company| company.matches(business)) {
            Some(company) => {
                linked.insert(business.id.clone(), company.id);
            }
            None => missing.push(business),
        }
    }
    (linked, missing)
}

/// Record new company ids on records that are still unlinked.
fn link(map: &mut BusinessMap, linked: &BTreeMap<BusinessId, CompanyId>) -> usize {
    let mut count = 0;
    for (id, company_id) in linked {
        if let Some(business) = map.get_mut(id)
            && business.company_id.is_none()
        {
            business.company_id = Some(*company_id);
            count += 1;
        }
    }
    count
}
