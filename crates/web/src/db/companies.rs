//! Company repository for the `companies` table.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database or an offline query cache.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use qwerty_town_core::{Business, BusinessType, CompanyId};

use super::RepositoryError;

/// A row of the `companies` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub business_type: BusinessType,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    pub logo: String,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Whether this row was created from `business`.
    ///
    /// Rows carry no record id, so a row matches when its name, address and
    /// email are the record's.
    #[must_use]
    pub fn matches(&self, business: &Business) -> bool {
        self.name == business.name
            && self.address == business.address
            && self.email == business.contacts.email
    }
}

/// Values for a new `companies` row.
#[derive(Debug, Clone)]
pub struct NewCompany<'a> {
    pub name: &'a str,
    pub business_type: BusinessType,
    pub address: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub description: Option<&'a str>,
    pub logo: &'a str,
}

impl<'a> From<&'a Business> for NewCompany<'a> {
    fn from(business: &'a Business) -> Self {
        Self {
            name: &business.name,
            business_type: business.business_type,
            address: &business.address,
            phone: &business.contacts.phone,
            email: &business.contacts.email,
            description: Some(business.description.as_str()).filter(|d| !d.is_empty()),
            logo: &business.logo,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: i32,
    name: String,
    business_type: String,
    address: String,
    phone: String,
    email: String,
    description: Option<String>,
    logo: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = RepositoryError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        let business_type: BusinessType = row
            .business_type
            .parse()
            .map_err(|_| RepositoryError::DataCorruption("unparsable business_type".into()))?;
        if business_type == BusinessType::Other && row.business_type != "other" {
            return Err(RepositoryError::DataCorruption(format!(
                "unknown business_type {:?} for company {}",
                row.business_type, row.id
            )));
        }

        Ok(Self {
            id: CompanyId::new(row.id),
            name: row.name,
            business_type,
            address: row.address,
            phone: row.phone,
            email: row.email,
            description: row.description,
            logo: row.logo,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str =
    "id, name, business_type, address, phone, email, description, logo, created_at";

/// Repository for company database operations.
pub struct CompanyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepository<'a> {
    /// Create a new company repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a company and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, company: &NewCompany<'_>) -> Result<Company, RepositoryError> {
        let sql = format!(
            "INSERT INTO companies (name, business_type, address, phone, email, description, logo) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let row: CompanyRow = sqlx::query_as(&sql)
            .bind(company.name)
            .bind(company.business_type.as_str())
            .bind(company.address)
            .bind(company.phone)
            .bind(company.email)
            .bind(company.description)
            .bind(company.logo)
            .fetch_one(self.pool)
            .await?;

        let company = Company::try_from(row)?;
        tracing::info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    /// Get a company by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored type is invalid.
    pub async fn get_by_id(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        let row: Option<CompanyRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(Company::try_from).transpose()
    }

    /// List all companies, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored type is invalid.
    pub async fn list(&self) -> Result<Vec<Company>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM companies ORDER BY id");
        let rows: Vec<CompanyRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;
        rows.into_iter().map(Company::try_from).collect()
    }
}
