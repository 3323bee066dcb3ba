//! Business records as stored in `businesses.json`.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};
use super::id::{BusinessId, CompanyId};
use super::menu::Menu;

/// Logo shown when the operator neither uploads nor generates one.
pub const DEFAULT_LOGO_PATH: &str = "/static/images/default-logo.svg";

/// Validation failures for a registration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BusinessError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// Kind of business.
///
/// Unrecognised values read as [`BusinessType::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Cafe,
    Restaurant,
    Bar,
    Shop,
    #[default]
    #[serde(other)]
    Other,
}

impl BusinessType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cafe => "cafe",
            Self::Restaurant => "restaurant",
            Self::Bar => "bar",
            Self::Shop => "shop",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cafe => "Cafe",
            Self::Restaurant => "Restaurant",
            Self::Bar => "Bar",
            Self::Shop => "Shop",
            Self::Other => "Business",
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessType {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "cafe" => Self::Cafe,
            "restaurant" => Self::Restaurant,
            "bar" => Self::Bar,
            "shop" => Self::Shop,
            _ => Self::Other,
        })
    }
}

/// Opening hours per weekday, as free-text ranges ("09:00 - 18:00").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub monday: String,
    pub tuesday: String,
    pub wednesday: String,
    pub thursday: String,
    pub friday: String,
    pub saturday: String,
    pub sunday: String,
}

impl Default for WorkingHours {
    fn default() -> Self {
        let weekday = || "09:00 - 18:00".to_string();
        Self {
            monday: weekday(),
            tuesday: weekday(),
            wednesday: weekday(),
            thursday: weekday(),
            friday: weekday(),
            saturday: "10:00 - 16:00".to_string(),
            sunday: "Closed".to_string(),
        }
    }
}

impl WorkingHours {
    /// `(day name, hours)` pairs from Monday to Sunday.
    #[must_use]
    pub fn days(&self) -> [(&'static str, &str); 7] {
        [
            ("Monday", &self.monday),
            ("Tuesday", &self.tuesday),
            ("Wednesday", &self.wednesday),
            ("Thursday", &self.thursday),
            ("Friday", &self.friday),
            ("Saturday", &self.saturday),
            ("Sunday", &self.sunday),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub vk: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub social: SocialLinks,
}

/// A registered business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub business_type: BusinessType,
    pub logo: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub address: String,
    #[serde(default)]
    pub working_hours: WorkingHours,
    pub contacts: Contacts,
    #[serde(default)]
    pub menu: Menu,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
}

/// Validated registration form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBusiness {
    pub name: String,
    pub business_type: BusinessType,
    pub address: String,
    pub phone: String,
    pub email: Email,
    pub description: Option<String>,
}

impl NewBusiness {
    const MAX_NAME_LENGTH: usize = 200;
    const MAX_DESCRIPTION_LENGTH: usize = 4000;

    /// Validate raw form values.
    ///
    /// Required fields are trimmed and must be non-empty. A blank
    /// description is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessError`] naming the first offending field.
    pub fn parse(
        name: &str,
        business_type: &str,
        address: &str,
        phone: &str,
        email: &str,
        description: Option<&str>,
    ) -> Result<Self, BusinessError> {
        let name = required("business_name", name)?;
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(BusinessError::TooLong {
                field: "business_name",
                max: Self::MAX_NAME_LENGTH,
            });
        }
        let address = required("address", address)?;
        let phone = required("phone", phone)?;
        if email.trim().is_empty() {
            return Err(BusinessError::MissingField("email"));
        }
        let email = Email::parse(email)?;

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if description
            .as_deref()
            .is_some_and(|d| d.chars().count() > Self::MAX_DESCRIPTION_LENGTH)
        {
            return Err(BusinessError::TooLong {
                field: "description",
                max: Self::MAX_DESCRIPTION_LENGTH,
            });
        }

        Ok(Self {
            name,
            business_type: business_type.parse().unwrap_or_default(),
            address,
            phone,
            email,
            description,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, BusinessError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BusinessError::MissingField(field));
    }
    Ok(value.to_string())
}

impl Business {
    /// Build a fresh record with the directory's defaults filled in.
    #[must_use]
    pub fn register(
        id: BusinessId,
        new: NewBusiness,
        logo: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let description = new
            .description
            .unwrap_or_else(|| format!("Welcome to {}!", new.name));

        Self {
            id,
            name: new.name,
            business_type: new.business_type,
            logo: logo.unwrap_or_else(|| DEFAULT_LOGO_PATH.to_string()),
            description,
            highlights: vec!["New business".to_string(), "Open for customers".to_string()],
            address: new.address,
            working_hours: WorkingHours::default(),
            contacts: Contacts {
                phone: new.phone,
                email: new.email.into_inner(),
                social: SocialLinks::default(),
            },
            menu: Menu::default(),
            gallery: Vec::new(),
            created_at: Some(created_at),
            company_id: None,
        }
    }
}
