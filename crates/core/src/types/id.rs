//! Identifiers for businesses and their relational rows.
//!
//! A business is addressed by a [`BusinessId`] string everywhere in the JSON
//! stores. Records that also live in the `companies` table carry the row's
//! integer key as a [`CompanyId`].

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Macro to define a type-safe integer primary key wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion from `i32` via `new()` or `From`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(CompanyId);

/// Errors that can occur when parsing a [`BusinessId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BusinessIdError {
    #[error("business id cannot be empty")]
    Empty,
    #[error("business id must be at most {max} characters")]
    TooLong { max: usize },
    #[error("business id contains invalid character {0:?}")]
    InvalidChar(char),
}

/// Identifier of a business record.
///
/// Freshly registered businesses get a UUID v4. Older records may carry
/// any short token, so the only rule enforced is the character set
/// `[A-Za-z0-9_-]`. That rule also makes the id safe to use as a file name
/// under the configs directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BusinessId(String);

impl BusinessId {
    /// Maximum id length.
    pub const MAX_LENGTH: usize = 64;

    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Parse an id, rejecting anything that is not a plain token.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters, or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, BusinessIdError> {
        if s.is_empty() {
            return Err(BusinessIdError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(BusinessIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(BusinessIdError::InvalidChar(bad));
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BusinessId {
    type Err = BusinessIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<CompanyId> for BusinessId {
    fn from(id: CompanyId) -> Self {
        Self(id.to_string())
    }
}

/// Records written by the relational path carry their integer primary key.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBusinessId {
    Text(String),
    Number(i64),
}

impl<'de> Deserialize<'de> for BusinessId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawBusinessId::deserialize(deserializer)? {
            RawBusinessId::Text(raw) => Self::parse(&raw).map_err(serde::de::Error::custom),
            RawBusinessId::Number(n) => Ok(Self(n.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_valid() {
        let id = BusinessId::generate();
        assert!(BusinessId::parse(id.as_str()).is_ok());
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn test_parse_rejects_path_tricks() {
        assert_eq!(
            BusinessId::parse("../etc"),
            Err(BusinessIdError::InvalidChar('.'))
        );
        assert_eq!(
            BusinessId::parse("a/b"),
            Err(BusinessIdError::InvalidChar('/'))
        );
        assert_eq!(BusinessId::parse(""), Err(BusinessIdError::Empty));
    }

    #[test]
    fn test_parse_rejects_long_ids() {
        let long = "a".repeat(65);
        assert!(matches!(
            BusinessId::parse(&long),
            Err(BusinessIdError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_company_id_converts_to_business_id() {
        let id = BusinessId::from(CompanyId::new(42));
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: BusinessId = serde_json::from_str("\"cafe_1\"").unwrap();
        assert_eq!(ok.as_str(), "cafe_1");
        assert!(serde_json::from_str::<BusinessId>("\"bad id\"").is_err());
    }

    #[test]
    fn test_deserialize_integer_id() {
        let id: BusinessId = serde_json::from_str("17").unwrap();
        assert_eq!(id, BusinessId::from(CompanyId::new(17)));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"17\"");
        assert!(serde_json::from_str::<BusinessId>("1.5").is_err());
    }
}
