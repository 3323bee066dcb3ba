//! Menu shapes shared by business records and panel configurations.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Title shown above a menu that never had one set.
pub const DEFAULT_MENU_TITLE: &str = "Our menu";

/// Shape problems found in a submitted menu.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("menu category at position {0} has an empty id")]
    EmptyCategoryId(usize),
    #[error("menu category {0:?} has an empty name")]
    EmptyCategoryName(String),
    #[error("duplicate menu category id {0:?}")]
    DuplicateCategory(String),
    #[error("item in category {0:?} has an empty id")]
    EmptyItemId(String),
    #[error("item {0:?} has an empty name")]
    EmptyItemName(String),
    #[error("duplicate item id {item:?} in category {category:?}")]
    DuplicateItem { category: String, item: String },
    #[error("item {0:?} has a negative price")]
    NegativePrice(String),
}

/// A single priced menu position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// An ordered group of menu items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// A business menu: an optional title plus ordered categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_title: Option<String>,
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
}

impl Menu {
    /// Title to display, falling back to [`DEFAULT_MENU_TITLE`].
    #[must_use]
    pub fn title(&self) -> &str {
        self.menu_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_MENU_TITLE)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.items.is_empty())
    }

    /// Total number of items across all categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// Basic shape checks: ids and names present, ids unique, prices not negative.
    ///
    /// # Errors
    ///
    /// Returns the first [`MenuError`] found, scanning categories in order.
    pub fn validate(&self) -> Result<(), MenuError> {
        let mut category_ids = HashSet::new();
        for (pos, category) in self.categories.iter().enumerate() {
            if category.id.trim().is_empty() {
                return Err(MenuError::EmptyCategoryId(pos));
            }
            if category.name.trim().is_empty() {
                return Err(MenuError::EmptyCategoryName(category.id.clone()));
            }
            if !category_ids.insert(category.id.as_str()) {
                return Err(MenuError::DuplicateCategory(category.id.clone()));
            }

            let mut item_ids = HashSet::new();
            for item in &category.items {
                if item.id.trim().is_empty() {
                    return Err(MenuError::EmptyItemId(category.id.clone()));
                }
                if item.name.trim().is_empty() {
                    return Err(MenuError::EmptyItemName(item.id.clone()));
                }
                if !item_ids.insert(item.id.as_str()) {
                    return Err(MenuError::DuplicateItem {
                        category: category.id.clone(),
                        item: item.id.clone(),
                    });
                }
                if item.price.is_sign_negative() && !item.price.is_zero() {
                    return Err(MenuError::NegativePrice(item.id.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Menu {
        serde_json::from_value(json!({
            "categories": [
                {"id": "coffee", "name": "Coffee", "items": [
                    {"id": "latte", "name": "Latte", "price": 3.5},
                    {"id": "flat", "name": "Flat white", "price": 4, "image": "/uploads/gallery/f.png"}
                ]},
                {"id": "cakes", "name": "Cakes"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_numbers_and_defaults() {
        let menu = sample();
        assert_eq!(menu.categories.len(), 2);
        assert_eq!(menu.item_count(), 2);
        assert_eq!(menu.categories[1].items.len(), 0);
        assert_eq!(menu.categories[0].items[0].price, Decimal::new(35, 1));
        assert_eq!(menu.title(), DEFAULT_MENU_TITLE);
    }

    #[test]
    fn test_price_serializes_as_number() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value["categories"][0]["items"][0]["price"].is_number());
        assert!(value.get("menu_title").is_none());
    }

    #[test]
    fn test_blank_title_falls_back() {
        let menu = Menu {
            menu_title: Some("   ".to_string()),
            categories: Vec::new(),
        };
        assert_eq!(menu.title(), DEFAULT_MENU_TITLE);
        assert!(menu.is_empty());
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_category() {
        let mut menu = sample();
        menu.categories[1].id = "coffee".to_string();
        assert_eq!(
            menu.validate(),
            Err(MenuError::DuplicateCategory("coffee".to_string()))
        );
    }

    #[test]
    fn test_validate_negative_price() {
        let mut menu = sample();
        menu.categories[0].items[1].price = Decimal::new(-1, 0);
        assert_eq!(
            menu.validate(),
            Err(MenuError::NegativePrice("flat".to_string()))
        );
    }

    #[test]
    fn test_validate_empty_item_name() {
        let mut menu = sample();
        menu.categories[0].items[0].name = " ".to_string();
        assert_eq!(
            menu.validate(),
            Err(MenuError::EmptyItemName("latte".to_string()))
        );
    }
}
