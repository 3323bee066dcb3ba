//! Panel configuration: which page sections a business shows, and in what order.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::BusinessId;
use super::menu::{Menu, MenuError};

/// Page sections the site knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanelKind {
    Info,
    Menu,
    Hours,
    Contacts,
    Gallery,
    Map,
}

impl PanelKind {
    /// Every known panel in its natural page order.
    pub const ALL: [Self; 6] = [
        Self::Info,
        Self::Menu,
        Self::Hours,
        Self::Contacts,
        Self::Gallery,
        Self::Map,
    ];

    /// Identifier used as the key in stored configurations.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Menu => "menu",
            Self::Hours => "hours",
            Self::Contacts => "contacts",
            Self::Gallery => "gallery",
            Self::Map => "map",
        }
    }

    /// Human readable section heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "About",
            Self::Menu => "Menu",
            Self::Hours => "Working hours",
            Self::Contacts => "Contacts",
            Self::Gallery => "Gallery",
            Self::Map => "How to find us",
        }
    }

    const fn natural_rank(self) -> usize {
        self as usize
    }
}

impl FromStr for PanelKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Shape problems in a panel configuration update.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelConfigError {
    #[error("panel id cannot be empty")]
    EmptyPanelId,
    #[error("panel id {0:?} is longer than {max} characters", max = PanelConfig::MAX_PANEL_ID_LENGTH)]
    PanelIdTooLong(String),
    #[error("invalid menu: {0}")]
    Menu(#[from] MenuError),
}

/// Stored per-business panel configuration (`configs/{id}.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub business_id: BusinessId,
    #[serde(default)]
    pub panels: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<BTreeMap<String, i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<Menu>,
}

/// Incoming configuration change from the panel constructor.
///
/// Any `business_id` in the request body is ignored; the id always comes
/// from the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfigUpdate {
    #[serde(default)]
    pub panels: BTreeMap<String, bool>,
    #[serde(default)]
    pub order: Option<BTreeMap<String, i32>>,
    #[serde(default)]
    pub menu: Option<Menu>,
}

impl PanelConfigUpdate {
    /// Basic shape checks on panel ids and the embedded menu.
    ///
    /// # Errors
    ///
    /// Returns [`PanelConfigError`] for empty or overlong panel ids and for
    /// menus that fail [`Menu::validate`].
    pub fn validate(&self) -> Result<(), PanelConfigError> {
        let order_keys = self.order.iter().flat_map(BTreeMap::keys);
        for id in self.panels.keys().chain(order_keys) {
            if id.trim().is_empty() {
                return Err(PanelConfigError::EmptyPanelId);
            }
            if id.len() > PanelConfig::MAX_PANEL_ID_LENGTH {
                return Err(PanelConfigError::PanelIdTooLong(id.clone()));
            }
        }
        if let Some(menu) = &self.menu {
            menu.validate()?;
        }
        Ok(())
    }
}

impl PanelConfig {
    pub const MAX_PANEL_ID_LENGTH: usize = 64;

    /// Default configuration: every known panel enabled, natural order, no menu.
    #[must_use]
    pub fn for_business(business_id: BusinessId) -> Self {
        Self {
            business_id,
            panels: PanelKind::ALL
                .into_iter()
                .map(|kind| (kind.as_str().to_string(), true))
                .collect(),
            order: None,
            menu: None,
        }
    }

    /// Merge an update into this configuration, last write wins.
    ///
    /// Panel flags and order entries merge key by key, so a request that
    /// only mentions `gallery` leaves the other panels untouched. A supplied
    /// menu replaces the stored one wholesale.
    pub fn apply(&mut self, update: PanelConfigUpdate) {
        self.panels.extend(update.panels);
        if let Some(order) = update.order {
            self.order.get_or_insert_with(BTreeMap::new).extend(order);
        }
        if update.menu.is_some() {
            self.menu = update.menu;
        }
    }

    /// Whether a panel is shown. Panels missing from the map are shown.
    #[must_use]
    pub fn is_enabled(&self, kind: PanelKind) -> bool {
        self.panels.get(kind.as_str()).copied().unwrap_or(true)
    }

    /// Explicit display position of a panel, if one was saved.
    #[must_use]
    pub fn position(&self, kind: PanelKind) -> Option<i32> {
        self.order.as_ref()?.get(kind.as_str()).copied()
    }

    /// Enabled known panels in display order.
    ///
    /// Panels with an explicit position come first, sorted by position;
    /// the rest follow in natural order. Unknown panel ids are skipped.
    #[must_use]
    pub fn layout(&self) -> Vec<PanelKind> {
        let mut kinds: Vec<PanelKind> = PanelKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect();
        kinds.sort_by_key(|kind| {
            (
                self.position(*kind).unwrap_or(i32::MAX),
                kind.natural_rank(),
            )
        });
        kinds
    }

    /// Known panels in display order with their enabled flag, for the constructor.
    #[must_use]
    pub fn all_panels(&self) -> Vec<(PanelKind, bool)> {
        let mut kinds = PanelKind::ALL.to_vec();
        kinds.sort_by_key(|kind| {
            (
                self.position(*kind).unwrap_or(i32::MAX),
                kind.natural_rank(),
            )
        });
        kinds
            .into_iter()
            .map(|kind| (kind, self.is_enabled(kind)))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id() -> BusinessId {
        BusinessId::parse("blue-cup").unwrap()
    }

    #[test]
    fn test_default_layout_is_natural_order() {
        let config = PanelConfig::for_business(id());
        assert_eq!(config.layout(), PanelKind::ALL.to_vec());
    }

    #[test]
    fn test_apply_merges_panels_per_key() {
        let mut config = PanelConfig::for_business(id());
        config.apply(PanelConfigUpdate {
            panels: BTreeMap::from([("gallery".to_string(), false)]),
            ..PanelConfigUpdate::default()
        });
        assert!(!config.is_enabled(PanelKind::Gallery));
        assert!(config.is_enabled(PanelKind::Menu));
        assert!(!config.layout().contains(&PanelKind::Gallery));
    }

    #[test]
    fn test_apply_keeps_menu_when_absent() {
        let mut config = PanelConfig::for_business(id());
        config.menu = Some(Menu {
            menu_title: Some("Drinks".to_string()),
            categories: Vec::new(),
        });
        config.apply(PanelConfigUpdate::default());
        assert_eq!(config.menu.as_ref().unwrap().title(), "Drinks");
    }

    #[test]
    fn test_order_sorts_explicit_first() {
        let mut config = PanelConfig::for_business(id());
        config.apply(PanelConfigUpdate {
            order: Some(BTreeMap::from([
                ("map".to_string(), 0),
                ("menu".to_string(), 1),
            ])),
            ..PanelConfigUpdate::default()
        });
        assert_eq!(
            config.layout(),
            vec![
                PanelKind::Map,
                PanelKind::Menu,
                PanelKind::Info,
                PanelKind::Hours,
                PanelKind::Contacts,
                PanelKind::Gallery,
            ]
        );
    }

    #[test]
    fn test_unknown_panels_survive_but_do_not_render() {
        let mut config: PanelConfig = serde_json::from_value(json!({
            "business_id": "blue-cup",
            "panels": {"promo": true, "info": true, "menu": false}
        }))
        .unwrap();
        config.apply(PanelConfigUpdate::default());
        assert_eq!(config.panels.get("promo"), Some(&true));
        assert!(!config.layout().contains(&PanelKind::Menu));
        assert_eq!(config.layout().first(), Some(&PanelKind::Info));
    }

    #[test]
    fn test_all_panels_lists_disabled_too() {
        let mut config = PanelConfig::for_business(id());
        config.panels.insert("hours".to_string(), false);
        let all = config.all_panels();
        assert_eq!(all.len(), 6);
        assert!(all.contains(&(PanelKind::Hours, false)));
    }

    #[test]
    fn test_validate_rejects_empty_panel_id() {
        let update = PanelConfigUpdate {
            panels: BTreeMap::from([(" ".to_string(), true)]),
            ..PanelConfigUpdate::default()
        };
        assert_eq!(update.validate(), Err(PanelConfigError::EmptyPanelId));
    }

    #[test]
    fn test_update_ignores_business_id_in_body() {
        let update: PanelConfigUpdate = serde_json::from_value(json!({
            "business_id": "someone-else",
            "panels": {"map": false}
        }))
        .unwrap();
        assert_eq!(update.panels.get("map"), Some(&false));
    }

    #[test]
    fn test_panel_kind_from_str() {
        assert_eq!("hours".parse::<PanelKind>(), Ok(PanelKind::Hours));
        assert!("promo".parse::<PanelKind>().is_err());
    }
}
