//! Keeping the record menu and the panel-config menu in agreement.
//!
//! A business's menu exists in two places: the master record in
//! `businesses.json` and the copy embedded in `configs/{id}.json`. Saves
//! overwrite whichever side was not written, and the `sync-configs` command
//! replays [`sync_menu`] for every config on disk. Neither side is locked, so
//! the last writer wins.

use serde::Serialize;

use crate::types::{Business, DEFAULT_MENU_TITLE, Menu, PanelConfig};

/// What [`sync_menu`] did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuSync {
    /// The config carries no menu; the record was left alone.
    NoMenu,
    /// Categories differed; the record's menu was replaced.
    CategoriesUpdated,
    /// Categories matched but the title differed; only the title changed.
    TitleUpdated,
    /// Record and config already agree.
    Unchanged,
}

impl MenuSync {
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::CategoriesUpdated | Self::TitleUpdated)
    }
}

/// Copy the config's menu into the business record.
///
/// When categories differ the whole menu is replaced and the title taken
/// from the config, defaulting to [`DEFAULT_MENU_TITLE`]. When only the
/// titles differ just the title is updated. Titles are compared after
/// defaulting, so a missing, blank and default title are all the same.
pub fn sync_menu(business: &mut Business, config: &PanelConfig) -> MenuSync {
    let Some(config_menu) = config.menu.as_ref() else {
        return MenuSync::NoMenu;
    };

    if business.menu.categories != config_menu.categories {
        business.menu = Menu {
            menu_title: Some(config_menu.title().to_string()),
            categories: config_menu.categories.clone(),
        };
        return MenuSync::CategoriesUpdated;
    }

    if business.menu.title() != config_menu.title() {
        business.menu.menu_title = Some(config_menu.title().to_string());
        return MenuSync::TitleUpdated;
    }

    MenuSync::Unchanged
}

/// Fill a config that has no menu with a copy of the record's menu.
///
/// Returns `true` when the config was modified.
pub fn embed_business_menu(config: &mut PanelConfig, business: &Business) -> bool {
    if config.menu.is_some() {
        return false;
    }
    let mut menu = business.menu.clone();
    if menu.menu_title.is_none() {
        menu.menu_title = Some(DEFAULT_MENU_TITLE.to_string());
    }
    config.menu = Some(menu);
    true
}

/// Counters produced by a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records whose menu or title changed.
    pub updated: usize,
    /// Configs that were already in agreement or had no menu.
    pub skipped: usize,
    /// Configs whose business id has no record.
    pub missing: usize,
    /// Configs that could not be read or parsed.
    pub failed: usize,
}

impl SyncReport {
    /// Tally one [`MenuSync`] outcome.
    pub const fn record(&mut self, outcome: MenuSync) {
        if outcome.changed() {
            self.updated += 1;
        } else {
            self.skipped += 1;
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.updated + self.skipped + self.missing + self.failed
    }
}
