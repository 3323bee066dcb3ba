//! Edits that touch both the record and its panel configuration.
//!
//! The config is written first and the record second. A crash in between
//! leaves them out of step until the next save or `sync-configs` run.

use qwerty_town_core::{
    Business, BusinessId, Menu, MenuSync, PanelConfig, PanelConfigUpdate, embed_business_menu,
    sync_menu,
};

use super::{DataStore, StoreError};

impl DataStore {
    /// The stored configuration for a record, or the default layout when
    /// none was saved. A config without a menu gets the record's menu.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the config file cannot be read or parsed.
    pub async fn panel_config(&self, business: &Business) -> Result<PanelConfig, StoreError> {
        let mut config = self
            .configs()
            .load(&business.id)
            .await?
            .unwrap_or_else(|| PanelConfig::for_business(business.id.clone()));
        embed_business_menu(&mut config, business);
        Ok(config)
    }

    /// Merge an update into a business's config, save it, and copy its menu
    /// into the record.
    ///
    /// Returns `Ok(None)` when no record has this id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either file cannot be read, parsed or written.
    pub async fn save_panel_config(
        &self,
        id: &BusinessId,
        update: PanelConfigUpdate,
    ) -> Result<Option<(PanelConfig, MenuSync)>, StoreError> {
        if self.businesses().get(id).await?.is_none() {
            return Ok(None);
        }

        let mut config = self
            .configs()
            .load(id)
            .await?
            .unwrap_or_else(|| PanelConfig::for_business(id.clone()));
        config.business_id = id.clone();
        config.apply(update);
        self.configs().save(&config).await?;

        let outcome = self
            .businesses()
            .update(id, |business| sync_menu(business, &config))
            .await?
            .map_or(MenuSync::NoMenu, |(_, outcome)| outcome);

        tracing::info!(business_id = %id, menu = ?outcome, "Panel configuration saved");
        Ok(Some((config, outcome)))
    }

    /// Replace a record's menu and mirror it into the config.
    ///
    /// Returns `Ok(None)` when no record has this id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either file cannot be read, parsed or written.
    pub async fn save_menu(
        &self,
        id: &BusinessId,
        menu: Menu,
    ) -> Result<Option<Business>, StoreError> {
        let Some((business, ())) = self
            .businesses()
            .update(id, |business| business.menu = menu.clone())
            .await?
        else {
            return Ok(None);
        };

        let mut config = self
            .configs()
            .load(id)
            .await?
            .unwrap_or_else(|| PanelConfig::for_business(id.clone()));
        config.business_id = id.clone();
        config.menu = Some(menu);
        self.configs().save(&config).await?;

        tracing::info!(business_id = %id, items = business.menu.item_count(), "Menu saved");
        Ok(Some(business))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use qwerty_town_core::{DEFAULT_MENU_TITLE, NewBusiness, PanelKind};
    use serde_json::json;

    use super::*;

    async fn seeded() -> (tempfile::TempDir, DataStore, BusinessId) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let id = BusinessId::parse("blue-cup").unwrap();
        let new = NewBusiness::parse("Blue Cup", "cafe", "1 Main St", "123", "a@b.ru", None).unwrap();
        store
            .businesses()
            .insert(Business::register(id.clone(), new, None, Utc::now()))
            .await
            .unwrap();
        (dir, store, id)
    }

    fn menu() -> Menu {
        serde_json::from_value(json!({
            "menu_title": "Drinks",
            "categories": [{"id": "coffee", "name": "Coffee", "items": [
                {"id": "latte", "name": "Latte", "price": 3.5}
            ]}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_panel_config_defaults_and_embeds_menu() {
        let (_dir, store, id) = seeded().await;
        let business = store.businesses().get(&id).await.unwrap().unwrap();
        let config = store.panel_config(&business).await.unwrap();
        assert_eq!(config.layout(), PanelKind::ALL.to_vec());
        assert_eq!(config.menu.unwrap().title(), DEFAULT_MENU_TITLE);
        assert!(!store.configs().path_for(&id).exists());
    }

    #[tokio::test]
    async fn test_save_panel_config_mirrors_menu() {
        let (_dir, store, id) = seeded().await;
        let update = PanelConfigUpdate {
            panels: BTreeMap::from([("gallery".to_string(), false)]),
            order: None,
            menu: Some(menu()),
        };
        let (config, outcome) = store.save_panel_config(&id, update).await.unwrap().unwrap();
        assert_eq!(outcome, MenuSync::CategoriesUpdated);
        assert!(!config.is_enabled(PanelKind::Gallery));

        let stored = store.configs().load(&id).await.unwrap().unwrap();
        assert_eq!(stored, config);
        let record = store.businesses().get(&id).await.unwrap().unwrap();
        assert_eq!(record.menu.title(), "Drinks");
        assert_eq!(record.menu.item_count(), 1);
    }

    #[tokio::test]
    async fn test_save_panel_config_unknown_business() {
        let (_dir, store, _) = seeded().await;
        let other = BusinessId::parse("nobody").unwrap();
        let saved = store
            .save_panel_config(&other, PanelConfigUpdate::default())
            .await
            .unwrap();
        assert!(saved.is_none());
        assert!(!store.configs().path_for(&other).exists());
    }

    #[tokio::test]
    async fn test_save_menu_updates_both_sides() {
        let (_dir, store, id) = seeded().await;
        let business = store.save_menu(&id, menu()).await.unwrap().unwrap();
        assert_eq!(business.menu, menu());

        let config = store.configs().load(&id).await.unwrap().unwrap();
        assert_eq!(config.menu, Some(menu()));
        assert_eq!(config.layout(), PanelKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_save_menu_keeps_existing_layout() {
        let (_dir, store, id) = seeded().await;
        let update = PanelConfigUpdate {
            panels: BTreeMap::from([("map".to_string(), false)]),
            ..PanelConfigUpdate::default()
        };
        store.save_panel_config(&id, update).await.unwrap();
        store.save_menu(&id, menu()).await.unwrap();

        let config = store.configs().load(&id).await.unwrap().unwrap();
        assert!(!config.is_enabled(PanelKind::Map));
        assert_eq!(config.menu, Some(menu()));
    }
}
