//! Core types for Qwerty Town.
//!
//! This module provides type-safe wrappers for the directory's domain concepts.

pub mod business;
pub mod email;
pub mod id;
pub mod menu;
pub mod panel;

pub use business::{
    Business, BusinessError, BusinessType, Contacts, DEFAULT_LOGO_PATH, NewBusiness, SocialLinks,
    WorkingHours,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use menu::{DEFAULT_MENU_TITLE, Menu, MenuCategory, MenuError, MenuItem};
pub use panel::{PanelConfig, PanelConfigError, PanelConfigUpdate, PanelKind};
