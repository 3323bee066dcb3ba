//! Qwerty Town Core - Domain types and reconciliation logic.
//!
//! This crate provides the types shared by every Qwerty Town component:
//! - `web` - Public directory site, panel constructor and JSON API
//! - `cli` - Migrations, reconciliation and backfill commands
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no file access,
//! no database access, no HTTP clients. Stores live in the `web` crate and
//! call into [`reconcile`] to keep the business record and its panel
//! configuration in agreement.
//!
//! # Modules
//!
//! - [`types`] - IDs, contacts, business records, menus and panel configs
//! - [`reconcile`] - Menu synchronisation between configs and records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod reconcile;
pub mod types;

pub use reconcile::{MenuSync, SyncReport, embed_business_menu, sync_menu};
pub use types::*;
