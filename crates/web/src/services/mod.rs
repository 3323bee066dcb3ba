//! Services used by the route handlers.
//!
//! # Services
//!
//! - `fusion_brain` - Logo generation through the Fusion Brain image API
//! - `uploads` - Storing uploaded and generated images on disk

pub mod fusion_brain;
pub mod uploads;

pub use fusion_brain::{FusionBrainClient, FusionBrainError, create_logo_prompt};
pub use uploads::{ImageKind, UploadDir, UploadError};
