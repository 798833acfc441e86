//! Configuration module for Tally
//!
//! This module provides configuration management including:
//! - Platform-aware path resolution
//! - User settings persistence
//! - Cloud upload preferences

pub mod paths;
pub mod settings;

pub use paths::TallyPaths;
pub use settings::{CloudTargetSettings, Settings, UploadSettings};
