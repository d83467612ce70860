//! Configuration loading and types.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)

mod load;
mod types;

use std::path::PathBuf;

pub use load::{CONFIG_FILE_NAME, ENV_PREFIX};
pub use types::{BuildConfig, Config, MarkdownConfig, MenuEntry, SiteConfig};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("config path is not valid UTF-8: {0}")]
    EncodePath(PathBuf),

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("{0}")]
    Validation(String),
}
