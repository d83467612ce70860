//! Path and URL conversion utilities.
//!
//! This module handles conversions between:
//! - Source file paths (relative to `posts/` or `pages/`)
//! - Target paths (destination-relative output paths, always `/`-separated)
//! - Output file paths (where files are written in the output directory)
//! - Absolute URLs (site address joined with a target path)

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};

/// Convert a page's source path to its target path.
///
/// # Examples
/// ```ignore
/// page_target_path("about.md") => "about.html"
/// page_target_path("guides/setup.md") => "guides/setup.html"
/// ```
pub fn page_target_path(relative: &Path) -> String {
    format!("{}.html", without_extension(relative))
}

/// Convert a post's source path to its dated target path.
///
/// # Examples
/// ```ignore
/// post_target_path("hello.md", 2024-01-05) => "2024/01/hello.html"
/// ```
pub fn post_target_path(relative: &Path, published: &DateTime<Utc>) -> String {
    format!(
        "{:04}/{:02}/{}.html",
        published.year(),
        published.month(),
        without_extension(relative)
    )
}

/// Convert a target path to an output file path.
pub fn target_to_output_path(target_path: &str, output_dir: &Path) -> PathBuf {
    output_dir.join(target_path.trim_start_matches('/'))
}

/// Join the site address (no trailing slash) and a target path.
///
/// # Examples
/// ```ignore
/// absolute_url("https://example.com", "2024/01/hello.html") => "https://example.com/2024/01/hello.html"
/// ```
pub fn absolute_url(address: &str, target_path: &str) -> String {
    format!(
        "{}/{}",
        address.trim_end_matches('/'),
        target_path.trim_start_matches('/')
    )
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn without_extension(relative: &Path) -> String {
    relative
        .with_extension("")
        .to_string_lossy()
        .replace('\\', "/")
}
