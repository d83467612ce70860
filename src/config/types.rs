//! Configuration type definitions.
//!
//! This module contains all the data structures used in `site.yaml`.
//! These types are pure data - no I/O.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Top-level config
// =============================================================================

/// The full site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub build: BuildConfig,
    /// Entries of the menu rendered in every page header
    #[serde(default)]
    pub menu: Vec<MenuEntry>,
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Canonical address, without trailing slash once normalized
    pub url: String,
    /// Default page language, overridden per document by `lang`
    #[serde(default = "default_language")]
    pub language: String,
    /// Base URL prepended to root-relative image sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn: Option<String>,
    /// RSS channel description (defaults to the site name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl SiteConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let mut site = Self {
            name: name.into(),
            url: url.into(),
            language: default_language(),
            cdn: None,
            description: None,
        };
        site.normalize();
        site
    }

    /// Strip trailing slashes from the address and CDN; drop an empty CDN.
    pub fn normalize(&mut self) {
        self.url = self.url.trim().trim_end_matches('/').to_string();
        self.cdn = self
            .cdn
            .as_deref()
            .map(|cdn| cdn.trim().trim_end_matches('/'))
            .filter(|cdn| !cdn.is_empty())
            .map(str::to_string);
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

// =============================================================================
// Build configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Source root holding `posts/` and `pages/` (relative to the config file)
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Output root (relative to the config file)
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Folders under the source root copied into the output root
    #[serde(default)]
    pub static_folders: Vec<String>,
    /// Copy hidden files of static folders too
    #[serde(default)]
    pub include_hidden: bool,
    /// Render the cookie banner and install its script
    #[serde(default)]
    pub cookie_notice: bool,
    /// Text of the page footer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            static_folders: Vec::new(),
            include_hidden: false,
            cookie_notice: false,
            footer: None,
        }
    }
}

// =============================================================================
// Menu configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub text: String,
    pub link: String,
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
    /// Syntax highlighting theme for fenced code blocks
    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

fn default_highlight_theme() -> String {
    "github-dark".to_string()
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
            highlight_theme: default_highlight_theme(),
        }
    }
}
