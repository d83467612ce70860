//! XML sitemap accumulation and output.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/about.html</loc>
//!     <lastmod>2024-01-05</lastmod>
//!     <priority>1</priority>
//!   </url>
//! </urlset>
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// File name of the sitemap in the output root.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Single URL entry in the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute URL
    pub url: String,
    pub last_modified: DateTime<Utc>,
    /// Crawl priority hint, nominally 0.0 to 1.0 (not clamped)
    pub priority: f64,
}

/// Collects sitemap entries during a build.
#[derive(Debug, Default)]
pub struct Sitemap {
    entries: Vec<SitemapEntry>,
}

impl Sitemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, url: impl Into<String>, last_modified: DateTime<Utc>, priority: f64) {
        self.entries.push(SitemapEntry {
            url: url.into(),
            last_modified,
            priority,
        });
    }

    pub fn push(&mut self, entry: SitemapEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = SitemapEntry>) {
        self.entries.extend(entries);
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[SitemapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending priority; ties keep insertion order.
    pub fn sorted_entries(&self) -> Vec<&SitemapEntry> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        sorted
    }

    /// Generate sitemap XML string.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.sorted_entries() {
            xml.push_str("  <url>\n");
            xml.push_str(&format!(
                "    <loc>{}</loc>\n",
                html_escape::encode_text(&entry.url)
            ));
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                entry.last_modified.format("%Y-%m-%d")
            ));
            xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write `sitemap.xml` into `output_dir`, returning its path.
    pub fn write(&self, output_dir: &Path) -> io::Result<PathBuf> {
        let path = output_dir.join(SITEMAP_FILE);
        fs::create_dir_all(output_dir)?;
        fs::write(&path, self.to_xml())?;
        tracing::info!("wrote sitemap with {} entries", self.len());
        Ok(path)
    }
}
