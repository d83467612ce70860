use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::util::title_case;

/// Identifier assigned to every document of a loaded corpus.
pub type DocumentId = usize;

// =============================================================================
// Document kinds
// =============================================================================

/// Whether a document was discovered under `posts/` or `pages/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Post,
    Page,
}

impl DocumentKind {
    /// The value written to the `type` metadata key.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Post => "post",
            DocumentKind::Page => "page",
        }
    }
}

// =============================================================================
// Front matter
// =============================================================================

/// User-supplied metadata, as string key/value pairs.
///
/// Values are always strings: `draft: true` is stored as `"true"` and
/// `sitemap_priority: 0` as `"0"`. Derived data lives in typed fields of
/// [`Document`], never in this map, with the exception of `type` and a
/// heading-derived `title`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    values: BTreeMap<String, String>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Returns true only when the key holds the literal string `"true"`.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// Documents
// =============================================================================

/// A document of the loaded corpus.
///
/// Created once per build by the content store, then mutated only by the
/// processing pipeline and the post linking pass.
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique across posts and pages of one load
    pub id: DocumentId,
    pub kind: DocumentKind,
    /// Absolute path of the source file
    pub source_path: PathBuf,
    /// Path relative to the `posts/` or `pages/` folder (e.g. "guides/setup.md")
    pub relative_path: PathBuf,
    /// File mtime, or the parsed `published_on` value when present
    pub last_modified: DateTime<Utc>,
    /// Destination-relative output path (e.g. "2024/01/hello.html")
    pub target_path: Option<String>,
    pub front_matter: FrontMatter,
    /// Rendered body markup
    pub html: String,
    /// Text of the first heading of the body, if any
    pub heading: Option<String>,
    /// Next-older public post
    pub prev_id: Option<DocumentId>,
    /// Next-newer public post
    pub next_id: Option<DocumentId>,
    pub tags: Vec<String>,
}

impl Document {
    /// Create an empty document for a source file.
    pub fn new(
        kind: DocumentKind,
        source_path: PathBuf,
        relative_path: PathBuf,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            kind,
            source_path,
            relative_path,
            last_modified,
            target_path: None,
            front_matter: FrontMatter::default(),
            html: String::new(),
            heading: None,
            prev_id: None,
            next_id: None,
            tags: Vec::new(),
        }
    }

    /// Get the document title: front matter, then first heading, then filename.
    pub fn title(&self) -> String {
        self.front_matter
            .get("title")
            .map(str::to_string)
            .or_else(|| self.heading.clone())
            .unwrap_or_else(|| {
                self.relative_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(title_case)
                    .unwrap_or_else(|| "Untitled".to_string())
            })
    }

    pub fn is_private(&self) -> bool {
        self.front_matter.is_true("private")
    }

    /// Drafts carry a `draft` key with any value.
    pub fn is_draft(&self) -> bool {
        self.front_matter.contains_key("draft")
    }

    pub fn is_ignored(&self) -> bool {
        self.front_matter.is_true("ignore")
    }
}

/// Split a `tags` value on everything that is not a letter or a digit.
pub fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Front matter parsing
// =============================================================================

/// Result of parsing front matter from markdown content.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The markdown content without the front matter block
    pub content: String,
}

/// Parse front matter from markdown content.
///
/// Front matter is a block delimited by `---` at the start of the file:
///
/// ```markdown
/// ---
/// title: My Post
/// published_on: 5 Jan 2024 10:00:00
/// tags: rust, web
/// ---
///
/// # Content starts here
/// ```
///
/// The block is read as a YAML mapping. Blocks that are not valid YAML
/// (`title: Rust: the good parts`) are read line by line instead, splitting
/// each line at its first colon.
pub fn parse_front_matter(content: &str) -> ParsedContent {
    let content = content.trim_start();

    if !content.starts_with("---") {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    }

    let after_opening = &content[3..];
    let Some(closing_pos) = after_opening.find("\n---") else {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    };

    let block = after_opening[..closing_pos].trim_start_matches(['\r', '\n']);

    // "---" + block + "\n---"
    let markdown_start = 3 + closing_pos + 4;
    let markdown_content = if markdown_start < content.len() {
        content[markdown_start..]
            .trim_start_matches(['\r', '\n'])
            .to_string()
    } else {
        String::new()
    };

    let front_matter = match parse_yaml_block(block) {
        Ok(fm) => fm,
        Err(e) => {
            tracing::warn!("front matter is not valid YAML ({e}), reading it line by line");
            parse_plain_block(block)
        }
    };

    ParsedContent {
        front_matter,
        content: markdown_content,
    }
}

fn parse_yaml_block(block: &str) -> Result<FrontMatter, serde_yaml::Error> {
    if block.trim().is_empty() {
        return Ok(FrontMatter::default());
    }

    match serde_yaml::from_str::<serde_yaml::Value>(block)? {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping
            .iter()
            .map(|(k, v)| (yaml_to_string(k), yaml_to_string(v)))
            .collect()),
        serde_yaml::Value::Null => Ok(FrontMatter::default()),
        other => Err(serde::de::Error::custom(format!(
            "expected a mapping, found {}",
            yaml_to_string(&other)
        ))),
    }
}

fn parse_plain_block(block: &str) -> FrontMatter {
    block
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn yaml_to_string(value: &serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(yaml_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Tagged(tagged) => yaml_to_string(&tagged.value),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
