use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use walkdir::WalkDir;

use super::document::{Document, DocumentId, DocumentKind, parse_front_matter, parse_tags};
use super::linking::link_posts;
use super::markdown::MarkdownRenderer;
use super::paths::{page_target_path, post_target_path};
use super::pipeline::Pipeline;
use crate::util::is_hidden;

/// Format of the `published_on` front matter key, in UTC (e.g. "5 Jan 2024 10:00:00").
pub const PUBLISHED_ON_FORMAT: &str = "%d %b %Y %H:%M:%S";

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("content folder does not exist: {0}")]
    FolderNotFound(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

// =============================================================================
// Content store
// =============================================================================

/// The loaded corpus: posts and pages, each sorted newest first.
///
/// Drafts never make it into the store. Private documents do, but are
/// left out of [`Self::public_posts`] and [`Self::public_pages`].
#[derive(Debug, Default)]
pub struct ContentStore {
    posts: Vec<Document>,
    pages: Vec<Document>,
}

/// A markdown file found during discovery, before it is read.
struct DiscoveredFile {
    kind: DocumentKind,
    path: PathBuf,
    relative_path: PathBuf,
}

impl ContentStore {
    /// Load `root/posts` (flat) and `root/pages` (recursive).
    ///
    /// Steps:
    /// 1. Discover markdown files in both folders
    /// 2. Assign ids in full-path order across posts and pages
    /// 3. Read, parse and render each file, derive dates and target paths
    /// 4. Run the processing pipeline over each document
    /// 5. Sort newest first, drop drafts, link posts
    pub fn load(
        root: &Path,
        pipeline: &Pipeline,
        markdown: &MarkdownRenderer,
    ) -> Result<Self, ContentError> {
        let posts_dir = require_folder(root, "posts")?;
        let pages_dir = require_folder(root, "pages")?;

        let mut discovered = discover(&posts_dir, DocumentKind::Post, false)?;
        discovered.extend(discover(&pages_dir, DocumentKind::Page, true)?);
        discovered.sort_by(|a, b| a.path.cmp(&b.path));

        let mut posts = Vec::new();
        let mut pages = Vec::new();
        for (id, file) in discovered.into_iter().enumerate() {
            let doc = pipeline.run(read_document(id, file, markdown)?);
            match doc.kind {
                DocumentKind::Post => posts.push(doc),
                DocumentKind::Page => pages.push(doc),
            }
        }

        Ok(Self::from_documents(posts, pages))
    }

    /// Build a store from already-parsed documents.
    ///
    /// Applies the same sorting, draft filtering and linking as [`Self::load`].
    pub fn from_documents(mut posts: Vec<Document>, mut pages: Vec<Document>) -> Self {
        for docs in [&mut posts, &mut pages] {
            docs.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
            docs.retain(|doc| {
                if doc.is_draft() {
                    tracing::debug!("skipping draft {}", doc.relative_path.display());
                }
                !doc.is_draft()
            });
        }

        link_posts(&mut posts);

        Self { posts, pages }
    }

    /// All posts, newest first.
    pub fn posts(&self) -> &[Document] {
        &self.posts
    }

    /// All pages, newest first.
    pub fn pages(&self) -> &[Document] {
        &self.pages
    }

    pub fn public_posts(&self) -> impl Iterator<Item = &Document> {
        self.posts.iter().filter(|doc| !doc.is_private())
    }

    pub fn public_pages(&self) -> impl Iterator<Item = &Document> {
        self.pages.iter().filter(|doc| !doc.is_private())
    }

    /// Look up a post or page by id.
    pub fn find(&self, id: DocumentId) -> Option<&Document> {
        self.posts
            .iter()
            .chain(self.pages.iter())
            .find(|doc| doc.id == id)
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn require_folder(root: &Path, name: &str) -> Result<PathBuf, ContentError> {
    let folder = root.join(name);
    if !folder.is_dir() {
        return Err(ContentError::FolderNotFound(folder));
    }
    Ok(folder)
}

/// Collect the markdown files of a folder, skipping hidden entries.
fn discover(
    dir: &Path,
    kind: DocumentKind,
    recursive: bool,
) -> Result<Vec<DiscoveredFile>, ContentError> {
    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
    {
        let entry = entry.map_err(|source| ContentError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if !path.is_file() || !is_markdown(path) {
            continue;
        }

        let relative_path = path
            .strip_prefix(dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));

        files.push(DiscoveredFile {
            kind,
            path: path.to_path_buf(),
            relative_path,
        });
    }

    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_lowercase().as_str(), "md" | "markdown"))
}

/// Read one source file into a document with all derived fields set.
fn read_document(
    id: DocumentId,
    file: DiscoveredFile,
    markdown: &MarkdownRenderer,
) -> Result<Document, ContentError> {
    let read_error = |source| ContentError::ReadFile {
        path: file.path.clone(),
        source,
    };
    let raw = std::fs::read_to_string(&file.path).map_err(read_error)?;
    let modified = std::fs::metadata(&file.path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let parsed = parse_front_matter(&raw);
    let rendered = markdown.render(&parsed.content);

    let last_modified = match parsed.front_matter.get("published_on") {
        Some(value) => parse_published_on(value).unwrap_or_else(|| {
            tracing::warn!(
                "{}: cannot parse published_on '{}', using the file modification time",
                file.path.display(),
                value
            );
            modified
        }),
        None => modified,
    };

    let target_path = match file.kind {
        DocumentKind::Post => post_target_path(&file.relative_path, &last_modified),
        DocumentKind::Page => page_target_path(&file.relative_path),
    };

    tracing::debug!("loaded {} -> {}", file.path.display(), target_path);

    let mut doc = Document::new(file.kind, file.path, file.relative_path, last_modified);
    doc.id = id;
    doc.target_path = Some(target_path);
    doc.tags = parsed
        .front_matter
        .get("tags")
        .map(parse_tags)
        .unwrap_or_default();
    doc.heading = rendered.first_heading().map(str::to_string);
    doc.html = rendered.html;
    doc.front_matter = parsed.front_matter;
    doc.front_matter.insert("type", file.kind.as_str());

    Ok(doc)
}

/// Parse a `published_on` value; `None` when it does not match the format.
pub fn parse_published_on(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), PUBLISHED_ON_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
