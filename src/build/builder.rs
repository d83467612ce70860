use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{Config, SiteConfig};

use super::content::{ContentError, ContentStore};
use super::document::Document;
use super::feed::{FEED_FILE, FeedError, feed_xml};
use super::hooks::{ContentHook, FileProcessor, Hooks, MetadataHook};
use super::markdown::{MarkdownError, MarkdownRenderer};
use super::paths::{absolute_url, page_target_path, target_to_output_path};
use super::pipeline::{Pipeline, PipelineError};
use super::render::render_page;
use super::sitemap::{Sitemap, SitemapEntry};
use super::sync::{SyncError, SyncStats, install_cookie_script, install_file, sync_folder};

/// Sitemap priority of posts unless overridden.
pub const DEFAULT_POST_PRIORITY: f64 = 0.25;

/// Sitemap priority of pages unless overridden.
pub const DEFAULT_PAGE_PRIORITY: f64 = 1.0;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("markdown error: {0}")]
    Markdown(#[from] MarkdownError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Summary of a full build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub posts: usize,
    pub pages: usize,
    pub sitemap_entries: usize,
    pub feed_items: usize,
}

/// Orchestrates the output of a site.
///
/// A builder owns the site settings, the markdown renderer, the processing
/// pipeline, the hook lists and file processors, the loaded content and the
/// sitemap collected while writing pages.
pub struct SiteBuilder {
    site: SiteConfig,
    /// Root holding `posts/`, `pages/` and static folders
    source_root: PathBuf,
    output_root: PathBuf,
    markdown: MarkdownRenderer,
    pipeline: Pipeline,
    hooks: Hooks,
    processors: HashMap<String, FileProcessor>,
    content: ContentStore,
    sitemap: Sitemap,
}

impl SiteBuilder {
    pub fn new(
        site: SiteConfig,
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        let pipeline = Pipeline::default_pipeline(site.cdn.as_deref());
        Self {
            site,
            source_root: source_root.into(),
            output_root: output_root.into(),
            markdown: MarkdownRenderer::default(),
            pipeline,
            hooks: Hooks::with_default_content(),
            processors: HashMap::new(),
            content: ContentStore::default(),
            sitemap: Sitemap::new(),
        }
    }

    /// Create a builder from a loaded config, resolving folders against `base_path`.
    pub fn from_config(config: &Config, base_path: &Path) -> Result<Self, BuildError> {
        let mut builder = Self::new(
            config.site.clone(),
            config.source_dir(base_path),
            config.output_dir(base_path),
        );
        builder.set_markdown(MarkdownRenderer::new(&config.markdown)?);
        Ok(builder)
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn set_markdown(&mut self, markdown: MarkdownRenderer) -> &mut Self {
        self.markdown = markdown;
        self
    }

    /// The processing pipeline run over every document on [`Self::load`].
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    // =========================================================================
    // Hook registration
    // =========================================================================

    pub fn add_head_hook(&mut self, hook: MetadataHook) -> &mut Self {
        self.hooks.head.push(hook);
        self
    }

    pub fn add_header_hook(&mut self, hook: MetadataHook) -> &mut Self {
        self.hooks.header.push(hook);
        self
    }

    pub fn add_content_hook(&mut self, hook: ContentHook) -> &mut Self {
        self.hooks.content.push(hook);
        self
    }

    /// Insert a content hook at `index` (clamped to the list length).
    ///
    /// Index 0 places it before the default body hook.
    pub fn insert_content_hook(&mut self, index: usize, hook: ContentHook) -> &mut Self {
        let index = index.min(self.hooks.content.len());
        self.hooks.content.insert(index, hook);
        self
    }

    pub fn add_footer_hook(&mut self, hook: MetadataHook) -> &mut Self {
        self.hooks.footer.push(hook);
        self
    }

    pub fn add_end_hook(&mut self, hook: MetadataHook) -> &mut Self {
        self.hooks.end.push(hook);
        self
    }

    /// Register a processor for files with the given extension (case-insensitive).
    pub fn add_file_processor(&mut self, extension: &str, processor: FileProcessor) -> &mut Self {
        self.processors
            .insert(extension.trim_start_matches('.').to_lowercase(), processor);
        self
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Load posts and pages from the source root.
    pub fn load(&mut self) -> Result<&ContentStore, BuildError> {
        self.content = ContentStore::load(&self.source_root, &self.pipeline, &self.markdown)?;
        tracing::info!(
            "loaded {} post(s) and {} page(s) from {}",
            self.content.posts().len(),
            self.content.pages().len(),
            self.source_root.display()
        );
        Ok(&self.content)
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn sitemap(&self) -> &Sitemap {
        &self.sitemap
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Assemble the HTML page of a document from the registered hooks.
    pub fn render(&self, doc: &Document) -> String {
        render_page(doc, &self.hooks, &self.site.language)
    }

    /// Write one document and register its sitemap entry.
    ///
    /// The page goes to the document's target path, or to `fallback_path`
    /// when it has none.
    pub fn output_document(
        &mut self,
        doc: &Document,
        fallback_path: &str,
        default_priority: f64,
    ) -> Result<(), BuildError> {
        if let Some(entry) = self.write_document(doc, fallback_path, default_priority)? {
            self.sitemap.push(entry);
        }
        Ok(())
    }

    pub fn output_posts(&mut self) -> Result<usize, BuildError> {
        self.output_posts_with_priority(DEFAULT_POST_PRIORITY)
    }

    pub fn output_posts_with_priority(&mut self, default_priority: f64) -> Result<usize, BuildError> {
        let entries = self.write_all(self.content.posts(), default_priority)?;
        Ok(self.register(entries))
    }

    pub fn output_pages(&mut self) -> Result<usize, BuildError> {
        self.output_pages_with_priority(DEFAULT_PAGE_PRIORITY)
    }

    pub fn output_pages_with_priority(&mut self, default_priority: f64) -> Result<usize, BuildError> {
        let entries = self.write_all(self.content.pages(), default_priority)?;
        Ok(self.register(entries))
    }

    /// Write every non-ignored document, collecting sitemap entries.
    fn write_all(
        &self,
        docs: &[Document],
        default_priority: f64,
    ) -> Result<Vec<Option<SitemapEntry>>, BuildError> {
        docs.iter()
            .filter(|doc| !doc.is_ignored())
            .map(|doc| {
                let fallback = page_target_path(&doc.relative_path);
                self.write_document(doc, &fallback, default_priority)
            })
            .collect()
    }

    /// Add collected entries to the sitemap, returning the number of pages written.
    fn register(&mut self, entries: Vec<Option<SitemapEntry>>) -> usize {
        let written = entries.len();
        self.sitemap.extend(entries.into_iter().flatten());
        written
    }

    fn write_document(
        &self,
        doc: &Document,
        fallback_path: &str,
        default_priority: f64,
    ) -> Result<Option<SitemapEntry>, BuildError> {
        let target = doc.target_path.as_deref().unwrap_or(fallback_path);
        let output_path = target_to_output_path(target, &self.output_root);

        write_file(&output_path, self.render(doc).as_bytes())?;
        tracing::debug!("wrote {}", output_path.display());

        let priority = effective_priority(doc, default_priority);
        if doc.is_private() || priority.is_nan() || priority <= 0.0 {
            return Ok(None);
        }
        Ok(Some(SitemapEntry {
            url: absolute_url(&self.site.url, target),
            last_modified: doc.last_modified,
            priority,
        }))
    }

    /// Copy `source_root/source` into `output_root/target`, running file processors.
    pub fn sync_and_process_folder(
        &self,
        source: &str,
        target: &str,
        include_hidden: bool,
    ) -> Result<SyncStats, BuildError> {
        let stats = sync_folder(
            &self.source_root.join(source),
            &self.output_root.join(target),
            include_hidden,
            &self.processors,
        )?;
        tracing::info!(
            "synced {}: {} copied, {} processed, {} up to date",
            source,
            stats.copied,
            stats.processed,
            stats.skipped
        );
        Ok(stats)
    }

    /// Copy an optional file of the source root into `output_root/to`.
    pub fn install_file(&self, relative: &str, to: &str) -> Result<bool, BuildError> {
        Ok(install_file(
            &self.source_root.join(relative),
            &self.output_root.join(to),
        )?)
    }

    /// Write the bundled cookie consent script to `js/cookie-notice.js`.
    pub fn install_cookie_script(&self) -> Result<PathBuf, BuildError> {
        Ok(install_cookie_script(&self.output_root)?)
    }

    /// Write the syntax highlighting stylesheet, if the theme provides one.
    pub fn install_highlight_css(&self, relative: &str) -> Result<bool, BuildError> {
        let Some(css) = self.markdown.highlight_css() else {
            return Ok(false);
        };
        write_file(&target_to_output_path(relative, &self.output_root), css.as_bytes())?;
        Ok(true)
    }

    /// Write `sitemap.xml` with every entry collected so far.
    pub fn output_sitemap(&self) -> Result<PathBuf, BuildError> {
        self.sitemap
            .write(&self.output_root)
            .map_err(|source| BuildError::Io {
                path: self.output_root.join(super::sitemap::SITEMAP_FILE),
                source,
            })
    }

    /// Write `feed.xml` from `posts`, or from all loaded posts.
    pub fn output_rss_feed(&self, posts: Option<&[&Document]>) -> Result<usize, BuildError> {
        let all: Vec<&Document>;
        let posts = match posts {
            Some(posts) => posts,
            None => {
                all = self.content.posts().iter().collect();
                all.as_slice()
            }
        };

        let xml = feed_xml(&self.site, posts)?;
        let path = self.output_root.join(FEED_FILE);
        write_file(&path, xml.as_bytes())?;

        let items = posts.len().min(super::feed::FEED_ITEM_LIMIT);
        tracing::info!("wrote feed with {} item(s)", items);
        Ok(items)
    }

    /// Full build: load, pages, posts, sitemap, then a feed of public posts.
    pub fn build(&mut self) -> Result<BuildResult, BuildError> {
        self.load()?;
        let pages = self.output_pages()?;
        let posts = self.output_posts()?;
        self.output_sitemap()?;
        let public: Vec<&Document> = self.content.public_posts().collect();
        let feed_items = self.output_rss_feed(Some(public.as_slice()))?;

        Ok(BuildResult {
            output_dir: self.output_root.clone(),
            posts,
            pages,
            sitemap_entries: self.sitemap.len(),
            feed_items,
        })
    }
}

/// `sitemap_priority` when present and numeric, else the default.
fn effective_priority(doc: &Document, default_priority: f64) -> f64 {
    doc.front_matter
        .get("sitemap_priority")
        .and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(default_priority)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), BuildError> {
    let io_error = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, contents).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::DocumentKind;
    use chrono::{DateTime, Utc};
    use maud::{PreEscaped, html};
    use std::collections::{BTreeMap, HashSet};
    use std::fs;
    use tempfile::TempDir;
    use walkdir::WalkDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn dated(published_on: &str, extra: &str, body: &str) -> String {
        format!("---\npublished_on: {published_on}\n{extra}---\n{body}\n")
    }

    /// A source tree with two linked posts, a draft, and a few pages.
    fn source_tree() -> TempDir {
        let src = TempDir::new().unwrap();
        let root = src.path();
        write(root, "posts/hello.md", &dated("5 Jan 2024 10:00:00", "", "# Hello\n\nFirst post."));
        write(
            root,
            "posts/world.md",
            &dated("10 Jan 2024 10:00:00", "tags: news\n", "# World\n\nSecond post."),
        );
        write(
            root,
            "posts/unfinished.md",
            &dated("12 Jan 2024 10:00:00", "draft: \"true\"\n", "# Unfinished\n\nSoon."),
        );
        write(root, "pages/about.md", "---\ntitle: About\n---\nAbout me.\n");
        write(root, "pages/hidden.md", "---\nsitemap_priority: \"0\"\n---\n# Hidden\n");
        write(root, "pages/secret.md", "---\nprivate: \"true\"\n---\n# Secret\n");
        write(root, "pages/skip.md", "---\nignore: \"true\"\n---\n# Skip\n");
        src
    }

    fn builder(src: &Path, out: &Path) -> SiteBuilder {
        SiteBuilder::new(SiteConfig::new("My Blog", "https://example.com/"), src, out)
    }

    fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                (
                    e.path().strip_prefix(root).unwrap().to_path_buf(),
                    fs::read(e.path()).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_full_build_outputs() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());

        let result = builder.build().unwrap();

        assert_eq!(result.posts, 2);
        assert_eq!(result.pages, 3);
        assert_eq!(result.feed_items, 2);
        for file in [
            "2024/01/hello.html",
            "2024/01/world.html",
            "about.html",
            "hidden.html",
            "secret.html",
            "sitemap.xml",
            "feed.xml",
        ] {
            assert!(out.path().join(file).is_file(), "missing {file}");
        }
        assert!(!out.path().join("skip.html").exists());
    }

    #[test]
    fn test_scenario_linked_posts() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());

        let store = builder.load().unwrap();
        let [world, hello] = store.posts() else {
            panic!("expected two posts");
        };

        assert_eq!(world.relative_path, PathBuf::from("world.md"));
        assert_eq!(world.prev_id, Some(hello.id));
        assert_eq!(world.next_id, None);
        assert_eq!(hello.next_id, Some(world.id));
        assert_eq!(hello.prev_id, None);
    }

    #[test]
    fn test_scenario_draft_absent_everywhere() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());
        builder.build().unwrap();

        assert!(builder.content().posts().iter().all(|p| !p.is_draft()));
        assert!(!out.path().join("2024/01/unfinished.html").exists());
        let sitemap = fs::read_to_string(out.path().join("sitemap.xml")).unwrap();
        let feed = fs::read_to_string(out.path().join("feed.xml")).unwrap();
        assert!(!sitemap.contains("unfinished"));
        assert!(!feed.contains("unfinished"));
        assert!(!feed.contains("Unfinished"));
    }

    #[test]
    fn test_scenario_cdn_rewrite() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("posts")).unwrap();
        write(
            src.path(),
            "pages/gallery.md",
            "<img src=\"/img/a.png\">\n\n<img src=\"https://ext.com/a.png\">\n",
        );
        let mut site = SiteConfig::new("My Blog", "https://example.com");
        site.cdn = Some("https://cdn.example.com".to_string());
        let mut builder = SiteBuilder::new(site, src.path(), out.path());

        builder.build().unwrap();

        let html = fs::read_to_string(out.path().join("gallery.html")).unwrap();
        assert!(html.contains(r#"<img src="https://cdn.example.com/img/a.png">"#));
        assert!(html.contains(r#"<img src="https://ext.com/a.png">"#));
    }

    #[test]
    fn test_scenario_zero_priority_and_private_pages() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());
        builder.build().unwrap();

        let urls: HashSet<_> = builder.sitemap().entries().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            HashSet::from([
                "https://example.com/about.html",
                "https://example.com/2024/01/hello.html",
                "https://example.com/2024/01/world.html",
            ])
        );
        assert!(out.path().join("hidden.html").is_file());
        assert!(out.path().join("secret.html").is_file());

        let sitemap = fs::read_to_string(out.path().join("sitemap.xml")).unwrap();
        let about = sitemap.find("about.html").unwrap();
        let hello = sitemap.find("hello.html").unwrap();
        assert!(about < hello, "pages (1.0) sort before posts (0.25)");
    }

    #[test]
    fn test_sitemap_priority_override() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "pages/a.md", "---\nsitemap_priority: \"0.7\"\n---\nA\n");
        write(src.path(), "pages/b.md", "---\nsitemap_priority: high\n---\nB\n");
        write(src.path(), "pages/c.md", "---\nsitemap_priority: \"NaN\"\n---\nC\n");
        fs::create_dir_all(src.path().join("posts")).unwrap();
        let mut builder = builder(src.path(), out.path());
        builder.load().unwrap();

        builder.output_pages_with_priority(0.5).unwrap();

        let priorities: BTreeMap<_, _> = builder
            .sitemap()
            .entries()
            .iter()
            .map(|e| (e.url.clone(), e.priority))
            .collect();
        assert_eq!(priorities.len(), 2);
        assert_eq!(priorities["https://example.com/a.html"], 0.7);
        assert_eq!(priorities["https://example.com/b.html"], 0.5);
    }

    #[test]
    fn test_output_document_fallback_path() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());
        let mut doc = Document::new(
            DocumentKind::Page,
            src.path().join("pages/x.md"),
            PathBuf::from("x.md"),
            DateTime::<Utc>::UNIX_EPOCH,
        );
        doc.html = "<p>x</p>".to_string();

        builder.output_document(&doc, "custom/x.html", 0.5).unwrap();

        assert!(out.path().join("custom/x.html").is_file());
        assert_eq!(builder.sitemap().entries()[0].url, "https://example.com/custom/x.html");
    }

    #[test]
    fn test_hooks_shape_the_page() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());
        builder
            .add_head_hook(Box::new(|fm| html! { title { (fm.get("title").unwrap_or("?")) } }))
            .add_header_hook(Box::new(|_| html! { "HEADER" }))
            .add_footer_hook(Box::new(|_| html! { "FOOTER" }))
            .add_end_hook(Box::new(|_| html! { (PreEscaped("<script></script>")) }))
            .add_content_hook(Box::new(|_| html! { "AFTER" }))
            .insert_content_hook(0, Box::new(|_| html! { "BEFORE" }));
        builder.build().unwrap();

        let html = fs::read_to_string(out.path().join("about.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\"><head><title>About</title></head>"));
        assert!(html.contains(
            "<div class=\"section page\">BEFORE<div class=\"content_body\"><p>About me.</p>\n</div>AFTER</div>"
        ));
        assert!(html.contains("<div class=\"footer\">FOOTER</div><script></script></body>"));
    }

    #[test]
    fn test_builds_are_idempotent() {
        let src = source_tree();
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        builder(src.path(), first.path()).build().unwrap();
        let once = read_tree(first.path());
        builder(src.path(), first.path()).build().unwrap();
        builder(src.path(), second.path()).build().unwrap();

        assert_eq!(read_tree(first.path()), once);
        assert_eq!(read_tree(second.path()), once);
    }

    #[test]
    fn test_ids_are_unique() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());
        let store = builder.load().unwrap();

        let ids: HashSet<_> = store.posts().iter().chain(store.pages()).map(|d| d.id).collect();
        assert_eq!(ids.len(), store.len());
    }

    #[test]
    fn test_sync_and_install() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        write(src.path(), "static/style.CSS", "a  b");
        write(src.path(), "static/logo.png", "png");
        let mut builder = builder(src.path(), out.path());
        builder.add_file_processor(
            ".css",
            Box::new(|from, to| fs::write(to, fs::read_to_string(from)?.replace("  ", " "))),
        );

        let stats = builder.sync_and_process_folder("static", "assets", false).unwrap();
        assert_eq!((stats.copied, stats.processed), (1, 1));
        assert_eq!(fs::read_to_string(out.path().join("assets/style.CSS")).unwrap(), "a b");

        assert!(!builder.install_file("favicon.ico", ".").unwrap());
        builder.install_cookie_script().unwrap();
        assert!(out.path().join("js/cookie-notice.js").is_file());

        assert!(matches!(
            builder.sync_and_process_folder("missing", "missing", false),
            Err(BuildError::Sync(SyncError::FolderNotFound(_)))
        ));
    }

    #[test]
    fn test_feed_from_given_posts() {
        let src = source_tree();
        let out = TempDir::new().unwrap();
        let mut builder = builder(src.path(), out.path());
        builder.load().unwrap();

        let oldest: Vec<&Document> = builder.content().posts().iter().skip(1).collect();
        assert_eq!(builder.output_rss_feed(Some(oldest.as_slice())).unwrap(), 1);

        let feed = fs::read_to_string(out.path().join("feed.xml")).unwrap();
        assert!(feed.contains("https://example.com/2024/01/hello.html"));
        assert!(!feed.contains("https://example.com/2024/01/world.html"));
    }

    #[test]
    fn test_full_build_feed_leaves_out_private_posts() {
        let src = source_tree();
        write(
            src.path(),
            "posts/classified.md",
            &dated("20 Jan 2024 10:00:00", "private: \"true\"\n", "# Classified\n\nHush."),
        );
        let out = TempDir::new().unwrap();

        let result = builder(src.path(), out.path()).build().unwrap();

        let feed = fs::read_to_string(out.path().join("feed.xml")).unwrap();
        let sitemap = fs::read_to_string(out.path().join("sitemap.xml")).unwrap();
        assert!(out.path().join("2024/01/classified.html").is_file());
        assert_eq!(result.feed_items, 2);
        assert!(!feed.contains("classified"));
        assert!(!feed.contains("Hush"));
        assert!(!sitemap.contains("classified"));
    }

    #[test]
    fn test_missing_content_folder_is_fatal() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("posts")).unwrap();

        let err = builder(src.path(), out.path()).build().unwrap_err();
        assert!(matches!(err, BuildError::Content(ContentError::FolderNotFound(_))));
    }
}
