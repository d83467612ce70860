mod brief;
mod builder;
pub mod components;
mod content;
mod document;
mod feed;
mod highlight;
pub mod hooks;
mod linking;
mod markdown;
mod paths;
pub mod pipeline;
mod render;
mod sitemap;
mod sync;

pub use brief::{DEFAULT_BRIEF_LENGTH, brief};
pub use builder::{
    BuildError, BuildResult, DEFAULT_PAGE_PRIORITY, DEFAULT_POST_PRIORITY, SiteBuilder,
};
pub use content::{ContentError, ContentStore, PUBLISHED_ON_FORMAT};
pub use document::{Document, DocumentId, DocumentKind, FrontMatter};
pub use feed::{FEED_FILE, FEED_ITEM_LIMIT, FeedError};
pub use highlight::SyntaxHighlighter;
pub use linking::link_posts;
pub use markdown::{MarkdownError, MarkdownRenderer};
pub use paths::base_path_from_config;
pub use sitemap::{SITEMAP_FILE, Sitemap, SitemapEntry};
pub use sync::{COOKIE_NOTICE_PATH, COOKIE_NOTICE_SCRIPT, SyncError, SyncStats};
