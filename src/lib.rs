//! Static site generation for front-matter tagged markdown blogs.
//!
//! A build reads `posts/` and `pages/` under a source root, derives
//! metadata for every document, links posts chronologically, and writes
//! HTML pages, `sitemap.xml` and `feed.xml` under an output root.

pub mod build;
pub mod config;
pub mod util;
