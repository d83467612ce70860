//! RSS feed generation.

use rss::validation::{Validate, ValidationError};
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use super::brief::{DEFAULT_BRIEF_LENGTH, brief};
use super::document::Document;
use super::paths::absolute_url;
use crate::config::SiteConfig;

/// Maximum number of items in the feed.
pub const FEED_ITEM_LIMIT: usize = 10;

/// File name of the feed in the output root.
pub const FEED_FILE: &str = "feed.xml";

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("rss validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Generate the RSS 2.0 document for the first [`FEED_ITEM_LIMIT`] posts.
///
/// `posts` are expected newest first. The channel's publication and build
/// dates are those of the newest post, so unchanged input yields an
/// identical feed.
pub fn feed_xml(site: &SiteConfig, posts: &[&Document]) -> Result<String, FeedError> {
    let posts = &posts[..posts.len().min(FEED_ITEM_LIMIT)];
    let items: Vec<Item> = posts.iter().map(|post| post_to_item(post, site)).collect();
    let newest = posts.first().map(|post| post.last_modified.to_rfc2822());

    let channel = ChannelBuilder::default()
        .title(&site.name)
        .link(&site.url)
        .description(site.description())
        .language(Some(site.language.clone()))
        .pub_date(newest.clone())
        .last_build_date(newest)
        .items(items)
        .build();

    channel.validate()?;
    Ok(channel.to_string())
}

fn post_to_item(post: &Document, site: &SiteConfig) -> Item {
    let link = absolute_url(&site.url, post.target_path.as_deref().unwrap_or_default());
    let title = post
        .front_matter
        .get("title")
        .map(str::to_string)
        .unwrap_or_else(|| site.url.clone());

    ItemBuilder::default()
        .title(Some(title))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(Some(brief(&post.html, DEFAULT_BRIEF_LENGTH)))
        .pub_date(Some(post.last_modified.to_rfc2822()))
        .content(Some(post.html.clone()))
        .build()
}
