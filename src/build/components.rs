//! Ready-made hooks for a typical blog layout.
//!
//! Metadata hooks go into the head, header, footer or end lists; content
//! hooks into the content list (usually around the default body hook).
//! Hooks that need the corpus ([`post_navigation`], [`latest_listing`])
//! take a snapshot of the loaded [`ContentStore`].

use std::collections::HashMap;

use maud::{Markup, PreEscaped, html};

use super::brief::{DEFAULT_BRIEF_LENGTH, brief};
use super::content::ContentStore;
use super::document::{Document, DocumentId, DocumentKind};
use super::hooks::{ContentHook, MetadataHook};
use super::sync::COOKIE_NOTICE_PATH;
use crate::config::{MenuEntry, SiteConfig};

/// Date format of brief cards, e.g. "05 Jan 2024".
pub const BRIEF_DATE_FORMAT: &str = "%d %b %Y";

const COOKIE_NOTICE_TEXT: &str = "We use cookies to ensure we give the best experience on our website. If you continue to use this website we will assume you are happy with this.";

// =============================================================================
// Head
// =============================================================================

/// Charset, viewport, title, description and social image.
pub fn standard_head(site: &SiteConfig) -> MetadataHook {
    let site_name = site.name.clone();
    Box::new(move |fm| {
        let title = match fm.get("title") {
            Some(title) => format!("{title} - {site_name}"),
            None => site_name.clone(),
        };
        let image = fm.get("socialmedia_image").or_else(|| fm.get("featured_image"));

        html! {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            title { (title) }
            @if let Some(description) = fm.get("description") {
                meta name="description" content=(description);
            }
            @if let Some(image) = image {
                meta property="og:image" content=(image);
            }
        }
    })
}

/// A `<link rel="stylesheet">` to a site-relative path.
pub fn stylesheet(href: impl Into<String>) -> MetadataHook {
    let href = href.into();
    Box::new(move |_| {
        html! {
            link rel="stylesheet" href=(href);
        }
    })
}

// =============================================================================
// Header and footer
// =============================================================================

pub fn menu(entries: &[MenuEntry]) -> MetadataHook {
    let entries = entries.to_vec();
    Box::new(move |_| {
        html! {
            div class="menu section" {
                @for entry in &entries {
                    span class="menu_item" {
                        a href=(entry.link) { (entry.text) }
                    }
                }
            }
        }
    })
}

pub fn footer(text: impl Into<String>) -> MetadataHook {
    let text = text.into();
    Box::new(move |_| html! { p { (text) } })
}

/// Hidden consent banner that loads the cookie script on demand.
pub fn cookie_notice() -> MetadataHook {
    let loader = format!(
        "var script=document.createElement('script');script.onload=function (){{cookieNotice()}};script.src='/{COOKIE_NOTICE_PATH}';document.head.appendChild(script);"
    );
    Box::new(move |_| {
        html! {
            div id="cookie-notice" style="display: none;" {
                span class="cookie-notice-text" { (COOKIE_NOTICE_TEXT) }
                a class="cookie-notice-button" href="#" onclick="cookieNoticeAccept();" { "Ok" }
                script { (PreEscaped(&loader)) }
            }
        }
    })
}

// =============================================================================
// Content
// =============================================================================

/// `<h1 class="content_header post_header">` with the document title.
pub fn post_header() -> ContentHook {
    Box::new(|doc| {
        html! {
            @if let Some(title) = doc.front_matter.get("title") {
                div {
                    h1 class="content_header post_header" { (title) }
                }
            }
        }
    })
}

/// Tag list of posts.
pub fn tags() -> ContentHook {
    Box::new(|doc| {
        html! {
            @if doc.kind == DocumentKind::Post && !doc.tags.is_empty() {
                div class="tags" {
                    @for tag in &doc.tags {
                        span class="tag" { (tag) }
                    }
                }
            }
        }
    })
}

/// Title and link of a linked post.
#[derive(Debug, Clone)]
struct LinkTarget {
    title: String,
    href: String,
}

/// Previous/next links of posts, resolved against `store`.
pub fn post_navigation(store: &ContentStore) -> ContentHook {
    let targets: HashMap<DocumentId, LinkTarget> = store
        .posts()
        .iter()
        .map(|post| {
            (
                post.id,
                LinkTarget {
                    title: post.title(),
                    href: site_href(post),
                },
            )
        })
        .collect();

    Box::new(move |doc| {
        let links: Vec<(&str, &str, &LinkTarget)> = [
            (doc.prev_id, "nav_prev", "\u{2190} "),
            (doc.next_id, "nav_next", "\u{2192} "),
        ]
        .into_iter()
        .filter_map(|(id, class, label)| Some((class, label, targets.get(&id?)?)))
        .collect();

        html! {
            @if !links.is_empty() {
                div class="post_navigation" {
                    @for (class, label, target) in &links {
                        span class=(class) {
                            a href=(target.href) { (label) (target.title) }
                        }
                    }
                }
            }
        }
    })
}

/// Summary card of a document: title link, date, featured image and brief.
pub fn brief_card(doc: &Document, date_format: Option<&str>) -> Markup {
    let href = site_href(doc);

    html! {
        div class="brief" {
            @if let Some(title) = doc.front_matter.get("title") {
                div class="brief_header" {
                    a href=(href) { h2 { (title) } }
                }
            }
            @if let Some(format) = date_format {
                div class="brief_date" { (doc.last_modified.format(format).to_string()) }
            }
            @if let Some(image) = doc.front_matter.get("featured_image") {
                div class="brief_image" {
                    a href=(href) { img src=(image); }
                }
            }
            div class="brief_body" {
                p { (PreEscaped(brief(&doc.html, DEFAULT_BRIEF_LENGTH))) }
            }
            div style="clear: both;" {}
        }
    }
}

/// Cards of the first `count` posts.
pub fn latest<'a>(
    posts: impl IntoIterator<Item = &'a Document>,
    count: usize,
    date_format: Option<&str>,
) -> Markup {
    html! {
        div class="latest" {
            @for post in posts.into_iter().take(count) {
                (brief_card(post, date_format))
            }
        }
    }
}

/// Renders [`latest`] public posts on documents with a numeric `latest` key.
pub fn latest_listing(store: &ContentStore) -> ContentHook {
    let posts: Vec<Document> = store.public_posts().cloned().collect();
    Box::new(move |doc| {
        let count = doc
            .front_matter
            .get("latest")
            .and_then(|n| n.trim().parse::<usize>().ok());

        html! {
            @if let Some(count) = count {
                (latest(&posts, count, Some(BRIEF_DATE_FORMAT)))
            }
        }
    })
}

fn site_href(doc: &Document) -> String {
    format!("/{}", doc.target_path.as_deref().unwrap_or_default())
}
