//! CDN URL rewriting.

use crate::build::document::Document;
use crate::build::pipeline::Transform;

const IMG_SRC: &str = "<img src=";

/// Metadata keys holding image URLs.
const IMAGE_KEYS: [&str; 2] = ["featured_image", "socialmedia_image"];

/// Prefixes root-relative image URLs with a CDN base.
///
/// Rewrites `<img src="/...">` occurrences in the body and the
/// `featured_image`/`socialmedia_image` metadata values.
pub struct CdnPrefixTransform {
    cdn: String,
}

impl CdnPrefixTransform {
    pub fn new(cdn: &str) -> Self {
        Self {
            cdn: cdn.trim_end_matches('/').to_string(),
        }
    }
}

impl Transform for CdnPrefixTransform {
    fn name(&self) -> &'static str {
        "cdn"
    }

    fn apply(&self, mut doc: Document) -> Document {
        doc.html = rewrite_image_sources(&doc.html, &self.cdn);

        for key in IMAGE_KEYS {
            let rewritten = doc
                .front_matter
                .get(key)
                .filter(|url| url.starts_with('/'))
                .map(|url| format!("{}{}", self.cdn, url));
            if let Some(url) = rewritten {
                doc.front_matter.insert(key, url);
            }
        }
        doc
    }
}

/// Prepend `cdn` to every `<img src=` URL that starts with `/`.
///
/// The URL is the text between the quote following `<img src=` and the
/// matching quote. Occurrences with another shape (no quote, no closing
/// quote, absolute URL) are left as they are; everything outside the
/// rewritten URLs is byte-identical to the input.
pub fn rewrite_image_sources(html: &str, cdn: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find(IMG_SRC) {
        let after_pattern = pos + IMG_SRC.len();
        out.push_str(&rest[..after_pattern]);
        rest = &rest[after_pattern..];

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        out.push(quote);
        rest = &rest[quote.len_utf8()..];

        let Some(end) = rest.find(quote) else {
            continue;
        };
        let url = &rest[..end];
        if url.starts_with('/') {
            out.push_str(cdn);
        }
        out.push_str(url);
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}
