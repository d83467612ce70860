//! Output hooks registered on the site builder.
//!
//! Hooks capture per-site state (configuration, corpus snapshots), so they
//! are boxed closures rather than plain `fn` pointers.

use std::io;
use std::path::Path;

use maud::{Markup, PreEscaped, html};

use super::document::{Document, FrontMatter};

/// Produces markup from a page's metadata (head, header, footer and end hooks).
pub type MetadataHook = Box<dyn Fn(&FrontMatter) -> Markup>;

/// Produces the body markup of a document.
pub type ContentHook = Box<dyn Fn(&Document) -> Markup>;

/// Writes a processed version of `source` to `destination`.
pub type FileProcessor = Box<dyn Fn(&Path, &Path) -> io::Result<()>>;

/// The five ordered hook lists of a page.
#[derive(Default)]
pub struct Hooks {
    pub head: Vec<MetadataHook>,
    pub header: Vec<MetadataHook>,
    pub content: Vec<ContentHook>,
    pub footer: Vec<MetadataHook>,
    pub end: Vec<MetadataHook>,
}

impl Hooks {
    /// Hook lists with the default content hook registered.
    pub fn with_default_content() -> Self {
        Self {
            content: vec![Box::new(content_body)],
            ..Self::default()
        }
    }
}

/// The default content hook: `<div class="content_body">{html}</div>`.
pub fn content_body(doc: &Document) -> Markup {
    html! {
        div class="content_body" { (PreEscaped(&doc.html)) }
    }
}

/// Run every metadata hook in order, concatenating their output.
pub fn run_metadata_hooks(hooks: &[MetadataHook], front_matter: &FrontMatter) -> Markup {
    html! {
        @for hook in hooks {
            (hook(front_matter))
        }
    }
}

/// Run every content hook in order, concatenating their output.
pub fn run_content_hooks(hooks: &[ContentHook], doc: &Document) -> Markup {
    html! {
        @for hook in hooks {
            (hook(doc))
        }
    }
}
