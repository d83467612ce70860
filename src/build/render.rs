//! Page assembly from the registered hooks.

use maud::{DOCTYPE, html};

use super::document::Document;
use super::hooks::{Hooks, run_content_hooks, run_metadata_hooks};

/// Assemble the full HTML page of a document.
///
/// Layout:
/// ```text
/// <!DOCTYPE html>
/// <html lang>
///   <head> head hooks </head>
///   <body>
///     <div class="header"> header hooks </div>      unless `no_header`
///     <div class="section {type} {class}"> content hooks </div>
///     <div class="footer"> footer hooks </div>      unless `no_footer`
///     end hooks
///   </body>
/// </html>
/// ```
pub fn render_page(doc: &Document, hooks: &Hooks, default_language: &str) -> String {
    let front_matter = &doc.front_matter;
    let language = front_matter.get("lang").unwrap_or(default_language);

    let markup = html! {
        (DOCTYPE)
        html lang=(language) {
            head {
                (run_metadata_hooks(&hooks.head, front_matter))
            }
            body {
                @if !front_matter.contains_key("no_header") {
                    div class="header" {
                        (run_metadata_hooks(&hooks.header, front_matter))
                    }
                }
                div class=(section_class(doc)) {
                    (run_content_hooks(&hooks.content, doc))
                }
                @if !front_matter.contains_key("no_footer") {
                    div class="footer" {
                        (run_metadata_hooks(&hooks.footer, front_matter))
                    }
                }
                // End hooks sit outside the content and footer wrappers
                (run_metadata_hooks(&hooks.end, front_matter))
            }
        }
    };

    let mut page = markup.into_string();
    page.push('\n');
    page
}

fn section_class(doc: &Document) -> String {
    let kind = doc
        .front_matter
        .get("type")
        .unwrap_or_else(|| doc.kind.as_str());

    match doc.front_matter.get("class") {
        Some(extra) if !extra.is_empty() => format!("section {kind} {extra}"),
        _ => format!("section {kind}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::DocumentKind;
    use chrono::{DateTime, Utc};
    use maud::PreEscaped;
    use std::path::PathBuf;

    fn page(front_matter: &[(&str, &str)]) -> Document {
        let mut doc = Document::new(
            DocumentKind::Page,
            PathBuf::from("/src/pages/about.md"),
            PathBuf::from("about.md"),
            DateTime::<Utc>::UNIX_EPOCH,
        );
        doc.html = "<p>Body</p>".to_string();
        doc.front_matter = front_matter.iter().copied().collect();
        doc
    }

    fn hooks() -> Hooks {
        let mut hooks = Hooks::with_default_content();
        hooks.head.push(Box::new(|_| html! { title { "T" } }));
        hooks.header.push(Box::new(|_| html! { "HEADER" }));
        hooks.footer.push(Box::new(|_| html! { "FOOTER" }));
        hooks.end.push(Box::new(|_| html! { (PreEscaped("<script>end()</script>")) }));
        hooks
    }

    #[test]
    fn test_full_layout() {
        let html = render_page(&page(&[("type", "page")]), &hooks(), "en");

        assert_eq!(
            html,
            "<!DOCTYPE html><html lang=\"en\"><head><title>T</title></head><body>\
             <div class=\"header\">HEADER</div>\
             <div class=\"section page\"><div class=\"content_body\"><p>Body</p></div></div>\
             <div class=\"footer\">FOOTER</div>\
             <script>end()</script></body></html>\n"
        );
    }

    #[test]
    fn test_language_override_and_custom_class() {
        let html = render_page(&page(&[("lang", "de"), ("class", "wide")]), &hooks(), "en");

        assert!(html.contains(r#"<html lang="de">"#));
        assert!(html.contains(r#"<div class="section page wide">"#));
    }

    #[test]
    fn test_no_header_no_footer() {
        let html = render_page(
            &page(&[("no_header", "true"), ("no_footer", "")]),
            &hooks(),
            "en",
        );

        assert!(!html.contains("HEADER"));
        assert!(!html.contains("FOOTER"));
        assert!(html.contains("<script>end()</script></body>"));
    }
}
