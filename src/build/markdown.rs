//! Markdown rendering with syntax highlighting and heading extraction.

use std::collections::HashSet;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use super::highlight::SyntaxHighlighter;
use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// A heading found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    /// The generated `id` attribute
    pub id: String,
    /// The heading level (1-6)
    pub level: u8,
}

/// Result of rendering markdown.
pub struct MarkdownOutput {
    pub html: String,
    pub headings: Vec<Heading>,
}

impl MarkdownOutput {
    /// Text of the first heading, used as the fallback document title.
    pub fn first_heading(&self) -> Option<&str> {
        self.headings.first().map(|h| h.text.as_str())
    }
}

/// Markdown to HTML conversion, configured once per build.
pub struct MarkdownRenderer {
    options: Options,
    highlighter: SyntaxHighlighter,
}

impl MarkdownRenderer {
    pub fn new(config: &MarkdownConfig) -> Result<Self, MarkdownError> {
        let mut options = Options::empty();
        for extension in &config.extensions {
            match extension.as_str() {
                "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
                "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
                "gfm" => options.insert(Options::ENABLE_GFM),
                "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
                "smart_punctuation" => options.insert(Options::ENABLE_SMART_PUNCTUATION),
                "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
                "tables" => options.insert(Options::ENABLE_TABLES),
                "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
                other => return Err(MarkdownError::InvalidExtension(other.to_string())),
            }
        }

        Ok(Self {
            options,
            highlighter: SyntaxHighlighter::new(&config.highlight_theme),
        })
    }

    /// Stylesheet matching the classes emitted for highlighted code blocks.
    pub fn highlight_css(&self) -> Option<String> {
        self.highlighter.css()
    }

    /// Render markdown to HTML using pulldown-cmark with syntax highlighting.
    pub fn render(&self, markdown: &str) -> MarkdownOutput {
        let parser = Parser::new_ext(markdown, self.options);

        // Process events, intercepting code blocks for syntax highlighting
        let mut in_code_block = false;
        let mut code_language = String::new();
        let mut code_content = String::new();

        // Headings are buffered so their inline markup stays inside the tag
        struct HeadingState<'a> {
            level: HeadingLevel,
            id: Option<String>,
            classes: Vec<String>,
            attrs: Vec<(String, Option<String>)>,
            text: String,
            events: Vec<Event<'a>>,
        }
        let mut in_heading: Option<HeadingState> = None;
        let mut used_heading_ids: HashSet<String> = HashSet::new();
        let mut headings: Vec<Heading> = Vec::new();

        let events: Vec<Event> = parser
            .flat_map(|event| match event {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    let id = id.map(|id| id.to_string());
                    if let Some(id) = &id {
                        used_heading_ids.insert(id.clone());
                    }
                    in_heading = Some(HeadingState {
                        level,
                        id,
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        attrs: attrs
                            .iter()
                            .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                            .collect(),
                        text: String::new(),
                        events: Vec::new(),
                    });
                    vec![]
                }
                Event::End(TagEnd::Heading(_)) => {
                    let Some(state) = in_heading.take() else {
                        return vec![event];
                    };

                    let text = state.text.trim().to_string();
                    let id = match state.id {
                        Some(id) => id,
                        None => unique_id(&slugify(&text), &mut used_heading_ids),
                    };

                    let mut attributes = format!(
                        " id=\"{}\"",
                        html_escape::encode_double_quoted_attribute(&id)
                    );
                    if !state.classes.is_empty() {
                        attributes.push_str(&format!(" class=\"{}\"", state.classes.join(" ")));
                    }
                    for (key, value) in &state.attrs {
                        match value {
                            Some(value) => attributes.push_str(&format!(
                                " {key}=\"{}\"",
                                html_escape::encode_double_quoted_attribute(value)
                            )),
                            None => attributes.push_str(&format!(" {key}")),
                        }
                    }

                    let mut inner = String::new();
                    html::push_html(&mut inner, state.events.into_iter());

                    headings.push(Heading {
                        text,
                        id,
                        level: state.level as u8,
                    });

                    vec![Event::Html(
                        format!(
                            "<h{level}{attributes}>{inner}</h{level}>",
                            level = state.level as usize,
                        )
                        .into(),
                    )]
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_language = match kind {
                        CodeBlockKind::Fenced(lang) => lang.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    code_content.clear();
                    vec![]
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let highlighted = self.highlighter.highlight(&code_content, &code_language);
                    vec![Event::Html(highlighted.into())]
                }
                Event::Text(text) if in_code_block => {
                    code_content.push_str(&text);
                    vec![]
                }
                event => match in_heading.as_mut() {
                    Some(state) => {
                        if let Event::Text(text) | Event::Code(text) = &event {
                            state.text.push_str(text);
                        }
                        state.events.push(event);
                        vec![]
                    }
                    None => vec![event],
                },
            })
            .collect();

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        MarkdownOutput {
            html: html_output,
            headings,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
            highlighter: SyntaxHighlighter::default(),
        }
    }
}

/// `base`, or `base-N` with the first free suffix.
fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let mut id = base.to_string();
    let mut suffix = 1;
    while used.contains(&id) {
        id = format!("{base}-{suffix}");
        suffix += 1;
    }
    used.insert(id.clone());
    id
}

/// Convert a string to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    s.to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new(&MarkdownConfig::default()).unwrap();
        let output = renderer.render("# Hello\n\nWorld");

        assert!(output.html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(output.html.contains("<p>World</p>"));
        assert_eq!(output.first_heading(), Some("Hello"));
        assert_eq!(output.headings[0].level, 1);
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let renderer = MarkdownRenderer::default();
        let output = renderer.render("## Setup\n\n## Setup");

        let ids: Vec<_> = output.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "setup-1"]);
    }

    #[test]
    fn test_heading_text_is_escaped() {
        let renderer = MarkdownRenderer::default();
        let output = renderer.render("# `a < b`");

        assert_eq!(output.first_heading(), Some("a < b"));
        assert!(output.html.contains("a &lt; b"));
    }

    #[test]
    fn test_inline_markup_stays_in_heading() {
        let renderer = MarkdownRenderer::default();
        let output = renderer.render("# Hello *world*\n\nText");

        assert!(output.html.starts_with("<h1 id=\"hello-world\">Hello <em>world</em></h1>"));
        assert!(!output.html.contains("<em></em>"));
        assert_eq!(output.first_heading(), Some("Hello world"));
    }

    #[test]
    fn test_explicit_heading_id_is_recorded() {
        let config = MarkdownConfig {
            extensions: vec!["heading_attributes".to_string()],
            ..MarkdownConfig::default()
        };
        let renderer = MarkdownRenderer::new(&config).unwrap();
        let output = renderer.render("# Intro {#start}\n\n## Start\n\n## Later");

        assert_eq!(output.first_heading(), Some("Intro"));
        let ids: Vec<_> = output.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "start-1", "later"]);
        assert!(output.html.contains("<h1 id=\"start\">Intro</h1>"));
    }

    #[test]
    fn test_no_heading() {
        let renderer = MarkdownRenderer::default();
        let output = renderer.render("Just a paragraph.");
        assert_eq!(output.first_heading(), None);
    }

    #[test]
    fn test_render_image() {
        let renderer = MarkdownRenderer::default();
        let output = renderer.render("![a](/img/a.png)");
        assert!(output.html.contains("<img src=\"/img/a.png\""));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::default();
        let output = renderer.render("```rust\nlet x = 1;\n```");

        assert!(output.html.contains("let"));
        assert!(output.html.contains("<pre"));
    }

    #[test]
    fn test_invalid_extension() {
        let config = MarkdownConfig {
            extensions: vec!["not_a_real_extension".to_string()],
            ..MarkdownConfig::default()
        };

        assert!(MarkdownRenderer::new(&config).is_err());
    }
}
