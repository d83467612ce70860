//! Title normalization.

use crate::build::document::Document;
use crate::build::pipeline::Transform;

/// Writes the first heading into the `title` metadata key when the front
/// matter does not set one.
///
/// After this transform every document with a heading has a `title`,
/// so hooks can read it from metadata alone.
pub struct TitleTransform;

impl Transform for TitleTransform {
    fn name(&self) -> &'static str {
        "title"
    }

    fn apply(&self, mut doc: Document) -> Document {
        if !doc.front_matter.contains_key("title") {
            if let Some(heading) = doc.heading.clone() {
                doc.front_matter.insert("title", heading);
            }
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::DocumentKind;
    use chrono::{DateTime, Utc};
    use std::path::PathBuf;

    fn doc(heading: Option<&str>) -> Document {
        let mut doc = Document::new(
            DocumentKind::Page,
            PathBuf::from("/src/pages/about.md"),
            PathBuf::from("about.md"),
            DateTime::<Utc>::UNIX_EPOCH,
        );
        doc.heading = heading.map(str::to_string);
        doc
    }

    #[test]
    fn test_title_from_heading() {
        let doc = TitleTransform.apply(doc(Some("About me")));
        assert_eq!(doc.front_matter.get("title"), Some("About me"));
    }

    #[test]
    fn test_existing_title_untouched() {
        let mut input = doc(Some("About me"));
        input.front_matter.insert("title", "About");
        let doc = TitleTransform.apply(input);
        assert_eq!(doc.front_matter.get("title"), Some("About"));
    }

    #[test]
    fn test_no_heading_no_title() {
        let doc = TitleTransform.apply(doc(None));
        assert!(!doc.front_matter.contains_key("title"));
    }
}
