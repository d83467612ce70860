//! Document processing pipeline.
//!
//! The pipeline transforms every loaded document through a series of
//! named transforms, in registration order, each seeing the previous
//! transform's output:
//! 1. Title (fill a missing `title` from the first heading)
//! 2. CDN prefix (only when the site has a CDN configured)
//!
//! Custom transforms can be inserted before or after any named transform.

mod error;
mod stages;

pub use error::PipelineError;
pub use stages::{CdnPrefixTransform, TitleTransform, rewrite_image_sources};

use crate::build::document::Document;

/// A pure document transform.
pub trait Transform: Send + Sync {
    /// Unique name for this transform (used for insertion points).
    fn name(&self) -> &'static str;

    fn apply(&self, doc: Document) -> Document;
}

/// Adapter turning a closure into a named [`Transform`].
struct FnTransform<F> {
    name: &'static str,
    f: F,
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(Document) -> Document + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, doc: Document) -> Document {
        (self.f)(doc)
    }
}

/// An ordered list of document transforms.
///
/// # Extension Points
///
/// ```ignore
/// pipeline.insert_after("title", MyTransform)?;
/// pipeline.add_fn("lowercase-tags", |mut doc| {
///     doc.tags.iter_mut().for_each(|t| *t = t.to_lowercase());
///     doc
/// });
/// ```
pub struct Pipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Create an empty pipeline with no transforms.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Create the default pipeline: title, then CDN prefixing when `cdn` is set.
    pub fn default_pipeline(cdn: Option<&str>) -> Self {
        let mut pipeline = Self::new();
        pipeline.add(TitleTransform);
        if let Some(cdn) = cdn {
            pipeline.add(CdnPrefixTransform::new(cdn));
        }
        pipeline
    }

    /// Add a transform to the end of the pipeline.
    pub fn add<T: Transform + 'static>(&mut self, transform: T) -> &mut Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Add a closure transform to the end of the pipeline.
    pub fn add_fn<F>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        F: Fn(Document) -> Document + Send + Sync + 'static,
    {
        self.add(FnTransform { name, f })
    }

    /// Insert a transform before the named transform.
    pub fn insert_before<T: Transform + 'static>(
        &mut self,
        name: &str,
        transform: T,
    ) -> Result<&mut Self, PipelineError> {
        let pos = self.position(name)?;
        self.transforms.insert(pos, Box::new(transform));
        Ok(self)
    }

    /// Insert a transform after the named transform.
    pub fn insert_after<T: Transform + 'static>(
        &mut self,
        name: &str,
        transform: T,
    ) -> Result<&mut Self, PipelineError> {
        let pos = self.position(name)?;
        self.transforms.insert(pos + 1, Box::new(transform));
        Ok(self)
    }

    /// Run every transform over one document.
    pub fn run(&self, doc: Document) -> Document {
        self.transforms
            .iter()
            .fold(doc, |doc, transform| transform.apply(doc))
    }

    /// Get the names of all transforms in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    fn position(&self, name: &str) -> Result<usize, PipelineError> {
        self.transforms
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| PipelineError::StageNotFound(name.to_string()))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::DocumentKind;
    use chrono::{DateTime, Utc};
    use std::path::PathBuf;

    fn doc() -> Document {
        Document::new(
            DocumentKind::Post,
            PathBuf::from("/src/posts/a.md"),
            PathBuf::from("a.md"),
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    fn append(marker: &'static str) -> impl Fn(Document) -> Document + Send + Sync {
        move |mut doc| {
            doc.html.push_str(marker);
            doc
        }
    }

    #[test]
    fn test_default_pipeline_names() {
        assert_eq!(Pipeline::default().names(), vec!["title"]);
        assert_eq!(
            Pipeline::default_pipeline(Some("https://cdn.example.com")).names(),
            vec!["title", "cdn"]
        );
    }

    #[test]
    fn test_transforms_run_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add_fn("a", append("a")).add_fn("b", append("b"));

        assert_eq!(pipeline.run(doc()).html, "ab");
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut pipeline = Pipeline::new();
        pipeline.add_fn("a", append("a")).add_fn("c", append("c"));
        pipeline
            .insert_after("a", FnTransform { name: "b", f: append("b") })
            .unwrap();
        pipeline
            .insert_before("a", FnTransform { name: "z", f: append("z") })
            .unwrap();

        assert_eq!(pipeline.names(), vec!["z", "a", "b", "c"]);
        assert_eq!(pipeline.run(doc()).html, "zabc");
    }

    #[test]
    fn test_insert_unknown_stage() {
        let mut pipeline = Pipeline::new();
        let result = pipeline.insert_after("missing", TitleTransform);
        assert!(matches!(result, Err(PipelineError::StageNotFound(name)) if name == "missing"));
    }
}
