//! Pipeline error types.

/// Errors raised while configuring the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("transform '{0}' not found in pipeline")]
    StageNotFound(String),
}
