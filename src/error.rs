//! Pipeline error kinds surfaced at the CLI boundary.
//!
//! Every failure the pipeline can hit maps to one of these variants so
//! callers (and tests) can match on the kind via
//! `anyhow::Error::downcast_ref::<PipelineError>()`. Propagation uses
//! `anyhow` throughout; these variants are constructed at the failure site.

use std::path::PathBuf;

#[derive(Debug)]
pub enum PipelineError {
    /// The required API credential is absent from the process environment.
    MissingCredential(&'static str),
    /// A document could not be read or its text could not be extracted.
    ExtractionFailure { path: PathBuf, reason: String },
    /// The embedding service was unreachable or returned malformed output.
    EmbeddingServiceFailure(String),
    /// The generative-model service was unreachable or returned malformed output.
    GenerationServiceFailure(String),
    /// No index exists at the configured location.
    IndexNotFound(PathBuf),
    /// Stored index data failed parsing or validation.
    IndexCorrupt(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingCredential(var) => {
                write!(f, "{} is not set in the environment", var)
            }
            PipelineError::ExtractionFailure { path, reason } => {
                write!(f, "failed to extract text from {}: {}", path.display(), reason)
            }
            PipelineError::EmbeddingServiceFailure(e) => {
                write!(f, "embedding service failure: {}", e)
            }
            PipelineError::GenerationServiceFailure(e) => {
                write!(f, "generation service failure: {}", e)
            }
            PipelineError::IndexNotFound(path) => {
                write!(
                    f,
                    "no index found at {} (run `docchat build` first)",
                    path.display()
                )
            }
            PipelineError::IndexCorrupt(e) => write!(f, "index is corrupt: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {}
