pub mod frame;
pub mod model;
pub mod preprocess;
pub mod service;
pub mod validate;

pub use frame::{FeatureFrame, ShapeError};
pub use service::{InferenceService, PipelineError};

/// Artifact files missing or corrupt at startup. Fatal: the process
/// must not begin accepting requests.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: String, reason: String },
}
