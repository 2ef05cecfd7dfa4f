use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of the transform. Key classification problems are not
/// errors; they land in `problem_tags`.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The tokenizer could not continue. Output written so far stays as is.
    #[error("malformed input at byte {position}: {reason}")]
    MalformedInput { position: u64, reason: String },

    /// A record could not be rendered as a JSON line.
    #[error("failed to serialize record: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TransformError>;
