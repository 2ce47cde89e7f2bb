pub mod ollama;
pub mod prompt;
pub mod language_gate;
pub mod conversation;
pub mod summary;

pub use ollama::*;
pub use prompt::*;
pub use language_gate::*;
pub use conversation::*;
pub use summary::*;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Transport failure, non-success status or malformed body from the
    /// generation endpoint. `status` is `None` when no response arrived.
    #[error("Generation failed (status {}): {body}", status_label(.status))]
    GenerationFailed { status: Option<u16>, body: String },

    #[error("Review retrieval failed: {0}")]
    Store(#[from] StoreError),

    #[error("Conversation session has ended")]
    SessionTerminated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}
