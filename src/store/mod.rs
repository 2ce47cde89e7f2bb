pub mod types;
pub mod extract;
pub mod aggregate;
pub mod firestore;

pub use types::*;
pub use extract::*;
pub use aggregate::*;
pub use firestore::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document store returned error (status {status}): {body}")]
    RetrievalFailed { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
