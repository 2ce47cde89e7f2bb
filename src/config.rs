use std::time::Duration;

use crate::pipeline::language_gate::{TargetLanguage, DEFAULT_CONFORMANCE_THRESHOLD};

/// Application-level constants
pub const APP_NAME: &str = "review-advisor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "gemma3:4b";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_PROJECT_ID: &str = "java2025-91d74";

/// Field holding the customer's free text on each review document.
pub const DEFAULT_REVIEW_FIELD: &str = "comment";

/// Firestore caps list pages at 300 documents.
pub const DEFAULT_PAGE_SIZE: u32 = 300;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "review_advisor=debug"
    } else {
        "review_advisor=warn"
    }
}

/// Settings for the text-generation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Full URL of the Ollama `/api/generate` endpoint.
    pub endpoint: String,
    pub model: String,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }
}

/// Settings for the Firestore REST reader.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything the pipelines need, threaded explicitly into constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub generation: GenerationConfig,
    pub store: StoreConfig,
    pub review_field: String,
    pub language: TargetLanguage,
    pub conformance_threshold: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            store: StoreConfig::default(),
            review_field: DEFAULT_REVIEW_FIELD.to_string(),
            language: TargetLanguage::TRADITIONAL_CHINESE,
            conformance_threshold: DEFAULT_CONFORMANCE_THRESHOLD,
        }
    }
}
