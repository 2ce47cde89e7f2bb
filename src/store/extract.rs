//! Typed-field extraction: turns one review field into plain text fragments.
//!
//! Resilience over strictness: a missing field, an unknown tag or an array
//! element without a string payload yields nothing rather than an error, so
//! one malformed review never aborts aggregation of the whole set.

use super::types::{ReviewDocument, TypedValue};

/// Prefixes of machine-generated category labels that the store writes into
/// the comment field when a customer leaves no free text.
pub const SYNTHETIC_TAG_PREFIXES: &[&str] = &["GUIDED_DINING_"];

/// Extract text fragments from a single field value.
///
/// - String: exactly one fragment, unmodified.
/// - Array: one fragment per string element, in order. A one-element array
///   whose text is a synthetic tag is skipped entirely.
/// - Anything else: no fragments.
pub fn extract_fragments(value: &TypedValue) -> Vec<String> {
    match value {
        TypedValue::String(s) => vec![s.clone()],
        TypedValue::Array(items) => {
            if let [only] = items.as_slice() {
                if only.as_str().is_some_and(is_synthetic_tag) {
                    tracing::debug!("Skipping synthetic tag array");
                    return Vec::new();
                }
            }
            items
                .iter()
                .filter_map(TypedValue::as_str)
                .map(str::to_string)
                .collect()
        }
        TypedValue::Unrecognized(raw) => {
            tracing::debug!(raw = %raw, "Ignoring unrecognized field shape");
            Vec::new()
        }
    }
}

/// Extract fragments from a named field of a document; absent fields yield none.
pub fn extract_field(document: &ReviewDocument, field_name: &str) -> Vec<String> {
    document
        .field(field_name)
        .map(extract_fragments)
        .unwrap_or_default()
}

/// True when `text` is a machine-generated category label, not a review.
pub fn is_synthetic_tag(text: &str) -> bool {
    SYNTHETIC_TAG_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}
