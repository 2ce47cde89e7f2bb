use super::extract::extract_field;
use super::types::ReviewDocument;

/// Ordered review text collected for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    fragments: Vec<String>,
}

impl Corpus {
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Newline-joined fragments, trimmed at both ends.
    pub fn text(&self) -> String {
        self.fragments.join("\n").trim().to_string()
    }

    /// True when there is nothing to summarize (no fragments, or only blank ones).
    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.trim().is_empty())
    }
}

/// Collects one field's text across a document set.
#[derive(Debug, Clone)]
pub struct ReviewAggregator {
    field_name: String,
}

impl ReviewAggregator {
    pub fn new(field_name: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
        }
    }

    /// Documents are visited in input order; no reordering or deduplication.
    pub fn aggregate(&self, documents: &[ReviewDocument]) -> Corpus {
        let fragments: Vec<String> = documents
            .iter()
            .flat_map(|doc| extract_field(doc, &self.field_name))
            .collect();

        tracing::debug!(
            documents = documents.len(),
            fragments = fragments.len(),
            field = %self.field_name,
            "Aggregated review corpus"
        );

        Corpus { fragments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, fields: serde_json::Value) -> ReviewDocument {
        ReviewDocument::new(
            &format!("restaurants/r1/reviews/{id}"),
            serde_json::from_value(fields).unwrap(),
        )
    }

    #[test]
    fn empty_document_list_yields_empty_corpus() {
        let corpus = ReviewAggregator::new("comment").aggregate(&[]);
        assert!(corpus.is_empty());
        assert_eq!(corpus.text(), "");
    }

    #[test]
    fn single_scalar_review() {
        let docs = [doc("a", json!({"comment": {"stringValue": "Great noodles"}}))];
        let corpus = ReviewAggregator::new("comment").aggregate(&docs);
        assert_eq!(corpus.text(), "Great noodles");
        assert_eq!(corpus.fragments(), ["Great noodles"]);
    }

    #[test]
    fn preserves_document_order_and_duplicates() {
        let docs = [
            doc("a", json!({"comment": {"stringValue": "Second visit, still good"}})),
            doc("b", json!({"comment": {"arrayValue": {"values": [
                {"stringValue": "Milk tea"}, {"stringValue": "Loud music"}
            ]}}})),
            doc("c", json!({"comment": {"stringValue": "Second visit, still good"}})),
        ];
        let corpus = ReviewAggregator::new("comment").aggregate(&docs);
        assert_eq!(
            corpus.text(),
            "Second visit, still good\nMilk tea\nLoud music\nSecond visit, still good"
        );
    }

    #[test]
    fn synthetic_only_reviews_give_empty_corpus() {
        let docs = [
            doc("a", json!({"comment": {"arrayValue": {"values": [{"stringValue": "GUIDED_DINING_SOLO"}]}}})),
            doc("b", json!({"rating": {"integerValue": "3"}})),
        ];
        assert!(ReviewAggregator::new("comment").aggregate(&docs).is_empty());
    }

    #[test]
    fn blank_fragments_count_as_empty() {
        let docs = [doc("a", json!({"comment": {"stringValue": "   "}}))];
        let corpus = ReviewAggregator::new("comment").aggregate(&docs);
        assert_eq!(corpus.fragments().len(), 1);
        assert!(corpus.is_empty());
    }

    #[test]
    fn uses_configured_field_name() {
        let docs = [doc("a", json!({
            "comment": {"stringValue": "ignored"},
            "feedback": {"stringValue": "Crispy pork"}
        }))];
        let corpus = ReviewAggregator::new("feedback").aggregate(&docs);
        assert_eq!(corpus.text(), "Crispy pork");
    }
}
