//! One-shot review summary: fetch → aggregate → prompt → generate → gate.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

use super::language_gate::LanguageGate;
use super::ollama::LlmGenerate;
use super::prompt::build_summary_prompt;
use super::PipelineError;
use crate::store::{ReviewAggregator, ReviewDocument, ReviewSource};

/// Why a run stopped without calling the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The store returned no review documents.
    NoDocuments,
    /// Documents exist but none carried usable review text.
    NoUsableText,
}

impl EmptyReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::NoDocuments => "No reviews found; nothing to analyze.",
            Self::NoUsableText => "No usable review text; nothing to analyze.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    Empty(EmptyReason),
    Summary(SummaryReport),
}

/// Persisted result of a summary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// RFC 3339 with the local offset.
    pub analysis_time: DateTime<FixedOffset>,
    pub summary: String,
}

impl SummaryReport {
    pub fn new(summary: String) -> Self {
        Self {
            analysis_time: Local::now().into(),
            summary,
        }
    }

    /// Write as pretty-printed JSON, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Summary report written");
        Ok(())
    }
}

/// Stateless composition of the batch-analysis flow.
pub struct SummaryPipeline<'a, S: ReviewSource, G: LlmGenerate> {
    source: &'a S,
    generator: &'a G,
    gate: &'a LanguageGate,
    aggregator: ReviewAggregator,
}

impl<'a, S: ReviewSource, G: LlmGenerate> SummaryPipeline<'a, S, G> {
    pub fn new(
        source: &'a S,
        generator: &'a G,
        gate: &'a LanguageGate,
        review_field: &str,
    ) -> Self {
        Self {
            source,
            generator,
            gate,
            aggregator: ReviewAggregator::new(review_field),
        }
    }

    /// Fetch a restaurant's reviews and summarize them.
    pub fn run(&self, restaurant_id: &str) -> Result<SummaryOutcome, PipelineError> {
        let documents = self.source.fetch_reviews(restaurant_id)?;
        self.summarize(&documents)
    }

    /// Summarize an already-fetched document set.
    pub fn summarize(&self, documents: &[ReviewDocument]) -> Result<SummaryOutcome, PipelineError> {
        if documents.is_empty() {
            tracing::info!("No review documents to summarize");
            return Ok(SummaryOutcome::Empty(EmptyReason::NoDocuments));
        }

        let corpus = self.aggregator.aggregate(documents);
        if corpus.is_empty() {
            tracing::info!(documents = documents.len(), "Reviews carry no usable text");
            return Ok(SummaryOutcome::Empty(EmptyReason::NoUsableText));
        }

        let prompt = build_summary_prompt(&corpus, self.gate.language());
        let raw = self.generator.generate(&prompt)?;
        let summary = self.gate.ensure(self.generator, raw.trim().to_string())?;

        Ok(SummaryOutcome::Summary(SummaryReport::new(
            summary.trim().to_string(),
        )))
    }
}
