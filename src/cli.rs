//! Command-line surface: argument parsing and the thin I/O handlers.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{
    AdvisorConfig, GenerationConfig, StoreConfig, DEFAULT_MODEL, DEFAULT_OLLAMA_URL,
    DEFAULT_PROJECT_ID, DEFAULT_REVIEW_FIELD,
};
use crate::pipeline::{
    ConversationSession, LanguageGate, LlmGenerate, OllamaClient, PipelineError, SummaryOutcome,
    SummaryPipeline, TargetLanguage, TurnOutcome, EXIT_KEYWORD,
};
use crate::store::{FirestoreClient, ReviewDocument, ReviewSource, StoreError};

/// Restaurant review summaries and advisory chat on a local Ollama model
#[derive(Parser, Debug)]
#[command(name = "review-advisor", version, about, long_about = None)]
pub struct Cli {
    /// Ollama generate endpoint
    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL, global = true)]
    pub ollama_url: String,

    /// Model used for every generation
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Firestore project holding the restaurants collection
    #[arg(long, env = "FIRESTORE_PROJECT_ID", default_value = DEFAULT_PROJECT_ID, global = true)]
    pub project_id: String,

    /// Review field holding the customer's text
    #[arg(long, default_value = DEFAULT_REVIEW_FIELD, global = true)]
    pub field: String,

    /// Language the output must be written in
    #[arg(long, value_enum, default_value_t = Language::ZhTw, global = true)]
    pub language: Language,

    /// Per-request timeout for generation calls (default: none)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Interactive consulting chat seeded with the restaurant's features
    Chat {
        /// Free-text description of the restaurant
        features: String,
    },

    /// Summarize a restaurant's customer reviews
    Analyze {
        /// Restaurant document id
        restaurant_id: String,
        /// Write `{analysis_time, summary}` JSON here
        output: Option<PathBuf>,
    },

    /// Print every review document of a restaurant
    Reviews {
        /// Restaurant document id
        restaurant_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    ZhTw,
    Ja,
    Ko,
}

impl Language {
    pub fn target(self) -> TargetLanguage {
        match self {
            Self::ZhTw => TargetLanguage::TRADITIONAL_CHINESE,
            Self::Ja => TargetLanguage::JAPANESE,
            Self::Ko => TargetLanguage::KOREAN,
        }
    }
}

impl Cli {
    pub fn to_config(&self) -> AdvisorConfig {
        AdvisorConfig {
            generation: GenerationConfig {
                endpoint: self.ollama_url.clone(),
                model: self.model.clone(),
                timeout: self.timeout_secs.map(Duration::from_secs),
            },
            store: StoreConfig {
                project_id: self.project_id.clone(),
                ..StoreConfig::default()
            },
            review_field: self.field.clone(),
            language: self.language.target(),
            ..AdvisorConfig::default()
        }
    }
}

/// Dispatch a parsed command.
pub fn execute(cli: &Cli) -> Result<()> {
    let config = cli.to_config();
    let gate = LanguageGate::new(config.language.clone(), config.conformance_threshold);

    match &cli.command {
        Commands::Chat { features } => {
            let llm = OllamaClient::new(&config.generation)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            run_chat(&llm, &gate, features, stdin.lock(), stdout.lock())
        }
        Commands::Analyze {
            restaurant_id,
            output,
        } => {
            let store = FirestoreClient::new(config.store.clone())?;
            let llm = OllamaClient::new(&config.generation)?;
            let pipeline = SummaryPipeline::new(&store, &llm, &gate, &config.review_field);
            run_analyze(&pipeline, restaurant_id, output.as_deref())
        }
        Commands::Reviews { restaurant_id } => {
            let store = FirestoreClient::new(config.store.clone())?;
            list_reviews(&store, restaurant_id, std::io::stdout().lock())
        }
    }
}

/// Read operator lines from `input` until the exit keyword or end of input.
///
/// A failed generation is reported and the chat continues.
pub fn run_chat<G, R, W>(
    llm: &G,
    gate: &LanguageGate,
    features: &str,
    input: R,
    mut output: W,
) -> Result<()>
where
    G: LlmGenerate,
    R: BufRead,
    W: Write,
{
    let mut session = ConversationSession::new(llm, gate, features);

    writeln!(output, "── Restaurant features ──")?;
    writeln!(output, "{features}")?;
    writeln!(output, "Ask a question, or type {EXIT_KEYWORD} to leave.")?;

    let mut lines = input.lines();
    while session.is_active() {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match session.submit(&line?) {
            Ok(TurnOutcome::Replied(reply)) => writeln!(output, "AI: {reply}")?,
            Ok(TurnOutcome::Ignored | TurnOutcome::Ended) => {}
            Err(e @ PipelineError::GenerationFailed { .. }) => {
                tracing::error!(error = %e, "Advisory turn failed");
                writeln!(output, "[error] {e}")?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    writeln!(output, "Conversation ended.")?;
    Ok(())
}

fn run_analyze<S: ReviewSource, G: LlmGenerate>(
    pipeline: &SummaryPipeline<'_, S, G>,
    restaurant_id: &str,
    output: Option<&Path>,
) -> Result<()> {
    let outcome = pipeline
        .run(restaurant_id)
        .with_context(|| format!("Analysis of {restaurant_id} failed"))?;

    let report = match outcome {
        SummaryOutcome::Empty(reason) => {
            eprintln!("{}", reason.message());
            return Ok(());
        }
        SummaryOutcome::Summary(report) => report,
    };

    println!("====== Review summary ======\n");
    println!("{}", report.summary);

    if let Some(path) = output {
        report.write_to(path)?;
        let shown = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        println!("\n✓ Written to {}", shown.display());
    }
    Ok(())
}

/// Print a restaurant's reviews. A non-success store status is reported
/// and the command still exits cleanly; transport and parse errors fail.
pub fn list_reviews<S, W>(store: &S, restaurant_id: &str, mut output: W) -> Result<()>
where
    S: ReviewSource,
    W: Write,
{
    match store.fetch_reviews(restaurant_id) {
        Ok(documents) => write!(output, "{}", render_reviews(&documents))?,
        Err(StoreError::RetrievalFailed { status, body }) => {
            tracing::warn!(restaurant_id, status, body = %body, "Review listing refused by store");
            writeln!(output, "Failed to read reviews, HTTP status {status}")?;
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read reviews of {restaurant_id}"))
        }
    }
    Ok(())
}

/// Review id header followed by every field rendered as text.
pub fn render_reviews(documents: &[ReviewDocument]) -> String {
    if documents.is_empty() {
        return "No reviews found.\n".to_string();
    }

    let mut out = String::new();
    for doc in documents {
        out.push_str(&format!("=== Review ID: {} ===\n", doc.id()));
        for (key, value) in doc.fields() {
            out.push_str(&format!("  {key}: {}\n", value.display_text()));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MockLlm;
    use crate::store::InMemoryReviews;
    use std::io::Cursor;

    fn chat(llm: &MockLlm, input: &str) -> String {
        let gate = LanguageGate::default();
        let mut out = Vec::new();
        run_chat(llm, &gate, "夜市小吃攤", Cursor::new(input.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_analyze_with_output() {
        let cli = Cli::try_parse_from([
            "review-advisor",
            "analyze",
            "r42",
            "out.json",
            "--model",
            "llama3:8b",
            "--language",
            "ja",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Analyze {
                restaurant_id: "r42".into(),
                output: Some(PathBuf::from("out.json")),
            }
        );
        let config = cli.to_config();
        assert_eq!(config.generation.model, "llama3:8b");
        assert_eq!(config.language, TargetLanguage::JAPANESE);
        assert!(config.generation.timeout.is_none());
    }

    #[test]
    fn parses_chat_with_timeout() {
        let cli = Cli::try_parse_from([
            "review-advisor",
            "--timeout-secs",
            "90",
            "chat",
            "家庭式火鍋店",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Chat {
                features: "家庭式火鍋店".into()
            }
        );
        assert_eq!(cli.to_config().generation.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn chat_requires_features() {
        assert!(Cli::try_parse_from(["review-advisor", "chat"]).is_err());
    }

    #[test]
    fn chat_loop_answers_until_exit() {
        let llm = MockLlm::new("建議增加宵夜時段。");
        let out = chat(&llm, "\n怎麼提高營業額？\nEXIT\n不會被讀到\n");

        assert!(out.starts_with("── Restaurant features ──\n夜市小吃攤\n"));
        assert!(out.contains("AI: 建議增加宵夜時段。"));
        assert!(out.ends_with("Conversation ended.\n"));
        assert_eq!(llm.calls(), 1);
    }

    #[test]
    fn chat_loop_ends_at_end_of_input() {
        let llm = MockLlm::new("好");
        let out = chat(&llm, "問題一");
        assert!(out.contains("AI: 好"));
        assert!(out.ends_with("Conversation ended.\n"));
    }

    #[test]
    fn chat_loop_survives_generation_failure() {
        let llm = MockLlm::failing(500, "out of memory");
        let out = chat(&llm, "問題\nexit\n");
        assert!(out.contains("[error] Generation failed (status 500): out of memory"));
        assert!(out.ends_with("Conversation ended.\n"));
    }

    #[test]
    fn renders_review_listing() {
        let doc = ReviewDocument::new(
            "projects/p/databases/(default)/documents/restaurants/r1/reviews/rev9",
            serde_json::from_value(serde_json::json!({
                "comment": {"stringValue": "好吃"},
                "rating": {"integerValue": "5"}
            }))
            .unwrap(),
        );
        assert_eq!(
            render_reviews(&[doc]),
            "=== Review ID: rev9 ===\n  comment: 好吃\n  rating: {\"integerValue\":\"5\"}\n\n"
        );
    }

    #[test]
    fn renders_empty_listing() {
        assert_eq!(render_reviews(&[]), "No reviews found.\n");
    }

    struct RefusingStore(fn() -> StoreError);

    impl ReviewSource for RefusingStore {
        fn fetch_reviews(&self, _id: &str) -> Result<Vec<ReviewDocument>, StoreError> {
            Err((self.0)())
        }
    }

    #[test]
    fn listing_prints_fetched_reviews() {
        let store = InMemoryReviews::new().with_reviews(
            "r1",
            vec![ReviewDocument::new("restaurants/r1/reviews/rev1", Default::default())],
        );
        let mut out = Vec::new();
        list_reviews(&store, "r1", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "=== Review ID: rev1 ===\n\n");
    }

    #[test]
    fn listing_reports_store_status_and_succeeds() {
        let store = RefusingStore(|| StoreError::RetrievalFailed {
            status: 403,
            body: "denied".into(),
        });
        let mut out = Vec::new();
        list_reviews(&store, "r1", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Failed to read reviews, HTTP status 403\n"
        );
    }

    #[test]
    fn listing_fails_on_transport_error() {
        let store = RefusingStore(|| StoreError::HttpClient("connection refused".into()));
        let mut out = Vec::new();
        let err = list_reviews(&store, "r1", &mut out).unwrap_err();
        assert!(err.to_string().contains("Failed to read reviews of r1"));
        assert!(out.is_empty());
    }
}
