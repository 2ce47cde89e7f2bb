use std::cell::RefCell;
use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;

use super::PipelineError;
use crate::config::GenerationConfig;

/// Text generation seam (allows mocking).
pub trait LlmGenerate {
    /// Complete `prompt` and return the raw generated text.
    fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Request body for Ollama /api/generate
#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// Ollama HTTP client bound to one model.
pub struct OllamaClient {
    endpoint: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, PipelineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::GenerationFailed {
                status: None,
                body: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            client,
        })
    }
}

impl LlmGenerate for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let body = GenerationRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Calling Ollama");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| {
                let body = if e.is_connect() {
                    format!("Ollama is not running at {}", self.endpoint)
                } else if e.is_timeout() {
                    "Request timed out".to_string()
                } else {
                    e.to_string()
                };
                PipelineError::GenerationFailed { status: None, body }
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| PipelineError::GenerationFailed {
            status: Some(status.as_u16()),
            body: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), model = %self.model, "Ollama returned error");
            return Err(PipelineError::GenerationFailed {
                status: Some(status.as_u16()),
                body: text,
            });
        }

        parse_generate_response(&text).map_err(|body| PipelineError::GenerationFailed {
            status: Some(status.as_u16()),
            body,
        })
    }
}

/// Pull the `response` text out of a /api/generate body.
///
/// The body must be a JSON object. A missing or null `response` is the model
/// producing nothing and yields empty text. Scalars other than strings are
/// rendered as text.
pub fn parse_generate_response(body: &str) -> Result<String, String> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| format!("Malformed response body ({e}): {body}"))?;
    let obj = parsed
        .as_object()
        .ok_or_else(|| format!("Response body is not a JSON object: {body}"))?;

    Ok(match obj.get("response") {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail { status: u16, body: String },
}

/// Mock generator for testing: replays scripted replies and records prompts.
///
/// Once the script runs out, the last reply repeats.
pub struct MockLlm {
    replies: RefCell<VecDeque<MockReply>>,
    last: RefCell<Option<MockReply>>,
    prompts: RefCell<Vec<String>>,
}

impl MockLlm {
    /// Always answers with `response`.
    pub fn new(response: &str) -> Self {
        Self::scripted(&[response])
    }

    /// Answers with each response in turn.
    pub fn scripted(responses: &[&str]) -> Self {
        Self::from_replies(
            responses
                .iter()
                .map(|r| MockReply::Text(r.to_string()))
                .collect(),
        )
    }

    /// Every call fails with the given status and body.
    pub fn failing(status: u16, body: &str) -> Self {
        Self::from_replies(vec![MockReply::Fail {
            status,
            body: body.to_string(),
        }])
    }

    /// First call answers with `response`, later calls fail.
    pub fn then_failing(response: &str, status: u16) -> Self {
        Self::from_replies(vec![
            MockReply::Text(response.to_string()),
            MockReply::Fail {
                status,
                body: "mock failure".to_string(),
            },
        ])
    }

    fn from_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            last: RefCell::new(None),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl LlmGenerate for MockLlm {
    fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        self.prompts.borrow_mut().push(prompt.to_string());

        let next = self.replies.borrow_mut().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.borrow_mut() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .borrow()
                .clone()
                .unwrap_or(MockReply::Text(String::new())),
        };

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail { status, body } => Err(PipelineError::GenerationFailed {
                status: Some(status),
                body,
            }),
        }
    }
}
