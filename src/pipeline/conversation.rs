use super::language_gate::LanguageGate;
use super::ollama::LlmGenerate;
use super::prompt::build_advisory_prompt;
use super::PipelineError;

/// Input that ends a session, compared case-insensitively.
pub const EXIT_KEYWORD: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Operator,
    Assistant,
}

impl Speaker {
    /// Label used when rendering the turn into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            Self::Operator => "營業者",
            Self::Assistant => "AI",
        }
    }
}

/// One utterance in the advisory chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(speaker: Speaker, text: &str) -> Self {
        Self {
            speaker,
            text: text.to_string(),
        }
    }

    /// `<label>：<text>`, with a full-width colon.
    pub fn render(&self) -> String {
        format!("{}：{}", self.speaker.label(), self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Terminated,
}

/// What one operator input did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The assistant answered with this text.
    Replied(String),
    /// The exit keyword ended the session.
    Ended,
}

/// Interactive advisory chat over a fixed feature description.
///
/// The session owns its history exclusively; turns are only ever appended.
pub struct ConversationSession<'a, G: LlmGenerate> {
    generator: &'a G,
    gate: &'a LanguageGate,
    features: String,
    history: Vec<ConversationTurn>,
    state: SessionState,
}

impl<'a, G: LlmGenerate> ConversationSession<'a, G> {
    pub fn new(generator: &'a G, gate: &'a LanguageGate, features: &str) -> Self {
        Self {
            generator,
            gate,
            features: features.to_string(),
            history: Vec::new(),
            state: SessionState::Active,
        }
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Handle one line of operator input.
    ///
    /// The operator and assistant turns are committed together once the
    /// reply has passed the language gate; a failed generation leaves the
    /// history as it was.
    pub fn submit(&mut self, input: &str) -> Result<TurnOutcome, PipelineError> {
        if self.state == SessionState::Terminated {
            return Err(PipelineError::SessionTerminated);
        }

        let question = input.trim();
        if question.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        if question.eq_ignore_ascii_case(EXIT_KEYWORD) {
            tracing::info!(turns = self.history.len(), "Advisory session ended");
            self.state = SessionState::Terminated;
            return Ok(TurnOutcome::Ended);
        }

        let operator_turn = ConversationTurn::new(Speaker::Operator, question);
        let prompt = {
            let mut pending = self.history.clone();
            pending.push(operator_turn.clone());
            build_advisory_prompt(&self.features, &pending)
        };

        let raw = self.generator.generate(&prompt)?;
        let reply = self.gate.ensure(self.generator, raw.trim().to_string())?;
        let reply = reply.trim().to_string();

        self.history.push(operator_turn);
        self.history
            .push(ConversationTurn::new(Speaker::Assistant, &reply));
        tracing::debug!(turns = self.history.len(), "Advisory turn completed");

        Ok(TurnOutcome::Replied(reply))
    }
}
