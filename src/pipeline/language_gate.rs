//! Language conformance: accept generated text written in the target script,
//! otherwise ask the model once to translate it.
//!
//! Script classification uses Unicode block ranges only; no external
//! dependencies. CJK punctuation (`，`, `。`) is not counted as Han.

use super::ollama::LlmGenerate;
use super::prompt::build_translation_prompt;
use super::PipelineError;

/// Minimum share of target-script characters for text to be accepted as is.
pub const DEFAULT_CONFORMANCE_THRESHOLD: f64 = 0.30;

/// Writing systems the gate can measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// CJK ideographs (Chinese hanzi, Japanese kanji).
    Han,
    /// Japanese hiragana and katakana.
    Kana,
    Hangul,
}

impl Script {
    pub fn contains(self, ch: char) -> bool {
        let cp = ch as u32;
        match self {
            Self::Han => matches!(
                cp,
                0x2E80..=0x2E99
                    | 0x2E9B..=0x2EF3
                    | 0x2F00..=0x2FD5
                    | 0x3005
                    | 0x3007
                    | 0x3021..=0x3029
                    | 0x3038..=0x303B
                    | 0x3400..=0x4DBF
                    | 0x4E00..=0x9FFF
                    | 0xF900..=0xFA6D
                    | 0xFA70..=0xFAD9
                    | 0x20000..=0x2A6DF
                    | 0x2A700..=0x2EBEF
                    | 0x2F800..=0x2FA1F
                    | 0x30000..=0x323AF
            ),
            Self::Kana => matches!(
                cp,
                0x3041..=0x3096
                    | 0x309D..=0x309F
                    | 0x30A1..=0x30FA
                    | 0x30FD..=0x30FF
                    | 0x31F0..=0x31FF
                    | 0xFF66..=0xFF6F
                    | 0xFF71..=0xFF9D
            ),
            Self::Hangul => matches!(
                cp,
                0x1100..=0x11FF
                    | 0x3131..=0x318E
                    | 0xA960..=0xA97F
                    | 0xAC00..=0xD7A3
                    | 0xD7B0..=0xD7FF
                    | 0xFFA0..=0xFFDC
            ),
        }
    }
}

/// Output language: the name used inside prompts plus the scripts that count
/// towards conformance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLanguage {
    pub code: &'static str,
    pub display_name: &'static str,
    pub scripts: &'static [Script],
}

impl TargetLanguage {
    pub const TRADITIONAL_CHINESE: Self = Self {
        code: "zh-TW",
        display_name: "繁體中文",
        scripts: &[Script::Han],
    };

    pub const JAPANESE: Self = Self {
        code: "ja",
        display_name: "日文",
        scripts: &[Script::Han, Script::Kana],
    };

    pub const KOREAN: Self = Self {
        code: "ko",
        display_name: "韓文",
        scripts: &[Script::Hangul],
    };

    pub fn contains(&self, ch: char) -> bool {
        self.scripts.iter().any(|s| s.contains(ch))
    }
}

/// Fraction of characters in `text` belonging to `language`'s scripts.
/// Empty text scores 0.0.
pub fn script_ratio(text: &str, language: &TargetLanguage) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let matched = text.chars().filter(|&ch| language.contains(ch)).count();
    matched as f64 / total as f64
}

/// Accepts generated text or runs one corrective translation pass.
#[derive(Debug, Clone)]
pub struct LanguageGate {
    language: TargetLanguage,
    threshold: f64,
}

impl LanguageGate {
    pub fn new(language: TargetLanguage, threshold: f64) -> Self {
        Self {
            language,
            threshold,
        }
    }

    pub fn language(&self) -> &TargetLanguage {
        &self.language
    }

    /// Whether `text` already meets the threshold. Empty text conforms:
    /// there is nothing to translate.
    pub fn conforms(&self, text: &str) -> bool {
        text.is_empty() || script_ratio(text, &self.language) >= self.threshold
    }

    /// Return `text` unchanged when it conforms; otherwise issue exactly one
    /// translation call and return its result, conforming or not.
    pub fn ensure<G: LlmGenerate + ?Sized>(
        &self,
        llm: &G,
        text: String,
    ) -> Result<String, PipelineError> {
        if self.conforms(&text) {
            return Ok(text);
        }

        tracing::warn!(
            ratio = script_ratio(&text, &self.language),
            threshold = self.threshold,
            language = self.language.code,
            "Generated text below language threshold, requesting translation"
        );

        let prompt = build_translation_prompt(&text, &self.language);
        let translated = llm.generate(&prompt)?;
        Ok(translated.trim().to_string())
    }
}

impl Default for LanguageGate {
    fn default() -> Self {
        Self::new(TargetLanguage::TRADITIONAL_CHINESE, DEFAULT_CONFORMANCE_THRESHOLD)
    }
}
