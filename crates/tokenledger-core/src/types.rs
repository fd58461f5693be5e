//! Token accounting result types.
//!
//! A [`TokenResult`] is produced once per resolved text and never mutated;
//! derived results (adding an expected output count, flipping a response
//! count to the output side) always build a new value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of the diagnostic text preview carried by a result.
pub const TEXT_PREVIEW_MAX_CHARS: usize = 100;

/// How a token count was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    /// Local byte-pair encoding with a bundled vocabulary.
    LocalBpe,
    /// `OpenAI` tokenizer API.
    OpenaiApi,
    /// Hugging Face tokenizer API.
    HuggingfaceApi,
    /// Rough chars/4 estimate (no tokenizer involved).
    SimpleEstimate,
}

impl ResolutionMethod {
    /// Human-readable description of the method.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::LocalBpe => "Local BPE vocabulary",
            Self::OpenaiApi => "OpenAI tokenizer API",
            Self::HuggingfaceApi => "Hugging Face tokenizer API",
            Self::SimpleEstimate => "Simple character-count estimate",
        }
    }
}

/// The computed outcome for one text + model pair.
///
/// Immutable once created. `total_tokens == input_tokens + output_tokens`
/// always holds: constructors compute the total, it is never set directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResult {
    /// Truncated preview of the analyzed text (diagnostics only).
    pub text: String,
    /// Canonical model identifier used for encoding and pricing.
    pub model: String,
    /// Tokens counted on the input side.
    pub input_tokens: u32,
    /// Tokens counted (or declared) on the output side.
    pub output_tokens: u32,
    /// Sum of input and output tokens.
    pub total_tokens: u32,
    /// Estimated cost in USD.
    pub estimated_cost: f64,
    /// Wall-clock time spent resolving, in milliseconds.
    pub processing_time_ms: u64,
    /// How the count was produced.
    pub method: ResolutionMethod,
    /// When the result was created. Set once.
    pub calculated_at: DateTime<Utc>,
}

impl TokenResult {
    /// Create an input-side result (output tokens zero).
    #[must_use]
    pub fn for_input(
        text: &str,
        model: impl Into<String>,
        input_tokens: u32,
        estimated_cost: f64,
        processing_time_ms: u64,
        method: ResolutionMethod,
    ) -> Self {
        Self {
            text: truncate_preview(text),
            model: model.into(),
            input_tokens,
            output_tokens: 0,
            total_tokens: input_tokens,
            estimated_cost,
            processing_time_ms,
            method,
            calculated_at: Utc::now(),
        }
    }

    /// Create a zero-token result for empty input.
    #[must_use]
    pub fn empty(model: impl Into<String>, method: ResolutionMethod) -> Self {
        Self {
            text: String::new(),
            model: model.into(),
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            estimated_cost: 0.0,
            processing_time_ms: 0,
            method,
            calculated_at: Utc::now(),
        }
    }

    /// Derive a new result that adds a declared expected output count.
    ///
    /// Used for request-time estimates before the real output is known.
    /// The original result is untouched; `output_cost` is the cost of the
    /// declared output portion and is added to the existing estimate.
    #[must_use]
    pub fn with_expected_output(&self, expected_output_tokens: u32, output_cost: f64) -> Self {
        Self {
            text: self.text.clone(),
            model: self.model.clone(),
            input_tokens: self.input_tokens,
            output_tokens: expected_output_tokens,
            total_tokens: self.input_tokens + expected_output_tokens,
            estimated_cost: self.estimated_cost + output_cost,
            processing_time_ms: self.processing_time_ms,
            method: self.method,
            calculated_at: self.calculated_at,
        }
    }

    /// Derive a new result with the counted tokens moved to the output side.
    ///
    /// Response texts are tokenized like inputs; this flip reattributes the
    /// count so downstream summaries see it as generated output.
    #[must_use]
    pub fn into_output(self) -> Self {
        let tokens = self.input_tokens;
        Self {
            input_tokens: 0,
            output_tokens: tokens,
            total_tokens: tokens,
            ..self
        }
    }

    /// Average characters per input token (0 when no tokens).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_chars_per_token(&self) -> f64 {
        if self.input_tokens == 0 {
            return 0.0;
        }
        self.text.chars().count() as f64 / f64::from(self.input_tokens)
    }

    /// Tokens per character of the preview (0 for empty text).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn token_density(&self) -> f64 {
        let chars = self.text.chars().count();
        if chars == 0 {
            return 0.0;
        }
        f64::from(self.input_tokens) / chars as f64
    }

    /// Estimated cost per character of the preview (0 for empty text).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cost_per_character(&self) -> f64 {
        let chars = self.text.chars().count();
        if chars == 0 {
            return 0.0;
        }
        self.estimated_cost / chars as f64
    }
}

/// Truncate text to the diagnostic preview length.
#[must_use]
pub fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= TEXT_PREVIEW_MAX_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(TEXT_PREVIEW_MAX_CHARS).collect();
    format!("{head}...")
}

/// Outcome of checking a [`TokenResult`] against a ceiling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether the result is within the ceiling.
    pub valid: bool,
    /// The result that was checked.
    pub result: TokenResult,
    /// The ceiling that was applied.
    pub max_allowed: u32,
    /// Human-readable outcome.
    pub message: String,
}

/// Aggregated token usage for one complete request/response pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    /// Input tokens across the request.
    pub total_input_tokens: u32,
    /// Output tokens across the response.
    pub total_output_tokens: u32,
    /// Sum of input and output tokens.
    pub total_tokens: u32,
    /// Cost of the input portion in USD.
    pub input_cost: f64,
    /// Cost of the output portion in USD.
    pub output_cost: f64,
    /// Total cost in USD.
    pub total_cost: f64,
    /// Combined resolution time in milliseconds.
    pub total_processing_time_ms: u64,
    /// Canonical model the pair ran against.
    pub model: String,
    /// Heuristic 0-100 score of the output/input ratio.
    pub efficiency_score: f64,
}

impl UsageSummary {
    /// Cost per 1K tokens (0 when no tokens).
    #[must_use]
    pub fn cost_efficiency(&self) -> f64 {
        if self.total_tokens == 0 {
            return 0.0;
        }
        self.total_cost / f64::from(self.total_tokens) * 1000.0
    }

    /// Output/input token ratio (0 when no input).
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.total_input_tokens == 0 {
            return 0.0;
        }
        f64::from(self.total_output_tokens) / f64::from(self.total_input_tokens)
    }
}

/// Heuristic 0-100 score of output/input token ratio quality.
///
/// A 1:1 ratio scores 100. Ratios below 1 scale linearly down to 0;
/// ratios above 1 lose 20 points per unit of ratio, floored at 0.
/// The breakpoints are fixed for compatibility with existing consumers.
#[must_use]
pub fn efficiency_score(input_tokens: u32, output_tokens: u32) -> f64 {
    if input_tokens == 0 {
        return 0.0;
    }
    let ratio = f64::from(output_tokens) / f64::from(input_tokens);
    if ratio <= 1.0 {
        ratio * 100.0
    } else {
        (100.0 - (ratio - 1.0) * 20.0).max(0.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
