//! Settings type definitions.
//!
//! All structs use camelCase serde naming and per-field defaults so a
//! partial settings file only overrides what it names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokenledger_core::retry::RetryConfig;

/// Root settings for the token accounting service.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSettings {
    /// Local BPE resolver settings.
    #[serde(default)]
    pub local: LocalSettings,
    /// Remote tokenizer API settings.
    #[serde(default)]
    pub remote: RemoteSettings,
    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Per-model pricing.
    #[serde(default)]
    pub cost: CostSettings,
}

/// Local resolver settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSettings {
    /// Whether local resolution is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Default encoding scheme for models without a registered encoder.
    #[serde(default = "default_encoding")]
    pub default_encoding: String,
    /// Maximum text length in characters (hard limit).
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    /// Default concurrency for batch fan-out.
    #[serde(default = "default_local_concurrency")]
    pub concurrency_limit: usize,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_encoding: default_encoding(),
            max_text_length: default_max_text_length(),
            concurrency_limit: default_local_concurrency(),
        }
    }
}

/// Remote tokenizer API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    /// Whether remote resolution is enabled at all.
    #[serde(default)]
    pub enabled: bool,
    /// `OpenAI` tokenizer API.
    #[serde(default = "ProviderSettings::openai_defaults")]
    pub openai: ProviderSettings,
    /// Hugging Face tokenizer API.
    #[serde(default = "ProviderSettings::hugging_face_defaults")]
    pub hugging_face: ProviderSettings,
    /// Retry behavior for remote calls.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Maximum concurrent remote resolutions per batch call.
    #[serde(default = "default_remote_concurrency")]
    pub concurrency_limit: usize,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            openai: ProviderSettings::openai_defaults(),
            hugging_face: ProviderSettings::hugging_face_defaults(),
            retry: RetryConfig::default(),
            concurrency_limit: default_remote_concurrency(),
        }
    }
}

/// One remote tokenizer provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    /// Whether this provider may be selected.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the tokenizer API.
    pub base_url: String,
    /// Bearer token, empty when unauthenticated.
    #[serde(default)]
    pub api_token: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,
}

impl ProviderSettings {
    /// Defaults for the `OpenAI` tokenizer API.
    #[must_use]
    pub fn openai_defaults() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1".to_string(),
            api_token: String::new(),
            timeout_ms: 10_000,
        }
    }

    /// Defaults for the Hugging Face inference API.
    #[must_use]
    pub fn hugging_face_defaults() -> Self {
        Self {
            enabled: false,
            base_url: "https://api-inference.huggingface.co".to_string(),
            api_token: String::new(),
            timeout_ms: 15_000,
        }
    }
}

/// Result cache settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSettings {
    /// Whether the result cache is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Entry time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub expire_after_write_secs: u64,
    /// Maximum number of cached results.
    #[serde(default = "default_cache_size")]
    pub maximum_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            expire_after_write_secs: default_cache_ttl_secs(),
            maximum_size: default_cache_size(),
        }
    }
}

/// Per-1K-token pricing for one model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCost {
    /// Input token cost per 1K tokens, USD.
    pub input_cost_per_1k: f64,
    /// Output token cost per 1K tokens, USD.
    pub output_cost_per_1k: f64,
}

impl ModelCost {
    /// Construct a price pair.
    #[must_use]
    pub const fn new(input_cost_per_1k: f64, output_cost_per_1k: f64) -> Self {
        Self {
            input_cost_per_1k,
            output_cost_per_1k,
        }
    }
}

/// Pricing settings: per-model table plus a default for unknown models.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSettings {
    /// Canonical model name → price pair.
    #[serde(default = "default_model_costs")]
    pub model_costs: HashMap<String, ModelCost>,
    /// Price pair applied when a model is absent from the table.
    #[serde(default = "default_cost")]
    pub default_cost: ModelCost,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            model_costs: default_model_costs(),
            default_cost: default_cost(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_encoding() -> String {
    "cl100k_base".to_string()
}
fn default_max_text_length() -> usize {
    100_000
}
fn default_local_concurrency() -> usize {
    4
}
fn default_remote_concurrency() -> usize {
    5
}
fn default_provider_timeout_ms() -> u64 {
    10_000
}
fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_cache_size() -> u64 {
    10_000
}
fn default_cost() -> ModelCost {
    ModelCost::new(0.002, 0.002)
}

fn default_model_costs() -> HashMap<String, ModelCost> {
    HashMap::from([
        ("gpt-3.5-turbo".to_string(), ModelCost::new(0.0015, 0.002)),
        ("gpt-4".to_string(), ModelCost::new(0.03, 0.06)),
        ("gpt-4-turbo".to_string(), ModelCost::new(0.01, 0.03)),
        ("text-davinci-003".to_string(), ModelCost::new(0.02, 0.02)),
        ("claude-3-haiku".to_string(), ModelCost::new(0.00025, 0.00125)),
        ("claude-3-sonnet".to_string(), ModelCost::new(0.003, 0.015)),
        ("claude-3-opus".to_string(), ModelCost::new(0.015, 0.075)),
    ])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
