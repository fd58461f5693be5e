//! Remote tokenizer resolver.
//!
//! Calls out to a configured tokenizer API, retries transient failures
//! with scheduled exponential backoff, and falls back to the local BPE
//! resolver when the remote path is exhausted. Remote failures never
//! surface to the caller's success path; only hard input errors from the
//! local tier propagate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::json;
use tokenledger_core::retry::calculate_backoff_delay;
use tokenledger_core::types::ResolutionMethod;
use tokenledger_core::{Result, TokenError, TokenResult};
use tokenledger_settings::{ProviderSettings, RemoteSettings};
use tracing::{debug, warn};

use crate::local::LocalResolver;
use crate::pricing::PriceTable;
use crate::stats::{ResolverStats, StatsSnapshot};

/// Failures internal to the remote path. Never escape the resolver.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered, but not with the expected shape.
    #[error("malformed tokenizer response: {0}")]
    Json(String),

    /// The provider answered with a non-success status.
    #[error("tokenizer API returned status {status}")]
    Api {
        /// HTTP status code.
        status: u16,
    },

    /// No remote provider is enabled for this request.
    #[error("no remote tokenizer provider is enabled")]
    Disabled,
}

impl RemoteError {
    /// Whether retrying could plausibly succeed.
    ///
    /// Transport errors and 429/5xx statuses are transient; malformed
    /// responses and client errors are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::Api { status } => *status == 429 || *status >= 500,
            Self::Json(_) | Self::Disabled => false,
        }
    }
}

/// Which remote tokenizer API serves a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Provider {
    OpenAi,
    HuggingFace,
}

impl Provider {
    fn method(self) -> ResolutionMethod {
        match self {
            Self::OpenAi => ResolutionMethod::OpenaiApi,
            Self::HuggingFace => ResolutionMethod::HuggingfaceApi,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::HuggingFace => "huggingface",
        }
    }
}

#[derive(Deserialize)]
struct OpenAiTokenizeResponse {
    tokens: Vec<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HfTokenizeResponse {
    token_count: u32,
}

/// Tokenizer-API resolver with built-in local fallback.
pub struct RemoteResolver {
    client: reqwest::Client,
    settings: RemoteSettings,
    local: LocalResolver,
    prices: Arc<PriceTable>,
    stats: Arc<ResolverStats>,
}

impl RemoteResolver {
    /// Build a resolver sharing the local tier and price table.
    #[must_use]
    pub fn new(settings: RemoteSettings, local: LocalResolver, prices: Arc<PriceTable>) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
            local,
            prices,
            stats: Arc::new(ResolverStats::new()),
        }
    }

    /// Count input tokens via the remote API, falling back locally.
    ///
    /// The fallback is transparent: an exhausted remote path degrades to
    /// a successful local result tagged `local-bpe`. Only a hard input
    /// error (oversized text) propagates.
    pub async fn compute_async(&self, text: &str, model: &str) -> Result<TokenResult> {
        self.stats.record_request();
        if text.is_empty() {
            self.stats.record_success();
            return Ok(TokenResult::empty(model, ResolutionMethod::SimpleEstimate));
        }

        // Enforce the hard limit before spending a network round trip.
        let length = text.chars().count();
        if length > self.local.max_text_length() {
            self.stats.record_failure();
            return Err(TokenError::TextTooLarge {
                length,
                max_length: self.local.max_text_length(),
            });
        }

        let started = Instant::now();
        match self.count_with_retry(text, model).await {
            Ok((count, method)) => {
                let cost = self.prices.input_cost(model, count);
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.stats.record_success();
                self.stats.record_processing_time(elapsed_ms);
                Ok(TokenResult::for_input(
                    text, model, count, cost, elapsed_ms, method,
                ))
            }
            Err(err) => {
                if !matches!(err, RemoteError::Disabled) {
                    warn!(%err, model, "remote tokenization failed, falling back to local");
                    self.stats.record_failure();
                }
                self.stats.record_fallback();
                metrics::counter!("tokenledger_remote_fallbacks_total").increment(1);
                self.local
                    .compute_async(text.to_string(), model.to_string())
                    .await
            }
        }
    }

    /// Whether a configured provider answers a trivial tokenization.
    ///
    /// `false` when no provider is enabled.
    pub async fn is_healthy(&self) -> bool {
        let Ok(provider) = self.select_provider("gpt-3.5-turbo") else {
            return false;
        };
        self.count_once(provider, "ping", "gpt-3.5-turbo")
            .await
            .is_ok()
    }

    /// Whether any provider is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
            && (self.settings.openai.enabled || self.settings.hugging_face.enabled)
    }

    /// Counter snapshot for this resolver.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot("remote")
    }

    async fn count_with_retry(
        &self,
        text: &str,
        model: &str,
    ) -> std::result::Result<(u32, ResolutionMethod), RemoteError> {
        let provider = self.select_provider(model)?;
        let retry = &self.settings.retry;
        let mut attempt = 0;
        loop {
            match self.count_once(provider, text, model).await {
                Ok(count) => return Ok((count, provider.method())),
                Err(err) if err.is_retryable() && attempt + 1 < retry.max_attempts => {
                    let delay_ms = calculate_backoff_delay(
                        attempt,
                        retry.base_delay_ms,
                        retry.max_delay_ms,
                        retry.jitter_factor,
                    );
                    debug!(
                        %err,
                        provider = provider.name(),
                        attempt,
                        delay_ms,
                        "retrying remote tokenization"
                    );
                    metrics::counter!("tokenledger_remote_retries_total").increment(1);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Pick the provider for a canonical model.
    ///
    /// GPT and davinci models prefer the `OpenAI` tokenizer; anything
    /// else (or an unavailable first choice) goes to Hugging Face.
    fn select_provider(&self, model: &str) -> std::result::Result<Provider, RemoteError> {
        if !self.settings.enabled {
            return Err(RemoteError::Disabled);
        }
        let lower = model.to_lowercase();
        let wants_openai = lower.contains("gpt") || lower.contains("davinci");
        if wants_openai && self.settings.openai.enabled {
            Ok(Provider::OpenAi)
        } else if self.settings.hugging_face.enabled {
            Ok(Provider::HuggingFace)
        } else if self.settings.openai.enabled {
            Ok(Provider::OpenAi)
        } else {
            Err(RemoteError::Disabled)
        }
    }

    async fn count_once(
        &self,
        provider: Provider,
        text: &str,
        model: &str,
    ) -> std::result::Result<u32, RemoteError> {
        match provider {
            Provider::OpenAi => self.count_openai(text, model).await,
            Provider::HuggingFace => self.count_hugging_face(text, model).await,
        }
    }

    async fn count_openai(&self, text: &str, model: &str) -> std::result::Result<u32, RemoteError> {
        let config = &self.settings.openai;
        let url = format!("{}/tokenizer", config.base_url.trim_end_matches('/'));
        let body = json!({
            "model": openai_tokenizer_model(model),
            "input": text,
        });
        let response = self
            .request(&url, config)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
            });
        }
        let parsed: OpenAiTokenizeResponse = response
            .json()
            .await
            .map_err(|err| RemoteError::Json(err.to_string()))?;
        Ok(u32::try_from(parsed.tokens.len()).unwrap_or(u32::MAX))
    }

    async fn count_hugging_face(
        &self,
        text: &str,
        model: &str,
    ) -> std::result::Result<u32, RemoteError> {
        let config = &self.settings.hugging_face;
        let url = format!(
            "{}/models/{}",
            config.base_url.trim_end_matches('/'),
            hugging_face_tokenizer_model(model)
        );
        let body = json!({
            "inputs": text,
            "options": { "use_cache": false },
        });
        let response = self
            .request(&url, config)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
            });
        }
        let parsed: HfTokenizeResponse = response
            .json()
            .await
            .map_err(|err| RemoteError::Json(err.to_string()))?;
        Ok(parsed.token_count)
    }

    fn request(&self, url: &str, config: &ProviderSettings) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(url)
            .timeout(Duration::from_millis(config.timeout_ms));
        if !config.api_token.is_empty() {
            builder = builder.bearer_auth(&config.api_token);
        }
        builder
    }
}

/// Model name as the `OpenAI` tokenizer endpoint expects it.
fn openai_tokenizer_model(model: &str) -> String {
    let lower = model.to_lowercase();
    match lower.as_str() {
        "vllm" => "gpt-3.5-turbo".to_string(),
        "sglang" => "gpt-4".to_string(),
        m if m.starts_with("gpt") || m.starts_with("text-davinci") => model.to_string(),
        _ => "gpt-3.5-turbo".to_string(),
    }
}

/// Model name as the Hugging Face inference API expects it.
fn hugging_face_tokenizer_model(model: &str) -> &'static str {
    let lower = model.to_lowercase();
    if lower.contains("claude") {
        "bert-base-uncased"
    } else {
        "gpt2"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
