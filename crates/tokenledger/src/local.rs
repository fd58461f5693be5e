//! Local BPE resolver.
//!
//! Counts tokens with bundled vocabularies, fully offline. This tier is
//! the floor of the fallback chain: it either succeeds or fails with a
//! hard input error, never a transient one.

use std::sync::Arc;
use std::time::Instant;

use tokenledger_core::{Result, TokenError, TokenResult};
use tokenledger_core::types::ResolutionMethod;
use tokenledger_settings::LocalSettings;
use tracing::{debug, warn};

use crate::encoder::{EncoderRegistry, EncodingScheme};
use crate::pricing::PriceTable;
use crate::stats::{ResolverStats, StatsSnapshot};

/// Probe text used by the health check.
const HEALTH_PROBE_TEXT: &str = "Hello, world!";

/// Offline token resolver backed by the shared encoder registry.
///
/// Cheap to clone; clones share the registry, price table, and counters.
#[derive(Clone)]
pub struct LocalResolver {
    registry: Arc<EncoderRegistry>,
    prices: Arc<PriceTable>,
    stats: Arc<ResolverStats>,
    max_text_length: usize,
}

impl LocalResolver {
    /// Build a resolver from settings and a price table.
    ///
    /// An unrecognized `default_encoding` falls back to `cl100k_base`
    /// with a warning rather than failing startup.
    #[must_use]
    pub fn new(settings: &LocalSettings, prices: Arc<PriceTable>) -> Self {
        let default_scheme = match EncodingScheme::parse(&settings.default_encoding) {
            Some(scheme) => scheme,
            None => {
                warn!(
                    encoding = %settings.default_encoding,
                    "unknown default encoding, using cl100k_base"
                );
                EncodingScheme::Cl100kBase
            }
        };
        Self {
            registry: Arc::new(EncoderRegistry::new(default_scheme)),
            prices,
            stats: Arc::new(ResolverStats::new()),
            max_text_length: settings.max_text_length,
        }
    }

    /// Count input tokens for `text` against a canonical model, synchronously.
    ///
    /// Empty text yields a zero result without touching an encoder.
    pub fn compute_sync(&self, text: &str, model: &str) -> Result<TokenResult> {
        self.stats.record_request();
        if text.is_empty() {
            self.stats.record_success();
            return Ok(TokenResult::empty(model, ResolutionMethod::LocalBpe));
        }

        let length = text.chars().count();
        if length > self.max_text_length {
            self.stats.record_failure();
            return Err(TokenError::TextTooLarge {
                length,
                max_length: self.max_text_length,
            });
        }

        let started = Instant::now();
        let encoder = self.registry.encoder_for_model(model).inspect_err(|_| {
            self.stats.record_failure();
        })?;
        let count = u32::try_from(encoder.encode_with_special_tokens(text).len())
            .unwrap_or(u32::MAX);
        let cost = self.prices.input_cost(model, count);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(model, tokens = count, elapsed_ms, "local token count");
        metrics::counter!("tokenledger_local_resolutions_total").increment(1);
        self.stats.record_success();
        self.stats.record_processing_time(elapsed_ms);
        Ok(TokenResult::for_input(
            text,
            model,
            count,
            cost,
            elapsed_ms,
            ResolutionMethod::LocalBpe,
        ))
    }

    /// Count input tokens off the async runtime's worker threads.
    ///
    /// BPE over large texts is CPU-bound, so the count runs on the
    /// blocking pool.
    pub async fn compute_async(&self, text: String, model: String) -> Result<TokenResult> {
        let resolver = self.clone();
        tokio::task::spawn_blocking(move || resolver.compute_sync(&text, &model))
            .await
            .map_err(|err| TokenError::Internal(format!("counting task failed: {err}")))?
    }

    /// Rough chars/4 estimate when no tokenizer can run.
    ///
    /// Last resort of the fallback chain; never fails.
    #[must_use]
    pub fn simple_estimate(&self, text: &str, model: &str) -> TokenResult {
        if text.is_empty() {
            return TokenResult::empty(model, ResolutionMethod::SimpleEstimate);
        }
        let chars = text.chars().count();
        let count = u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX);
        let cost = self.prices.input_cost(model, count);
        TokenResult::for_input(text, model, count, cost, 0, ResolutionMethod::SimpleEstimate)
    }

    /// Whether the model maps to an explicitly registered encoding.
    ///
    /// Unmapped models still resolve through the default encoding.
    #[must_use]
    pub fn supports_model(&self, model: &str) -> bool {
        EncodingScheme::for_model(model).is_some()
    }

    /// Whether the resolver can count a trivial probe text.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.registry
            .encoder(self.registry.default_scheme())
            .map(|encoder| !encoder.encode_with_special_tokens(HEALTH_PROBE_TEXT).is_empty())
            .unwrap_or(false)
    }

    /// Configured maximum text length in characters.
    #[must_use]
    pub fn max_text_length(&self) -> usize {
        self.max_text_length
    }

    /// Shared price table.
    #[must_use]
    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Counter snapshot for this resolver.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot("local")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokenledger_settings::LocalSettings;

    fn resolver() -> LocalResolver {
        LocalResolver::new(&LocalSettings::default(), Arc::new(PriceTable::default()))
    }

    #[test]
    fn counts_simple_text() {
        let result = resolver().compute_sync("Hello, world!", "gpt-3.5-turbo").unwrap();
        assert!(result.input_tokens > 0);
        assert_eq!(result.output_tokens, 0);
        assert_eq!(result.total_tokens, result.input_tokens);
        assert_eq!(result.method, ResolutionMethod::LocalBpe);
        assert!(result.estimated_cost > 0.0);
    }

    #[test]
    fn empty_text_zero_result() {
        let result = resolver().compute_sync("", "gpt-4").unwrap();
        assert_eq!(result.input_tokens, 0);
        assert_eq!(result.total_tokens, 0);
        assert!((result.estimated_cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cost_matches_price_table() {
        let local = resolver();
        let result = local.compute_sync("Hello, world!", "gpt-3.5-turbo").unwrap();
        let expected = local.prices().input_cost("gpt-3.5-turbo", result.input_tokens);
        assert!((result.estimated_cost - expected).abs() < 1e-12);
    }

    #[test]
    fn oversized_text_rejected() {
        let settings = LocalSettings {
            max_text_length: 10,
            ..LocalSettings::default()
        };
        let local = LocalResolver::new(&settings, Arc::new(PriceTable::default()));
        let err = local.compute_sync("this text is longer than ten chars", "gpt-4");
        assert!(matches!(
            err,
            Err(TokenError::TextTooLarge { max_length: 10, .. })
        ));
    }

    #[test]
    fn deterministic_counts() {
        let local = resolver();
        let a = local.compute_sync("The quick brown fox", "gpt-4").unwrap();
        let b = local.compute_sync("The quick brown fox", "gpt-4").unwrap();
        assert_eq!(a.input_tokens, b.input_tokens);
    }

    #[test]
    fn unknown_model_uses_default_encoding() {
        let result = resolver().compute_sync("some text", "mystery-model").unwrap();
        assert!(result.input_tokens > 0);
    }

    #[test]
    fn unknown_default_encoding_falls_back() {
        let settings = LocalSettings {
            default_encoding: "bogus_base".to_string(),
            ..LocalSettings::default()
        };
        let local = LocalResolver::new(&settings, Arc::new(PriceTable::default()));
        assert!(local.compute_sync("text", "gpt-4").is_ok());
    }

    #[test]
    fn simple_estimate_chars_over_four() {
        let result = resolver().simple_estimate("abcdefgh", "gpt-4");
        assert_eq!(result.input_tokens, 2);
        assert_eq!(result.method, ResolutionMethod::SimpleEstimate);
    }

    #[test]
    fn simple_estimate_rounds_up() {
        let result = resolver().simple_estimate("abcde", "gpt-4");
        assert_eq!(result.input_tokens, 2);
    }

    #[test]
    fn simple_estimate_empty() {
        let result = resolver().simple_estimate("", "gpt-4");
        assert_eq!(result.input_tokens, 0);
    }

    #[test]
    fn supports_known_models_only() {
        let local = resolver();
        assert!(local.supports_model("gpt-4"));
        assert!(local.supports_model("claude-3-sonnet"));
        assert!(local.supports_model("text-davinci-003"));
        assert!(!local.supports_model("mystery-model"));
    }

    #[test]
    fn health_check_passes() {
        assert!(resolver().is_healthy());
    }

    #[test]
    fn stats_reflect_activity() {
        let local = resolver();
        let _ = local.compute_sync("hello", "gpt-4");
        let _ = local.compute_sync("world", "gpt-4");
        let snap = local.stats();
        assert_eq!(snap.requests, 2);
        assert_eq!(snap.successes, 2);
    }

    #[tokio::test]
    async fn async_path_matches_sync() {
        let local = resolver();
        let sync = local.compute_sync("Hello, world!", "gpt-4").unwrap();
        let async_result = local
            .compute_async("Hello, world!".to_string(), "gpt-4".to_string())
            .await
            .unwrap();
        assert_eq!(sync.input_tokens, async_result.input_tokens);
    }
}
