//! Resolution facade.
//!
//! Single entry point composing the local and remote resolvers behind a
//! bounded result cache, plus validation, batch/stream fan-out, usage
//! summaries, and health/stats reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use moka::future::Cache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokenledger_core::types::ValidationResult;
use tokenledger_core::{
    canonical_model, default_max_output_tokens, efficiency_score, Result, TokenError, TokenResult,
    UsageSummary,
};
use tokenledger_settings::LedgerSettings;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::local::LocalResolver;
use crate::pricing::PriceTable;
use crate::remote::RemoteResolver;
use crate::stats::StatsSnapshot;

/// Token ceiling applied when a caller validates without one.
pub const DEFAULT_TOKEN_CEILING: u32 = 8192;
/// Cost ceiling in USD applied when a caller validates without one.
pub const DEFAULT_MAX_COST: f64 = 1.0;

/// Bounded channel capacity for batch results.
const BATCH_CHANNEL_CAPACITY: usize = 1000;
/// Bounded channel capacity for streaming results.
const STREAM_CHANNEL_CAPACITY: usize = 500;
/// Items grouped per streaming window.
const STREAM_WINDOW_SIZE: usize = 10;
/// Windows resolved concurrently.
const STREAM_WINDOWS_IN_FLIGHT: usize = 2;

/// Options for batch and stream resolution.
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// Route items through the remote tier when it is enabled.
    pub prefer_remote: bool,
    /// Per-call concurrency override (settings default when `None`).
    pub concurrency: Option<usize>,
    /// Cooperative cancellation: stops scheduling new items.
    pub cancel_token: Option<CancellationToken>,
}

/// Health of the resolution tiers.
///
/// `overall_healthy` tracks the local tier only: remote degradation is
/// absorbed by the fallback chain and does not make the service unhealthy.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Local BPE tier can count tokens.
    pub local_healthy: bool,
    /// A remote provider answered a probe.
    pub remote_healthy: bool,
    /// Remote resolution is configured on.
    pub remote_enabled: bool,
    /// Service-level health.
    pub overall_healthy: bool,
}

/// Combined counter view across tiers and the cache.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    /// Local resolver counters.
    pub local: StatsSnapshot,
    /// Remote resolver counters, when the tier is configured.
    pub remote: Option<StatsSnapshot>,
    /// Results served from cache.
    pub cache_hits: u64,
    /// Lookups that missed the cache.
    pub cache_misses: u64,
    /// Requests across both tiers.
    pub total_calculations: u64,
}

/// Tiered token resolution service.
///
/// Cheap to clone; clones share resolvers, cache, and counters.
#[derive(Clone)]
pub struct TokenResolutionService {
    local: LocalResolver,
    remote: Option<Arc<RemoteResolver>>,
    prices: Arc<PriceTable>,
    cache: Option<Cache<String, TokenResult>>,
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,
    local_concurrency: usize,
    remote_concurrency: usize,
}

impl TokenResolutionService {
    /// Assemble the service from settings.
    #[must_use]
    pub fn new(settings: &LedgerSettings) -> Self {
        let prices = Arc::new(PriceTable::new(&settings.cost));
        let local = LocalResolver::new(&settings.local, Arc::clone(&prices));
        let remote = settings.remote.enabled.then(|| {
            Arc::new(RemoteResolver::new(
                settings.remote.clone(),
                local.clone(),
                Arc::clone(&prices),
            ))
        });
        let cache = settings.cache.enabled.then(|| {
            Cache::builder()
                .max_capacity(settings.cache.maximum_size)
                .time_to_live(Duration::from_secs(settings.cache.expire_after_write_secs))
                .build()
        });
        Self {
            local,
            remote,
            prices,
            cache,
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
            local_concurrency: settings.local.concurrency_limit.max(1),
            remote_concurrency: settings.remote.concurrency_limit.max(1),
        }
    }

    /// Resolve one text against a model or engine name.
    ///
    /// Checks the cache first; on a miss, routes through the remote tier
    /// (which carries its own local fallback) when `prefer_remote` and a
    /// remote resolver is configured, otherwise counts locally. Successful
    /// results are cached.
    pub async fn resolve(
        &self,
        text: &str,
        model: &str,
        prefer_remote: bool,
    ) -> Result<TokenResult> {
        let model = canonical_model(Some(model));

        let key = self.cache.as_ref().map(|_| cache_key(text, &model));
        if let (Some(cache), Some(key)) = (&self.cache, key.as_ref()) {
            if let Some(hit) = cache.get(key).await {
                let _ = self.cache_hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("tokenledger_cache_hits_total").increment(1);
                debug!(model, "token result served from cache");
                return Ok(hit);
            }
            let _ = self.cache_misses.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("tokenledger_cache_misses_total").increment(1);
        }

        let result = match (&self.remote, prefer_remote) {
            (Some(remote), true) => remote.compute_async(text, &model).await?,
            _ => {
                self.local
                    .compute_async(text.to_string(), model.clone())
                    .await?
            }
        };

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, result.clone()).await;
        }
        Ok(result)
    }

    /// Estimate the full cost of a request before it runs.
    ///
    /// Counts the input locally, then adds a declared (or model-default)
    /// expected output count priced at the output rate.
    pub async fn resolve_total(
        &self,
        input_text: &str,
        expected_output_tokens: Option<u32>,
        engine: Option<&str>,
    ) -> Result<TokenResult> {
        let model = canonical_model(engine);
        let input = self
            .local
            .compute_async(input_text.to_string(), model.clone())
            .await?;
        let expected = expected_output_tokens.unwrap_or_else(|| default_max_output_tokens(&model));
        let output_cost = self.prices.output_cost(&model, expected);
        Ok(input.with_expected_output(expected, output_cost))
    }

    /// Count a response text, attributing its tokens to the output side.
    pub async fn resolve_response(&self, response_text: &str, engine: Option<&str>) -> Result<TokenResult> {
        let model = canonical_model(engine);
        let counted = self
            .local
            .compute_async(response_text.to_string(), model.clone())
            .await?;
        let cost = self.prices.output_cost(&model, counted.input_tokens);
        let mut flipped = counted.into_output();
        flipped.estimated_cost = cost;
        Ok(flipped)
    }

    /// Resolve many texts concurrently, yielding results unordered.
    ///
    /// Exactly one `Result` per input reaches the stream (unless cancelled
    /// or the receiver is dropped). Results flow through a bounded channel,
    /// so a slow consumer stalls producers instead of buffering unboundedly.
    pub fn resolve_batch(
        &self,
        texts: Vec<String>,
        model: &str,
        opts: BatchOptions,
    ) -> ReceiverStream<Result<TokenResult>> {
        let (tx, rx) = mpsc::channel(BATCH_CHANNEL_CAPACITY);
        let service = self.clone();
        let model = canonical_model(Some(model));
        let cancel = opts.cancel_token.clone().unwrap_or_default();
        let prefer_remote = opts.prefer_remote;
        let concurrency = opts
            .concurrency
            .unwrap_or(if prefer_remote {
                self.remote_concurrency
            } else {
                self.local_concurrency
            })
            .max(1);

        drop(tokio::spawn(async move {
            let mut results = stream::iter(texts)
                .map(|text| {
                    let service = service.clone();
                    let model = model.clone();
                    async move { service.resolve(&text, &model, prefer_remote).await }
                })
                .buffer_unordered(concurrency);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    next = results.next() => match next {
                        Some(result) => {
                            if tx.send(result).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        }));
        ReceiverStream::new(rx)
    }

    /// Resolve a stream of texts in windows.
    ///
    /// Input is grouped into windows of ten with at most two windows in
    /// flight; per-item results flow through a bounded channel with the
    /// same one-result-per-input contract as [`resolve_batch`].
    ///
    /// [`resolve_batch`]: Self::resolve_batch
    pub fn resolve_stream<S>(
        &self,
        input: S,
        model: &str,
        opts: BatchOptions,
    ) -> ReceiverStream<Result<TokenResult>>
    where
        S: Stream<Item = String> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let service = self.clone();
        let model = canonical_model(Some(model));
        let cancel = opts.cancel_token.clone().unwrap_or_default();
        let prefer_remote = opts.prefer_remote;

        drop(tokio::spawn(async move {
            let windows = input
                .chunks(STREAM_WINDOW_SIZE)
                .map(|window| {
                    let service = service.clone();
                    let model = model.clone();
                    async move {
                        let mut out = Vec::with_capacity(window.len());
                        for text in window {
                            out.push(service.resolve(&text, &model, prefer_remote).await);
                        }
                        out
                    }
                })
                .buffer_unordered(STREAM_WINDOWS_IN_FLIGHT);
            let mut windows = std::pin::pin!(windows);

            'outer: loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    next = windows.next() => match next {
                        Some(results) => {
                            for result in results {
                                if tx.send(result).await.is_err() {
                                    break 'outer;
                                }
                            }
                        }
                        None => break,
                    },
                }
            }
        }));
        ReceiverStream::new(rx)
    }

    /// Check a result against a token ceiling (default 8192).
    ///
    /// Violations come back as data, not errors; use [`enforce`] to turn
    /// an invalid outcome into [`TokenError::LimitExceeded`].
    ///
    /// [`enforce`]: Self::enforce
    #[must_use]
    pub fn validate(&self, result: &TokenResult, ceiling: Option<u32>) -> ValidationResult {
        let max_allowed = ceiling.unwrap_or(DEFAULT_TOKEN_CEILING);
        let valid = result.total_tokens <= max_allowed;
        let message = if valid {
            format!(
                "token count {} within limit {max_allowed}",
                result.total_tokens
            )
        } else {
            format!(
                "token count {} exceeds maximum allowed {max_allowed}",
                result.total_tokens
            )
        };
        ValidationResult {
            valid,
            result: result.clone(),
            max_allowed,
            message,
        }
    }

    /// Check a result against token and cost ceilings (defaults 8192 / $1.00).
    #[must_use]
    pub fn validate_with_cost(
        &self,
        result: &TokenResult,
        ceiling: Option<u32>,
        max_cost: Option<f64>,
    ) -> ValidationResult {
        let mut validation = self.validate(result, ceiling);
        let max_cost = max_cost.unwrap_or(DEFAULT_MAX_COST);
        if result.estimated_cost > max_cost {
            validation.valid = false;
            validation.message = format!(
                "estimated cost ${:.4} exceeds maximum ${max_cost:.2}",
                result.estimated_cost
            );
        }
        validation
    }

    /// Turn an invalid validation into a structured limit error.
    pub fn enforce(&self, validation: &ValidationResult) -> Result<()> {
        if validation.valid {
            return Ok(());
        }
        Err(TokenError::LimitExceeded {
            requested: validation.result.total_tokens,
            allowed: validation.max_allowed,
            model: validation.result.model.clone(),
        })
    }

    /// Summarize usage across one request/response pair.
    ///
    /// Both sides are counted locally and concurrently; either failure
    /// fails the whole summary.
    pub async fn summarize(
        &self,
        request_text: &str,
        response_text: &str,
        engine: Option<&str>,
    ) -> Result<UsageSummary> {
        let model = canonical_model(engine);
        let (request, response) = tokio::try_join!(
            self.local
                .compute_async(request_text.to_string(), model.clone()),
            self.local
                .compute_async(response_text.to_string(), model.clone()),
        )?;
        let response = response.into_output();

        let input_cost = self.prices.input_cost(&model, request.input_tokens);
        let output_cost = self.prices.output_cost(&model, response.output_tokens);
        Ok(UsageSummary {
            total_input_tokens: request.input_tokens,
            total_output_tokens: response.output_tokens,
            total_tokens: request.input_tokens + response.output_tokens,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
            total_processing_time_ms: request.processing_time_ms + response.processing_time_ms,
            model,
            efficiency_score: efficiency_score(request.input_tokens, response.output_tokens),
        })
    }

    /// Health of both tiers.
    pub async fn health_status(&self) -> HealthStatus {
        let local_healthy = self.local.is_healthy();
        let remote_healthy = match &self.remote {
            Some(remote) => remote.is_healthy().await,
            None => false,
        };
        HealthStatus {
            local_healthy,
            remote_healthy,
            remote_enabled: self.remote.is_some(),
            overall_healthy: local_healthy,
        }
    }

    /// Counter snapshot across tiers and the cache.
    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        let local = self.local.stats();
        let remote = self.remote.as_ref().map(|r| r.stats());
        let total_calculations = local.requests + remote.map_or(0, |r| r.requests);
        ServiceStats {
            local,
            remote,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            total_calculations,
        }
    }

    /// Shared price table.
    #[must_use]
    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }
}

/// Cache key: SHA-256 over text, a NUL separator, and the canonical model.
///
/// The separator prevents `("ab", "c")` and `("a", "bc")` collisions.
fn cache_key(text: &str, model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update([0u8]);
    hasher.update(model.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokenledger_core::types::ResolutionMethod;
    use tokenledger_settings::CacheSettings;

    fn service() -> TokenResolutionService {
        TokenResolutionService::new(&LedgerSettings::default())
    }

    fn service_without_cache() -> TokenResolutionService {
        let settings = LedgerSettings {
            cache: CacheSettings {
                enabled: false,
                ..CacheSettings::default()
            },
            ..LedgerSettings::default()
        };
        TokenResolutionService::new(&settings)
    }

    // ── cache key ───────────────────────────────────────────────────

    #[test]
    fn cache_key_separates_text_and_model() {
        assert_ne!(cache_key("ab", "c"), cache_key("a", "bc"));
        assert_ne!(cache_key("text", "gpt-4"), cache_key("text", "gpt-3.5-turbo"));
        assert_eq!(cache_key("text", "gpt-4"), cache_key("text", "gpt-4"));
    }

    // ── resolve ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn resolve_hello_world() {
        let result = service().resolve("Hello, world!", "gpt-3.5-turbo", false).await.unwrap();
        assert!(result.input_tokens > 0);
        assert_eq!(result.method, ResolutionMethod::LocalBpe);
        let expected_cost = f64::from(result.input_tokens) / 1000.0 * 0.0015;
        assert!((result.estimated_cost - expected_cost).abs() < 1e-12);
    }

    #[tokio::test]
    async fn resolve_normalizes_engine_names() {
        let result = service().resolve("some text", "vllm", false).await.unwrap();
        assert_eq!(result.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn repeated_resolve_hits_cache() {
        let svc = service();
        let first = svc.resolve("cached text", "gpt-4", false).await.unwrap();
        let second = svc.resolve("cached text", "gpt-4", false).await.unwrap();
        assert_eq!(first, second);

        let stats = svc.stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        // The second call never reached the resolver.
        assert_eq!(stats.local.requests, 1);
    }

    #[tokio::test]
    async fn disabled_cache_resolves_every_time() {
        let svc = service_without_cache();
        let _ = svc.resolve("text", "gpt-4", false).await.unwrap();
        let _ = svc.resolve("text", "gpt-4", false).await.unwrap();
        let stats = svc.stats();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.local.requests, 2);
    }

    #[tokio::test]
    async fn prefer_remote_without_remote_uses_local() {
        let result = service().resolve("text", "gpt-4", true).await.unwrap();
        assert_eq!(result.method, ResolutionMethod::LocalBpe);
    }

    // ── resolve_total ───────────────────────────────────────────────

    #[tokio::test]
    async fn resolve_total_with_declared_output() {
        let result = service()
            .resolve_total("Hello", Some(50), Some("vllm"))
            .await
            .unwrap();
        assert_eq!(result.model, "gpt-3.5-turbo");
        assert_eq!(result.output_tokens, 50);
        assert_eq!(result.total_tokens, result.input_tokens + 50);
    }

    #[tokio::test]
    async fn resolve_total_defaults_output_by_model() {
        let svc = service();
        let large = svc.resolve_total("Hello", None, Some("sglang")).await.unwrap();
        assert_eq!(large.output_tokens, 1024); // sglang → gpt-4
        let small = svc.resolve_total("Hello", None, None).await.unwrap();
        assert_eq!(small.output_tokens, 512);
    }

    #[tokio::test]
    async fn resolve_total_adds_output_cost() {
        let svc = service();
        let input_only = svc.resolve("Hello", "gpt-4", false).await.unwrap();
        let total = svc.resolve_total("Hello", Some(1000), Some("gpt-4")).await.unwrap();
        // gpt-4 output: $0.06 per 1K
        assert!((total.estimated_cost - (input_only.estimated_cost + 0.06)).abs() < 1e-9);
    }

    // ── resolve_response ────────────────────────────────────────────

    #[tokio::test]
    async fn resolve_response_flips_to_output_side() {
        let result = service()
            .resolve_response("generated answer", Some("gpt-4"))
            .await
            .unwrap();
        assert_eq!(result.input_tokens, 0);
        assert!(result.output_tokens > 0);
        let expected_cost = f64::from(result.output_tokens) / 1000.0 * 0.06;
        assert!((result.estimated_cost - expected_cost).abs() < 1e-12);
    }

    // ── validate ────────────────────────────────────────────────────

    fn result_with_total(total: u32) -> TokenResult {
        TokenResult::for_input("text", "gpt-4", total, 0.01, 1, ResolutionMethod::LocalBpe)
    }

    #[tokio::test]
    async fn validate_within_default_ceiling() {
        let validation = service().validate(&result_with_total(100), None);
        assert!(validation.valid);
        assert_eq!(validation.max_allowed, DEFAULT_TOKEN_CEILING);
    }

    #[tokio::test]
    async fn validate_exceeding_ceiling_names_both_counts() {
        let validation = service().validate(&result_with_total(25), Some(10));
        assert!(!validation.valid);
        assert_eq!(validation.max_allowed, 10);
        assert!(validation.message.contains("25"));
        assert!(validation.message.contains("10"));
    }

    #[tokio::test]
    async fn validate_at_exact_ceiling_is_valid() {
        let validation = service().validate(&result_with_total(10), Some(10));
        assert!(validation.valid);
    }

    #[tokio::test]
    async fn validate_with_cost_flags_expensive_results() {
        let mut result = result_with_total(100);
        result.estimated_cost = 2.5;
        let validation = service().validate_with_cost(&result, None, None);
        assert!(!validation.valid);
        assert!(validation.message.contains("cost"));
    }

    #[tokio::test]
    async fn validate_with_cost_passes_cheap_results() {
        let validation = service().validate_with_cost(&result_with_total(100), None, None);
        assert!(validation.valid);
    }

    #[tokio::test]
    async fn enforce_turns_invalid_into_limit_error() {
        let svc = service();
        let validation = svc.validate(&result_with_total(25), Some(10));
        let err = svc.enforce(&validation).unwrap_err();
        match err {
            TokenError::LimitExceeded {
                requested, allowed, ..
            } => {
                assert_eq!(requested, 25);
                assert_eq!(allowed, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn enforce_passes_valid_results() {
        let svc = service();
        let validation = svc.validate(&result_with_total(5), Some(10));
        assert!(svc.enforce(&validation).is_ok());
    }

    // ── summarize ───────────────────────────────────────────────────

    #[tokio::test]
    async fn summarize_merges_both_sides() {
        let summary = service()
            .summarize("What is Rust?", "Rust is a systems programming language.", None)
            .await
            .unwrap();
        assert!(summary.total_input_tokens > 0);
        assert!(summary.total_output_tokens > 0);
        assert_eq!(
            summary.total_tokens,
            summary.total_input_tokens + summary.total_output_tokens
        );
        assert!((summary.total_cost - (summary.input_cost + summary.output_cost)).abs() < 1e-12);
        assert_eq!(summary.model, "gpt-3.5-turbo");
        assert!(summary.efficiency_score >= 0.0 && summary.efficiency_score <= 100.0);
    }

    // ── batch & stream ──────────────────────────────────────────────

    #[tokio::test]
    async fn batch_yields_one_result_per_input() {
        let texts: Vec<String> = (0..25).map(|i| format!("input number {i}")).collect();
        let mut stream = service().resolve_batch(texts, "gpt-4", BatchOptions::default());
        let mut count = 0;
        while let Some(result) = stream.next().await {
            assert!(result.is_ok());
            count += 1;
        }
        assert_eq!(count, 25);
    }

    #[tokio::test]
    async fn batch_carries_per_item_failures() {
        let settings = LedgerSettings {
            local: tokenledger_settings::LocalSettings {
                max_text_length: 10,
                ..tokenledger_settings::LocalSettings::default()
            },
            ..LedgerSettings::default()
        };
        let svc = TokenResolutionService::new(&settings);
        let texts = vec![
            "short".to_string(),
            "this one is far too long to pass".to_string(),
            "tiny".to_string(),
        ];
        let results: Vec<_> = svc
            .resolve_batch(texts, "gpt-4", BatchOptions::default())
            .collect()
            .await;
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[tokio::test]
    async fn batch_empty_input_completes_immediately() {
        let results: Vec<_> = service()
            .resolve_batch(Vec::new(), "gpt-4", BatchOptions::default())
            .collect()
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn pre_cancelled_batch_yields_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let texts: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        let opts = BatchOptions {
            cancel_token: Some(token),
            ..BatchOptions::default()
        };
        let results: Vec<_> = service().resolve_batch(texts, "gpt-4", opts).collect().await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn stream_resolves_all_items() {
        let texts: Vec<String> = (0..23).map(|i| format!("streamed {i}")).collect();
        let input = stream::iter(texts);
        let results: Vec<_> = service()
            .resolve_stream(input, "gpt-4", BatchOptions::default())
            .collect()
            .await;
        assert_eq!(results.len(), 23);
        assert!(results.iter().all(std::result::Result::is_ok));
    }

    // ── health & stats ──────────────────────────────────────────────

    #[tokio::test]
    async fn health_without_remote() {
        let health = service().health_status().await;
        assert!(health.local_healthy);
        assert!(!health.remote_enabled);
        assert!(!health.remote_healthy);
        assert!(health.overall_healthy);
    }

    #[tokio::test]
    async fn stats_aggregate_total() {
        let svc = service();
        let _ = svc.resolve("one", "gpt-4", false).await.unwrap();
        let _ = svc.resolve("two", "gpt-4", false).await.unwrap();
        let stats = svc.stats();
        assert_eq!(stats.total_calculations, 2);
        assert!(stats.remote.is_none());
    }

    #[tokio::test]
    async fn stats_serialize_camel_case() {
        let json = serde_json::to_value(service().stats()).unwrap();
        assert!(json.get("cacheHits").is_some());
        assert!(json.get("totalCalculations").is_some());
    }
}
