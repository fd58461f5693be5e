//! # tokenledger
//!
//! Token accounting and tokenization resolution for an LLM gateway.
//!
//! Resolution is tiered: a remote tokenizer API (when configured) with
//! retry and exponential backoff, degrading transparently to an offline
//! BPE count. Results are cached, priced from a per-model table, and can
//! be validated against token and cost ceilings.
//!
//! ```no_run
//! use tokenledger::TokenResolutionService;
//! use tokenledger_settings::LedgerSettings;
//!
//! # async fn demo() -> tokenledger_core::Result<()> {
//! let service = TokenResolutionService::new(&LedgerSettings::default());
//! let result = service.resolve("Hello, world!", "gpt-3.5-turbo", false).await?;
//! println!("{} tokens, ${:.6}", result.input_tokens, result.estimated_cost);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod encoder;
pub mod facade;
pub mod local;
pub mod pricing;
pub mod remote;
pub mod stats;

pub use encoder::{EncoderRegistry, EncodingScheme};
pub use facade::{
    BatchOptions, HealthStatus, ServiceStats, TokenResolutionService, DEFAULT_MAX_COST,
    DEFAULT_TOKEN_CEILING,
};
pub use local::LocalResolver;
pub use pricing::PriceTable;
pub use remote::{RemoteError, RemoteResolver};
pub use stats::{ResolverStats, StatsSnapshot};
