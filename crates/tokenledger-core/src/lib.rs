//! # tokenledger-core
//!
//! Shared types for token accounting: resolution results, validation
//! outcomes, usage summaries, the error taxonomy, retry configuration,
//! and engine-name normalization.
//!
//! Everything in this crate is pure and synchronous; the async resolvers
//! live in the `tokenledger` crate and build on these types.

#![deny(unsafe_code)]

pub mod errors;
pub mod normalize;
pub mod retry;
pub mod types;

pub use errors::{Result, TokenError};
pub use normalize::{canonical_model, default_max_output_tokens, DEFAULT_MODEL};
pub use retry::{calculate_backoff_delay, RetryConfig};
pub use types::{
    efficiency_score, ResolutionMethod, TokenResult, UsageSummary, ValidationResult,
};
