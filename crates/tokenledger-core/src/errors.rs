//! Token accounting error types.
//!
//! Three caller-visible failure classes: hard input errors (text too
//! large), unsupported models (no encoder and no default), and structured
//! limit violations. Transient remote failures never reach this taxonomy;
//! they are absorbed by the fallback path inside the remote resolver.

/// Errors surfaced to callers of the resolution layer.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Input text exceeds the configured maximum length.
    ///
    /// A hard limit: never retried, never truncated.
    #[error("text length {length} exceeds maximum allowed {max_length}")]
    TextTooLarge {
        /// Length of the rejected text in characters.
        length: usize,
        /// Configured maximum.
        max_length: usize,
    },

    /// No encoder is registered for the model and no default is available.
    #[error("no encoder available for model `{model}`")]
    UnsupportedModel {
        /// The model identifier.
        model: String,
    },

    /// A token or cost ceiling was exceeded.
    #[error("token limit exceeded: {requested} > {allowed} (model: {model})")]
    LimitExceeded {
        /// Total tokens the request would consume.
        requested: u32,
        /// Ceiling that was applied.
        allowed: u32,
        /// Canonical model the request targeted.
        model: String,
    },

    /// A resolution task failed for an internal reason (e.g. a counting
    /// task panicked or was cancelled). Indicates a bug, not bad input.
    #[error("internal resolution failure: {0}")]
    Internal(String),
}

impl TokenError {
    /// For limit violations, how far over the ceiling the request was
    /// (requested / allowed). 0 for other variants or a zero ceiling.
    #[must_use]
    pub fn excess_ratio(&self) -> f64 {
        match self {
            Self::LimitExceeded {
                requested, allowed, ..
            } if *allowed > 0 => f64::from(*requested) / f64::from(*allowed),
            _ => 0.0,
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TokenError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
