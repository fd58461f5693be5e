//! Byte-pair encoder registry.
//!
//! Encoders are expensive to construct (vocabulary load + merge table
//! build), so they are built lazily and shared. The registry holds one
//! encoder per encoding scheme behind an `RwLock`; concurrent first
//! requests for the same scheme collapse to a single initialization via
//! a double-checked write path.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tiktoken_rs::CoreBPE;
use tokenledger_core::{Result, TokenError};
use tracing::debug;

/// The fixed encoding schemes the local resolver can count with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodingScheme {
    /// `cl100k_base`: GPT-3.5/GPT-4 family vocabulary.
    Cl100kBase,
    /// `p50k_base`: legacy completion-model vocabulary.
    P50kBase,
}

impl EncodingScheme {
    /// Canonical scheme name as it appears in configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Cl100kBase => "cl100k_base",
            Self::P50kBase => "p50k_base",
        }
    }

    /// Parse a configured scheme name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "cl100k_base" => Some(Self::Cl100kBase),
            "p50k_base" => Some(Self::P50kBase),
            _ => None,
        }
    }

    /// Scheme for a canonical model name, if one is registered.
    ///
    /// Chat-era GPT models and Claude models count against `cl100k_base`
    /// (Claude has no public BPE vocabulary; `cl100k_base` is the closest
    /// available approximation). Legacy davinci completions use `p50k_base`.
    #[must_use]
    pub fn for_model(model: &str) -> Option<Self> {
        let model = model.to_lowercase();
        if model.starts_with("gpt-4") || model.starts_with("gpt-3.5") || model.starts_with("claude")
        {
            Some(Self::Cl100kBase)
        } else if model.starts_with("text-davinci") {
            Some(Self::P50kBase)
        } else {
            None
        }
    }
}

/// Lazily-built, shared BPE encoders keyed by scheme.
pub struct EncoderRegistry {
    encoders: RwLock<HashMap<EncodingScheme, Arc<CoreBPE>>>,
    default_scheme: EncodingScheme,
}

impl EncoderRegistry {
    /// Create an empty registry with the given default scheme.
    ///
    /// No encoder is built until first use.
    #[must_use]
    pub fn new(default_scheme: EncodingScheme) -> Self {
        Self {
            encoders: RwLock::new(HashMap::new()),
            default_scheme,
        }
    }

    /// The scheme used when a model has no registered mapping.
    #[must_use]
    pub fn default_scheme(&self) -> EncodingScheme {
        self.default_scheme
    }

    /// Resolve the encoder for a canonical model name.
    ///
    /// Falls back to the default scheme for unmapped models, so every
    /// model resolves to some encoder.
    pub fn encoder_for_model(&self, model: &str) -> Result<Arc<CoreBPE>> {
        let scheme = EncodingScheme::for_model(model).unwrap_or(self.default_scheme);
        self.encoder(scheme)
    }

    /// Get or build the encoder for a scheme.
    pub fn encoder(&self, scheme: EncodingScheme) -> Result<Arc<CoreBPE>> {
        if let Some(encoder) = self.encoders.read().get(&scheme) {
            return Ok(Arc::clone(encoder));
        }

        let mut encoders = self.encoders.write();
        // Another thread may have built it between the read and write locks.
        if let Some(encoder) = encoders.get(&scheme) {
            return Ok(Arc::clone(encoder));
        }

        debug!(scheme = scheme.name(), "building BPE encoder");
        let built = build_encoder(scheme)?;
        let encoder = Arc::new(built);
        let _ = encoders.insert(scheme, Arc::clone(&encoder));
        Ok(encoder)
    }

    /// Number of encoders built so far.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.encoders.read().len()
    }
}

fn build_encoder(scheme: EncodingScheme) -> Result<CoreBPE> {
    let result = match scheme {
        EncodingScheme::Cl100kBase => tiktoken_rs::cl100k_base(),
        EncodingScheme::P50kBase => tiktoken_rs::p50k_base(),
    };
    result.map_err(|_| TokenError::UnsupportedModel {
        model: scheme.name().to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
