//! Model pricing.
//!
//! Costs are quoted per 1K tokens and applied linearly. Unknown models
//! fall back to a configured default price pair rather than erroring,
//! so cost estimation never blocks resolution.

use std::collections::HashMap;

use tokenledger_settings::{CostSettings, ModelCost};

/// Immutable per-model price lookup built from settings at startup.
#[derive(Clone, Debug)]
pub struct PriceTable {
    model_costs: HashMap<String, ModelCost>,
    default_cost: ModelCost,
}

impl PriceTable {
    /// Build the table from cost settings.
    #[must_use]
    pub fn new(settings: &CostSettings) -> Self {
        Self {
            model_costs: settings.model_costs.clone(),
            default_cost: settings.default_cost,
        }
    }

    /// Price pair for a canonical model, falling back to the default.
    #[must_use]
    pub fn cost_for(&self, model: &str) -> ModelCost {
        self.model_costs
            .get(model)
            .copied()
            .unwrap_or(self.default_cost)
    }

    /// Cost of `tokens` input tokens for a model, in USD.
    #[must_use]
    pub fn input_cost(&self, model: &str, tokens: u32) -> f64 {
        f64::from(tokens) / 1000.0 * self.cost_for(model).input_cost_per_1k
    }

    /// Cost of `tokens` output tokens for a model, in USD.
    #[must_use]
    pub fn output_cost(&self, model: &str, tokens: u32) -> f64 {
        f64::from(tokens) / 1000.0 * self.cost_for(model).output_cost_per_1k
    }

    /// Whether the model has an explicit entry (vs. the default fallback).
    #[must_use]
    pub fn has_model(&self, model: &str) -> bool {
        self.model_costs.contains_key(model)
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(&CostSettings::default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
