//! Engine-name normalization.
//!
//! Callers address inference backends by engine name (`vllm`, `sglang`);
//! pricing and encoding lookups use canonical model names. The mapping is
//! a fixed table, not per-request configuration, so the same cost and
//! encoding infrastructure serves every backend uniformly.

/// Canonical model used when no engine name is supplied.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Map a caller-supplied engine identifier to a canonical model name.
///
/// Known engines map through a fixed table (matched case-insensitively);
/// unknown names pass through unchanged; `None` or empty maps to
/// [`DEFAULT_MODEL`].
#[must_use]
pub fn canonical_model(engine: Option<&str>) -> String {
    let Some(engine) = engine.filter(|e| !e.is_empty()) else {
        return DEFAULT_MODEL.to_string();
    };
    match engine.to_lowercase().as_str() {
        "vllm" | "openai" => "gpt-3.5-turbo".to_string(),
        "sglang" => "gpt-4".to_string(),
        "anthropic" => "claude-3-sonnet".to_string(),
        _ => engine.to_string(),
    }
}

/// Default expected output token count for a canonical model.
///
/// Used by request-time estimates when the caller declares no maximum.
#[must_use]
pub fn default_max_output_tokens(model: &str) -> u32 {
    match model.to_lowercase().as_str() {
        "gpt-4" | "gpt-4-turbo" | "claude-3-opus" => 1024,
        _ => 512,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vllm_maps_to_gpt35() {
        assert_eq!(canonical_model(Some("vllm")), "gpt-3.5-turbo");
    }

    #[test]
    fn sglang_maps_to_gpt4() {
        assert_eq!(canonical_model(Some("sglang")), "gpt-4");
    }

    #[test]
    fn openai_maps_to_gpt35() {
        assert_eq!(canonical_model(Some("openai")), "gpt-3.5-turbo");
    }

    #[test]
    fn anthropic_maps_to_claude_sonnet() {
        assert_eq!(canonical_model(Some("anthropic")), "claude-3-sonnet");
    }

    #[test]
    fn mapping_is_case_insensitive() {
        assert_eq!(canonical_model(Some("VLLM")), "gpt-3.5-turbo");
        assert_eq!(canonical_model(Some("SgLang")), "gpt-4");
    }

    #[test]
    fn unknown_engine_passes_through_unchanged() {
        assert_eq!(canonical_model(Some("My-Custom-Model")), "My-Custom-Model");
    }

    #[test]
    fn none_maps_to_default() {
        assert_eq!(canonical_model(None), DEFAULT_MODEL);
    }

    #[test]
    fn empty_maps_to_default() {
        assert_eq!(canonical_model(Some("")), DEFAULT_MODEL);
    }

    #[test]
    fn canonical_model_passes_through_canonical_names() {
        assert_eq!(canonical_model(Some("gpt-4")), "gpt-4");
        assert_eq!(canonical_model(Some("claude-3-opus")), "claude-3-opus");
    }

    #[test]
    fn default_output_tokens_large_models() {
        assert_eq!(default_max_output_tokens("gpt-4"), 1024);
        assert_eq!(default_max_output_tokens("gpt-4-turbo"), 1024);
        assert_eq!(default_max_output_tokens("claude-3-opus"), 1024);
    }

    #[test]
    fn default_output_tokens_small_models() {
        assert_eq!(default_max_output_tokens("gpt-3.5-turbo"), 512);
        assert_eq!(default_max_output_tokens("claude-3-haiku"), 512);
        assert_eq!(default_max_output_tokens("unknown"), 512);
    }
}
