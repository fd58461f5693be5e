//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LedgerSettings::default()`]
//! 2. If `~/.tokenledger/settings.json` exists, deep-merge file values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::LedgerSettings;

/// Resolve the path to the settings file (`~/.tokenledger/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tokenledger").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LedgerSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LedgerSettings> {
    let defaults = serde_json::to_value(LedgerSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: LedgerSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Booleans accept: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`
/// - Invalid values are logged and ignored (fall back to file/default)
pub fn apply_env_overrides(settings: &mut LedgerSettings) {
    // ── Local resolver ──────────────────────────────────────────────
    if let Some(v) = read_env_bool("TOKENLEDGER_LOCAL_ENABLED") {
        settings.local.enabled = v;
    }
    if let Some(v) = read_env_string("TOKENLEDGER_DEFAULT_ENCODING") {
        settings.local.default_encoding = v;
    }
    if let Some(v) = read_env_usize("TOKENLEDGER_MAX_TEXT_LENGTH", 1, 10_000_000) {
        settings.local.max_text_length = v;
    }
    if let Some(v) = read_env_usize("TOKENLEDGER_LOCAL_CONCURRENCY", 1, 256) {
        settings.local.concurrency_limit = v;
    }

    // ── Remote providers ────────────────────────────────────────────
    if let Some(v) = read_env_bool("TOKENLEDGER_REMOTE_ENABLED") {
        settings.remote.enabled = v;
    }
    if let Some(v) = read_env_bool("TOKENLEDGER_OPENAI_ENABLED") {
        settings.remote.openai.enabled = v;
    }
    if let Some(v) = read_env_string("TOKENLEDGER_OPENAI_BASE_URL") {
        settings.remote.openai.base_url = v;
    }
    if let Some(v) = read_env_string("TOKENLEDGER_OPENAI_API_TOKEN") {
        settings.remote.openai.api_token = v;
    }
    if let Some(v) = read_env_u64("TOKENLEDGER_OPENAI_TIMEOUT_MS", 100, 600_000) {
        settings.remote.openai.timeout_ms = v;
    }
    if let Some(v) = read_env_bool("TOKENLEDGER_HF_ENABLED") {
        settings.remote.hugging_face.enabled = v;
    }
    if let Some(v) = read_env_string("TOKENLEDGER_HF_BASE_URL") {
        settings.remote.hugging_face.base_url = v;
    }
    if let Some(v) = read_env_string("TOKENLEDGER_HF_API_TOKEN") {
        settings.remote.hugging_face.api_token = v;
    }
    if let Some(v) = read_env_u64("TOKENLEDGER_HF_TIMEOUT_MS", 100, 600_000) {
        settings.remote.hugging_face.timeout_ms = v;
    }
    if let Some(v) = read_env_u32("TOKENLEDGER_RETRY_MAX_ATTEMPTS", 1, 10) {
        settings.remote.retry.max_attempts = v;
    }
    if let Some(v) = read_env_u64("TOKENLEDGER_RETRY_BASE_DELAY_MS", 1, 60_000) {
        settings.remote.retry.base_delay_ms = v;
    }
    if let Some(v) = read_env_usize("TOKENLEDGER_REMOTE_CONCURRENCY", 1, 256) {
        settings.remote.concurrency_limit = v;
    }

    // ── Cache ───────────────────────────────────────────────────────
    if let Some(v) = read_env_bool("TOKENLEDGER_CACHE_ENABLED") {
        settings.cache.enabled = v;
    }
    if let Some(v) = read_env_u64("TOKENLEDGER_CACHE_TTL_SECS", 1, 86_400) {
        settings.cache.expire_after_write_secs = v;
    }
    if let Some(v) = read_env_u64("TOKENLEDGER_CACHE_MAX_SIZE", 1, 10_000_000) {
        settings.cache.maximum_size = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
