//! # tokenledger-settings
//!
//! Configuration for the token accounting service, loaded once at process
//! start and read-only thereafter.
//!
//! Loading flow:
//! 1. Start with compiled [`LedgerSettings::default()`]
//! 2. If a settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path};
pub use types::{
    CacheSettings, CostSettings, LedgerSettings, LocalSettings, ModelCost, ProviderSettings,
    RemoteSettings,
};
