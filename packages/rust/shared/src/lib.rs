//! Shared types, error model, and configuration for scout.
//!
//! This crate is the foundation depended on by all other scout crates.
//! It provides:
//! - [`ScoutError`] — the unified error type
//! - Domain types ([`CompanyReport`], [`Lookup`], sentinel strings)
//! - Configuration ([`AppConfig`], runtime configs, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, EndpointsConfig, GenerationBackendConfig, GenerationConfig,
    LimitsConfig, LookupConfig, ResearchConfig, SLUG_PLACEHOLDER, TimeoutsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{Result, ScoutError};
pub use types::{
    CompanyReport, INFORMATION_UNAVAILABLE, Lookup, NO_CONTEXT, SUMMARY_UNAVAILABLE,
    truncate_chars,
};
