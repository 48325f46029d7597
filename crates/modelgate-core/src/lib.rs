//! Modelgate core — shared types, endpoint overrides, and settings.
//!
//! - [`types`] — provider tags, [`types::ModelResponse`], chat wire format
//! - [`endpoints`] — per-model base URL / API key overrides from env + JSON
//! - [`config`] — user settings (`~/.modelgate/config.json` + env vars)

pub mod config;
pub mod endpoints;
pub mod types;
pub mod utils;

pub use endpoints::{normalize_model_name, EndpointConfig, EndpointOverride, EndpointScope};
pub use types::{GenerationRequest, ModelResponse, ProviderType, UsageInfo};
