//! Settings — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use modelgate_core::config;
//!
//! let settings = config::load_settings(None);
//! println!("Default model: {}", settings.defaults.model);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_settings, save_settings};
pub use schema::{GenerationDefaults, ProviderConfig, ProvidersConfig, Settings};
