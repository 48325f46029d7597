//! Vendor adapters for Modelgate.
//!
//! # Architecture
//!
//! - [`traits::ModelProvider`]: the interface every adapter implements
//! - [`capabilities`]: static model tables and alias resolution
//! - [`restrictions`]: allow-list policies consulted on every model lookup
//! - [`openai_compatible::OpenAiCompatibleProvider`]: OpenAI, X.AI and DIAL
//! - [`gemini::GeminiProvider`], [`custom::CustomProvider`]
//! - [`registry::ProviderRegistry`]: model name to adapter lookup
//! - [`unified::UnifiedProvider`]: routes any model through endpoint overrides
//!   or the registry

pub mod capabilities;
pub mod custom;
pub mod dial;
pub mod error;
pub mod gemini;
pub mod http_client;
pub mod openai;
pub mod openai_compatible;
pub mod registry;
pub mod restrictions;
pub mod traits;
pub mod unified;
pub mod xai;

// Re-export main types for convenience
pub use capabilities::{ModelCapabilities, ModelCatalog, TemperatureConstraint};
pub use custom::CustomProvider;
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use openai_compatible::{OpenAiCompatibleProvider, VendorSpec};
pub use registry::ProviderRegistry;
pub use restrictions::{AllowAll, EnvRestrictionPolicy, RestrictionPolicy};
pub use traits::{estimate_tokens, ModelProvider};
pub use unified::UnifiedProvider;
