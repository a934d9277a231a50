//! Cache options for Cachette
//!
//! This crate holds the read-only option bag every cache driver consumes,
//! split by backend, together with a YAML/environment loader.

pub mod domains;
pub mod error;
pub mod loader;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::OptionsLoader;

// Re-export option domains
pub use domains::{
    accelerator::AcceleratorOptions,
    distributed::{DistributedOptions, ServerEndpoint},
    document::DocumentOptions,
    BackendKind, CacheOptions,
};

// Re-export utilities
pub use domains::utils::serde_duration;
