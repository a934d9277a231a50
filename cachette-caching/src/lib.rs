//! Storage-agnostic caching for Cachette
//!
//! One contract for storing opaque payloads under a key with a time-to-live,
//! fetching them, testing presence, deleting, and flushing by pattern,
//! implemented over interchangeable backends:
//!
//! - `accelerator`: an in-process segment with native expiry
//! - `distributed`: a pool of Redis servers with native expiry
//! - `document`: a MongoDB collection with stored expiry timestamps
//! - `none`: caching disabled
//!
//! Each backend except `none` sits behind a cargo feature of the same name.

pub mod cache;
pub mod connection;
pub mod errors;
pub mod facade;
pub mod pattern;
pub mod runtime;
pub mod stats;
pub mod stores;

use std::sync::Arc;

use cachette_config::{BackendKind, CacheOptions};

// Re-export main types
pub use cache::CacheDriver;
pub use connection::ConnectionState;
pub use errors::{CacheError, CacheResult, ErrorKind};
pub use facade::Cache;
pub use pattern::{compile_prefix, compile_regex, PatternKind, PatternSpec};
pub use runtime::RuntimeTier;
pub use stats::CacheStats;

// Re-export store implementations
pub use stores::NullCache;

#[cfg(feature = "accelerator")]
pub use stores::{AcceleratorCache, AcceleratorSegment};

#[cfg(feature = "distributed")]
pub use stores::DistributedCache;

#[cfg(feature = "document")]
pub use stores::DocumentCache;

pub use cachette_config;

/// Create the driver selected by `options.backend`
///
/// Fails with `BackendUnavailable` when the backend's feature is not compiled
/// in. No connection is attempted here.
pub fn create_driver(options: &CacheOptions) -> CacheResult<Arc<dyn CacheDriver>> {
    log::debug!("Creating {} cache driver", options.backend);

    match options.backend {
        BackendKind::Accelerator => create_accelerator(options),
        BackendKind::Distributed => create_distributed(options),
        BackendKind::Document => create_document(options),
        BackendKind::None => Ok(Arc::new(NullCache)),
    }
}

#[cfg(feature = "accelerator")]
fn create_accelerator(options: &CacheOptions) -> CacheResult<Arc<dyn CacheDriver>> {
    Ok(Arc::new(AcceleratorCache::new(options)?))
}

#[cfg(not(feature = "accelerator"))]
fn create_accelerator(_options: &CacheOptions) -> CacheResult<Arc<dyn CacheDriver>> {
    Err(CacheError::unavailable(
        "accelerator",
        "compiled without the `accelerator` feature",
    ))
}

#[cfg(feature = "distributed")]
fn create_distributed(options: &CacheOptions) -> CacheResult<Arc<dyn CacheDriver>> {
    Ok(Arc::new(DistributedCache::new(options)?))
}

#[cfg(not(feature = "distributed"))]
fn create_distributed(_options: &CacheOptions) -> CacheResult<Arc<dyn CacheDriver>> {
    Err(CacheError::unavailable(
        "distributed",
        "compiled without the `distributed` feature",
    ))
}

#[cfg(feature = "document")]
fn create_document(options: &CacheOptions) -> CacheResult<Arc<dyn CacheDriver>> {
    Ok(Arc::new(DocumentCache::new(options)?))
}

#[cfg(not(feature = "document"))]
fn create_document(_options: &CacheOptions) -> CacheResult<Arc<dyn CacheDriver>> {
    Err(CacheError::unavailable(
        "document",
        "compiled without the `document` feature",
    ))
}
