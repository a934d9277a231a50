//! Cache driver implementations

pub mod null;

#[cfg(feature = "accelerator")]
pub mod accelerator;

#[cfg(feature = "distributed")]
pub mod distributed;

#[cfg(feature = "document")]
pub mod document;

pub use null::NullCache;

#[cfg(feature = "accelerator")]
pub use accelerator::{AcceleratorCache, AcceleratorSegment};

#[cfg(feature = "distributed")]
pub use distributed::DistributedCache;

#[cfg(feature = "document")]
pub use document::DocumentCache;
