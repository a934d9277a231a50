//! Accelerator backend options

use serde::{Deserialize, Serialize};

/// In-process accelerator options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorOptions {
    /// Upper bound on entries held by the segment; unbounded when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u64>,
}
