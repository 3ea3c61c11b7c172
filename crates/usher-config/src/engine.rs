//! Operation engine tuning.

use serde::{Deserialize, Serialize};

/// Default per-chunk concurrency for batch operations.
const fn default_chunk_size() -> usize {
    5
}

/// Default retry budget per participant operation.
const fn default_max_retries() -> u32 {
    3
}

/// Default first-retry delay in milliseconds.
const fn default_base_delay_ms() -> u64 {
    300
}

/// Default exponential backoff multiplier.
const fn default_backoff_multiplier() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// How many participant operations run concurrently per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Retries after the initial attempt before an operation is reported
    /// as failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Each subsequent retry waits this many times longer.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}
