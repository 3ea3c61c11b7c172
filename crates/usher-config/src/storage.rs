//! State persistence configuration.

use serde::{Deserialize, Serialize};

fn default_state_dir() -> String {
    ".usher/state".to_string()
}

/// Whether the JSONL operation trail is written.
const fn default_trail() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding per-session state documents and the trail.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Set to `false` to skip writing the JSONL operation trail.
    #[serde(default = "default_trail")]
    pub trail: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            trail: default_trail(),
        }
    }
}
