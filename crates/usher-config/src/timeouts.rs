//! Bounded-wait timeouts.

use serde::{Deserialize, Serialize};

/// Default bounded wait for a previous breakout session to close.
const fn default_breakout_close_wait_ms() -> u64 {
    5_000
}

/// Default poll interval while waiting for breakout close.
const fn default_breakout_close_poll_ms() -> u64 {
    400
}

/// Default bounded wait for requested participant emails to arrive.
const fn default_email_wait_ms() -> u64 {
    30_000
}

/// Default poll interval while collecting emails.
const fn default_email_poll_ms() -> u64 {
    1_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutConfig {
    /// How long to wait for an open breakout session to finish closing
    /// before proceeding anyway.
    #[serde(default = "default_breakout_close_wait_ms")]
    pub breakout_close_wait_ms: u64,

    /// Poll interval while waiting for the breakout session to close.
    #[serde(default = "default_breakout_close_poll_ms")]
    pub breakout_close_poll_ms: u64,

    /// How long to wait for participants to respond to an email request.
    #[serde(default = "default_email_wait_ms")]
    pub email_wait_ms: u64,

    /// Poll interval while collecting requested emails.
    #[serde(default = "default_email_poll_ms")]
    pub email_poll_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            breakout_close_wait_ms: default_breakout_close_wait_ms(),
            breakout_close_poll_ms: default_breakout_close_poll_ms(),
            email_wait_ms: default_email_wait_ms(),
            email_poll_ms: default_email_poll_ms(),
        }
    }
}
