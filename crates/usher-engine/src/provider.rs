//! The abstract meeting collaborator.
//!
//! Usher never talks to a meeting SDK directly. The host application (or the
//! test scaffolding) implements [`MeetingProvider`]; the engine consumes it
//! generically. Every call is a suspension point and may fail transiently --
//! the engine must not assume success without an explicit `Ok`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use usher_core::participant::{MeetingContext, Participant, WaitingRoomEntry};

/// A transient provider-side failure. The engine retries these per its
/// backoff policy; the message is surfaced verbatim in failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Whether a breakout session is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutSessionState {
    Open,
    Closed,
}

/// One breakout room as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BreakoutRoom {
    pub id: String,
    pub name: String,
    pub participants: Vec<String>,
}

/// Snapshot of the provider's breakout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BreakoutListing {
    pub state: BreakoutSessionState,
    pub rooms: Vec<BreakoutRoom>,
    pub unassigned: Vec<String>,
}

/// Session-level breakout options applied before opening rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BreakoutOptions {
    /// Whether participants may leave the room on their own.
    pub allow_return_to_main: bool,
    /// Whether assigned participants are moved without a join prompt.
    pub auto_move_participants: bool,
}

/// An email delivered in response to `request_participant_emails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EmailDelivery {
    pub participant_id: String,
    pub email: String,
}

/// Severity for best-effort user notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Primitive operations supplied by the meeting host application.
///
/// Email delivery is event-driven on the provider side; the engine models it
/// as `request_participant_emails` followed by polling `delivered_emails`
/// under a bounded wait (see [`crate::emails`]).
#[allow(async_fn_in_trait)]
pub trait MeetingProvider {
    async fn list_participants(&self) -> ProviderResult<Vec<Participant>>;

    async fn list_waiting_room(&self) -> ProviderResult<Vec<WaitingRoomEntry>>;

    async fn move_to_waiting_room(&self, participant_id: &str) -> ProviderResult<()>;

    async fn admit_from_waiting_room(&self, participant_id: &str) -> ProviderResult<()>;

    /// Create a breakout room, returning its provider-side id.
    async fn create_breakout_room(&self, name: &str) -> ProviderResult<String>;

    async fn configure_breakout_rooms(&self, options: BreakoutOptions) -> ProviderResult<()>;

    async fn assign_to_breakout_room(
        &self,
        room_id: &str,
        participant_id: &str,
    ) -> ProviderResult<()>;

    async fn open_breakout_rooms(&self) -> ProviderResult<()>;

    async fn close_breakout_rooms(&self) -> ProviderResult<()>;

    async fn list_breakout_rooms(&self) -> ProviderResult<BreakoutListing>;

    /// Ask the provider to deliver participant emails asynchronously.
    async fn request_participant_emails(&self, reason: &str) -> ProviderResult<()>;

    /// Emails delivered so far for the current request.
    async fn delivered_emails(&self) -> ProviderResult<Vec<EmailDelivery>>;

    /// Best-effort notification; callers swallow failures.
    async fn notify_user(&self, message: &str, level: NotifyLevel) -> ProviderResult<()>;

    async fn meeting_context(&self) -> ProviderResult<MeetingContext>;
}
