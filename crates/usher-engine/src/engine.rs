//! The operation engine.
//!
//! Executes homogeneous batches of single-participant operations against the
//! provider with per-item retry, bounded concurrency, and a per-chunk
//! progress callback. Every attempted operation yields one
//! [`OperationResult`]; batch-level setup failures are reported as a failed
//! result per input participant, so callers always get counts plus reasons
//! and never an unwinding error.

use std::collections::BTreeSet;
use std::time::Duration;

use usher_config::UsherConfig;
use usher_core::ops::{FailureReason, OperationResult};

use crate::batch::run_chunked;
use crate::emails::EmailCollection;
use crate::provider::{
    BreakoutOptions, BreakoutSessionState, MeetingProvider, NotifyLevel, ProviderResult,
};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::wait::await_condition;

/// Tuning knobs for the engine, typically filled from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub retry: RetryPolicy,
    /// Operations in flight at a time within a batch.
    pub chunk_size: usize,
    /// Bounded wait for a pre-existing breakout session to close.
    pub breakout_close_wait: Duration,
    /// Sampling interval for the close wait.
    pub breakout_close_poll: Duration,
    /// Bounded wait for requested participant emails to arrive.
    pub email_wait: Duration,
    /// Sampling interval while collecting emails.
    pub email_poll: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            chunk_size: 5,
            breakout_close_wait: Duration::from_secs(5),
            breakout_close_poll: Duration::from_millis(400),
            email_wait: Duration::from_secs(30),
            email_poll: Duration::from_secs(1),
        }
    }
}

impl EngineSettings {
    /// Build settings from the `engine` and `timeouts` configuration
    /// sections.
    #[must_use]
    pub fn from_config(config: &UsherConfig) -> Self {
        Self {
            retry: RetryPolicy {
                max_retries: config.engine.max_retries,
                base_delay: Duration::from_millis(config.engine.base_delay_ms),
                multiplier: config.engine.backoff_multiplier,
            },
            chunk_size: config.engine.chunk_size,
            breakout_close_wait: Duration::from_millis(config.timeouts.breakout_close_wait_ms),
            breakout_close_poll: Duration::from_millis(config.timeouts.breakout_close_poll_ms),
            email_wait: Duration::from_millis(config.timeouts.email_wait_ms),
            email_poll: Duration::from_millis(config.timeouts.email_poll_ms),
        }
    }
}

/// Batched move/admit/assign execution over a [`MeetingProvider`].
pub struct OperationEngine<P> {
    provider: P,
    settings: EngineSettings,
}

impl<P: MeetingProvider> OperationEngine<P> {
    #[must_use]
    pub const fn new(provider: P, settings: EngineSettings) -> Self {
        Self { provider, settings }
    }

    /// Access the underlying provider (e.g., for directory listings).
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Move each participant to the waiting room, `chunk_size` at a time,
    /// retrying transient failures per item.
    pub async fn move_to_waiting_room(
        &self,
        participant_ids: &[String],
        progress: impl FnMut(usize, usize),
    ) -> Vec<OperationResult> {
        let results = run_chunked(
            participant_ids.to_vec(),
            self.settings.chunk_size,
            progress,
            |id| async move {
                let (result, retries) =
                    retry_with_backoff(&self.settings.retry, "move_to_waiting_room", || {
                        self.provider.move_to_waiting_room(&id)
                    })
                    .await;
                match result {
                    Ok(()) => OperationResult::succeeded(id, retries),
                    Err(e) => OperationResult::failed(
                        id,
                        FailureReason::Transient { message: e.message },
                        retries,
                    ),
                }
            },
        )
        .await;
        self.log_batch("move_to_waiting_room", &results);
        results
    }

    /// Admit each participant from the waiting room.
    ///
    /// Eligibility is checked against a single waiting-room snapshot taken
    /// up front for the whole batch; targets absent from it fail fast with
    /// "not in waiting room" and zero retries. Known race: a participant
    /// entering the waiting room mid-batch is treated as absent and skipped.
    pub async fn admit_from_waiting_room(
        &self,
        participant_ids: &[String],
        progress: impl FnMut(usize, usize),
    ) -> Vec<OperationResult> {
        let waiting: BTreeSet<String> = match self.provider.list_waiting_room().await {
            Ok(entries) => entries.into_iter().map(|e| e.id).collect(),
            Err(e) => {
                // Without the snapshot no admit can be validated; report the
                // whole batch failed rather than admitting blind.
                tracing::warn!(error = %e, "waiting room snapshot failed, batch aborted");
                return participant_ids
                    .iter()
                    .map(|id| {
                        OperationResult::failed(
                            id.clone(),
                            FailureReason::Transient {
                                message: format!("waiting room listing failed: {}", e.message),
                            },
                            0,
                        )
                    })
                    .collect();
            }
        };

        let waiting = &waiting;
        let results = run_chunked(
            participant_ids.to_vec(),
            self.settings.chunk_size,
            progress,
            |id| async move {
                if !waiting.contains(&id) {
                    return OperationResult::failed(id, FailureReason::NotInWaitingRoom, 0);
                }
                let (result, retries) =
                    retry_with_backoff(&self.settings.retry, "admit_from_waiting_room", || {
                        self.provider.admit_from_waiting_room(&id)
                    })
                    .await;
                match result {
                    Ok(()) => OperationResult::succeeded(id, retries),
                    Err(e) => OperationResult::failed(
                        id,
                        FailureReason::Transient { message: e.message },
                        retries,
                    ),
                }
            },
        )
        .await;
        self.log_batch("admit_from_waiting_room", &results);
        results
    }

    /// Assign participants to a fresh breakout room named after the round.
    ///
    /// Closes any already-open session (bounded wait; on timeout proceed
    /// with a warning), creates and configures one room, assigns
    /// sequentially (the provider serializes per-room changes), then opens
    /// it. Creation or configuration failure aborts the batch: every input
    /// participant is reported failed with the setup error.
    pub async fn assign_breakout(
        &self,
        round_id: &str,
        participant_ids: &[String],
    ) -> Vec<OperationResult> {
        self.close_existing_session().await;

        let room_id = match self.provider.create_breakout_room(round_id).await {
            Ok(room_id) => room_id,
            Err(e) => {
                tracing::warn!(round_id, error = %e, "breakout room creation failed");
                return Self::setup_failure(participant_ids, &e.message);
            }
        };

        let options = BreakoutOptions {
            allow_return_to_main: false,
            auto_move_participants: true,
        };
        if let Err(e) = self.provider.configure_breakout_rooms(options).await {
            tracing::warn!(round_id, error = %e, "breakout room configuration failed");
            return Self::setup_failure(participant_ids, &e.message);
        }

        let mut results = Vec::with_capacity(participant_ids.len());
        for id in participant_ids {
            let (result, retries) =
                retry_with_backoff(&self.settings.retry, "assign_to_breakout_room", || {
                    self.provider.assign_to_breakout_room(&room_id, id)
                })
                .await;
            results.push(match result {
                Ok(()) => OperationResult::succeeded(id.clone(), retries),
                Err(e) => OperationResult::failed(
                    id.clone(),
                    FailureReason::Transient { message: e.message },
                    retries,
                ),
            });
        }

        if let Err(e) = self.provider.open_breakout_rooms().await {
            tracing::error!(round_id, error = %e, "assigned participants but opening rooms failed");
            self.notify(
                &format!("Breakout room '{round_id}' could not be opened: {}", e.message),
                NotifyLevel::Error,
            )
            .await;
        }

        self.log_batch("assign_to_breakout_room", &results);
        results
    }

    /// Close a pre-existing open breakout session and wait (bounded) for the
    /// provider to report it closed. Timing out is a warning, not a fault.
    async fn close_existing_session(&self) {
        match self.provider.list_breakout_rooms().await {
            Ok(listing) if listing.state == BreakoutSessionState::Open => {
                if let Err(e) = self.provider.close_breakout_rooms().await {
                    tracing::warn!(error = %e, "breakout close request failed, waiting anyway");
                }
                let outcome = await_condition(
                    self.settings.breakout_close_wait,
                    self.settings.breakout_close_poll,
                    || async {
                        matches!(
                            self.provider.list_breakout_rooms().await,
                            Ok(listing) if listing.state == BreakoutSessionState::Closed
                        )
                    },
                )
                .await;
                if outcome.timed_out() {
                    tracing::warn!("previous breakout session did not close in time, proceeding");
                    self.notify(
                        "Previous breakout session is still closing; continuing anyway",
                        NotifyLevel::Warning,
                    )
                    .await;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not inspect breakout session state, proceeding");
            }
        }
    }

    fn setup_failure(participant_ids: &[String], message: &str) -> Vec<OperationResult> {
        participant_ids
            .iter()
            .map(|id| {
                OperationResult::failed(
                    id.clone(),
                    FailureReason::Setup {
                        message: message.to_string(),
                    },
                    0,
                )
            })
            .collect()
    }

    /// Collect emails for directory participants lacking one, polling
    /// deliveries under the configured bounded wait.
    ///
    /// # Errors
    ///
    /// Returns the provider error if the directory listing or the delivery
    /// request fails; a timeout is reported in the collection, not as an
    /// error.
    pub async fn collect_missing_emails(&self, reason: &str) -> ProviderResult<EmailCollection> {
        crate::emails::collect_missing_emails(
            &self.provider,
            reason,
            self.settings.email_wait,
            self.settings.email_poll,
        )
        .await
    }

    /// Best-effort user notification; failures are swallowed.
    pub async fn notify(&self, message: &str, level: NotifyLevel) {
        if let Err(e) = self.provider.notify_user(message, level).await {
            tracing::debug!(error = %e, "user notification dropped");
        }
    }

    fn log_batch(&self, operation: &str, results: &[OperationResult]) {
        let summary = usher_core::ops::BatchSummary::from_results(results);
        tracing::info!(
            operation,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "batch complete"
        );
    }
}
