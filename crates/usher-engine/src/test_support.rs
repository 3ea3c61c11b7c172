//! Scripted in-memory provider for engine tests.
//!
//! `FakeProvider` serves canned directory/waiting-room/breakout state,
//! records every call, and can be scripted to fail an operation a fixed
//! number of times before succeeding -- enough to exercise retry budgets,
//! admit preconditions, and breakout orchestration without a meeting SDK.

use std::collections::BTreeMap;
use std::sync::Mutex;

use usher_core::participant::{MeetingContext, Participant, WaitingRoomEntry};

use crate::provider::{
    BreakoutListing, BreakoutOptions, BreakoutRoom, BreakoutSessionState, EmailDelivery,
    MeetingProvider, NotifyLevel, ProviderError, ProviderResult,
};

#[derive(Debug, Default)]
struct FakeState {
    participants: Vec<Participant>,
    waiting_room: Vec<WaitingRoomEntry>,
    breakout_state: Option<BreakoutSessionState>,
    rooms: Vec<BreakoutRoom>,
    deliveries: Vec<EmailDelivery>,
    /// Scripted failures: call key -> remaining failures before success.
    failures: BTreeMap<String, u32>,
    /// `list_breakout_rooms` polls remaining before a pending close lands.
    close_polls_remaining: u32,
    close_pending: bool,
    calls: Vec<String>,
    next_room_id: u32,
}

/// In-memory [`MeetingProvider`] with scriptable failures.
#[derive(Debug, Default)]
pub struct FakeProvider {
    state: Mutex<FakeState>,
}

impl FakeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_participant(&self, participant: Participant) {
        self.state.lock().unwrap().participants.push(participant);
    }

    pub fn set_waiting_room(&self, ids: &[&str]) {
        let entries = ids
            .iter()
            .map(|id| WaitingRoomEntry {
                id: (*id).to_string(),
                display_name: format!("name-{id}"),
            })
            .collect();
        self.state.lock().unwrap().waiting_room = entries;
    }

    /// Script `times` failures for a call key before it succeeds. Keys are
    /// `"move:p1"`, `"admit:p1"`, `"assign:p1"`, `"create"`, `"configure"`,
    /// `"open"`, `"close"`, `"list_waiting"`, `"notify"`.
    pub fn fail_times(&self, key: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(key.to_string(), times);
    }

    /// Mark the breakout session open; a close request will need `polls`
    /// further `list_breakout_rooms` calls before reporting closed.
    pub fn open_session_closing_after(&self, polls: u32) {
        let mut state = self.state.lock().unwrap();
        state.breakout_state = Some(BreakoutSessionState::Open);
        state.close_polls_remaining = polls;
    }

    pub fn deliver_email(&self, participant_id: &str, email: &str) {
        self.state.lock().unwrap().deliveries.push(EmailDelivery {
            participant_id: participant_id.to_string(),
            email: email.to_string(),
        });
    }

    /// Every provider call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Consume a scripted failure for `key`, if any remain.
    fn take_failure(state: &mut FakeState, key: &str) -> ProviderResult<()> {
        if let Some(remaining) = state.failures.get_mut(key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ProviderError::new(format!("scripted failure: {key}")));
            }
        }
        Ok(())
    }

    fn record(state: &mut FakeState, call: impl Into<String>) {
        state.calls.push(call.into());
    }
}

impl MeetingProvider for FakeProvider {
    async fn list_participants(&self) -> ProviderResult<Vec<Participant>> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "list_participants");
        Ok(state.participants.clone())
    }

    async fn list_waiting_room(&self) -> ProviderResult<Vec<WaitingRoomEntry>> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "list_waiting_room");
        Self::take_failure(&mut state, "list_waiting")?;
        Ok(state.waiting_room.clone())
    }

    async fn move_to_waiting_room(&self, participant_id: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("move:{participant_id}"));
        Self::take_failure(&mut state, &format!("move:{participant_id}"))?;
        let entry = WaitingRoomEntry {
            id: participant_id.to_string(),
            display_name: format!("name-{participant_id}"),
        };
        state.waiting_room.push(entry);
        Ok(())
    }

    async fn admit_from_waiting_room(&self, participant_id: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("admit:{participant_id}"));
        Self::take_failure(&mut state, &format!("admit:{participant_id}"))?;
        state.waiting_room.retain(|e| e.id != participant_id);
        Ok(())
    }

    async fn create_breakout_room(&self, name: &str) -> ProviderResult<String> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("create:{name}"));
        Self::take_failure(&mut state, "create")?;
        state.next_room_id += 1;
        let room_id = format!("room-{}", state.next_room_id);
        state.rooms.push(BreakoutRoom {
            id: room_id.clone(),
            name: name.to_string(),
            participants: Vec::new(),
        });
        state.breakout_state = Some(BreakoutSessionState::Closed);
        Ok(room_id)
    }

    async fn configure_breakout_rooms(&self, options: BreakoutOptions) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(
            &mut state,
            format!(
                "configure:return={},auto={}",
                options.allow_return_to_main, options.auto_move_participants
            ),
        );
        Self::take_failure(&mut state, "configure")
    }

    async fn assign_to_breakout_room(
        &self,
        room_id: &str,
        participant_id: &str,
    ) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("assign:{room_id}:{participant_id}"));
        Self::take_failure(&mut state, &format!("assign:{participant_id}"))?;
        if let Some(room) = state.rooms.iter_mut().find(|r| r.id == room_id) {
            room.participants.push(participant_id.to_string());
        }
        Ok(())
    }

    async fn open_breakout_rooms(&self) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "open");
        Self::take_failure(&mut state, "open")?;
        state.breakout_state = Some(BreakoutSessionState::Open);
        Ok(())
    }

    async fn close_breakout_rooms(&self) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "close");
        Self::take_failure(&mut state, "close")?;
        if state.close_polls_remaining == 0 {
            state.breakout_state = Some(BreakoutSessionState::Closed);
        } else {
            state.close_pending = true;
        }
        Ok(())
    }

    async fn list_breakout_rooms(&self) -> ProviderResult<BreakoutListing> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "list_breakout_rooms");
        if state.close_pending {
            if state.close_polls_remaining <= 1 {
                state.close_pending = false;
                state.close_polls_remaining = 0;
                state.breakout_state = Some(BreakoutSessionState::Closed);
            } else {
                state.close_polls_remaining -= 1;
            }
        }
        Ok(BreakoutListing {
            state: state.breakout_state.unwrap_or(BreakoutSessionState::Closed),
            rooms: state.rooms.clone(),
            unassigned: Vec::new(),
        })
    }

    async fn request_participant_emails(&self, reason: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("request_emails:{reason}"));
        Ok(())
    }

    async fn delivered_emails(&self) -> ProviderResult<Vec<EmailDelivery>> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "delivered_emails");
        Ok(state.deliveries.clone())
    }

    async fn notify_user(&self, message: &str, level: NotifyLevel) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("notify:{level}:{message}"));
        Self::take_failure(&mut state, "notify")
    }

    async fn meeting_context(&self) -> ProviderResult<MeetingContext> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "meeting_context");
        Ok(MeetingContext {
            is_host: true,
            meeting_id: "mtg-1".to_string(),
        })
    }
}
