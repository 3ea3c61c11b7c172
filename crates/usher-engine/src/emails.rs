//! Email collection with bounded-wait correlation.
//!
//! The provider delivers participant emails as asynchronous events after a
//! `request_participant_emails` call. This module correlates deliveries back
//! to the participant ids still lacking an email, under a caller-specified
//! timeout, and reports partial results plus an explicit timed-out flag --
//! a timeout is a soft outcome, never an error.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use usher_core::email::normalize_email;

use crate::provider::{MeetingProvider, ProviderResult};
use crate::wait::await_condition;

/// Result of an email collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailCollection {
    /// Participant id -> normalized email, for deliveries that arrived.
    pub resolved: BTreeMap<String, String>,
    /// Whether the bounded wait expired before every id was resolved.
    pub timed_out: bool,
    /// Ids still lacking an email when the wait ended.
    pub missing: Vec<String>,
}

/// Request emails for every participant the directory reports without one,
/// then poll deliveries until all are correlated or `timeout` elapses.
///
/// # Errors
///
/// Returns the provider error if the directory listing or the delivery
/// request itself fails; polling failures are treated as "nothing delivered
/// yet" and absorbed by the bounded wait.
pub async fn collect_missing_emails<P: MeetingProvider>(
    provider: &P,
    reason: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> ProviderResult<EmailCollection> {
    let participants = provider.list_participants().await?;
    let pending: BTreeSet<String> = participants
        .into_iter()
        .filter(|p| p.email.is_none())
        .map(|p| p.id)
        .collect();

    if pending.is_empty() {
        return Ok(EmailCollection::default());
    }

    provider.request_participant_emails(reason).await?;

    let resolved: RefCell<BTreeMap<String, String>> = RefCell::new(BTreeMap::new());
    let outcome = await_condition(timeout, poll_interval, || async {
        let Ok(deliveries) = provider.delivered_emails().await else {
            return false;
        };
        let mut resolved = resolved.borrow_mut();
        for delivery in deliveries {
            if pending.contains(&delivery.participant_id) {
                resolved.insert(delivery.participant_id, normalize_email(&delivery.email));
            }
        }
        resolved.len() == pending.len()
    })
    .await;

    let resolved = resolved.into_inner();
    let missing: Vec<String> = pending
        .iter()
        .filter(|id| !resolved.contains_key(*id))
        .cloned()
        .collect();

    if outcome.timed_out() {
        tracing::warn!(
            resolved = resolved.len(),
            missing = missing.len(),
            "email collection timed out with partial results"
        );
    }

    Ok(EmailCollection {
        resolved,
        timed_out: outcome.timed_out(),
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeProvider;
    use pretty_assertions::assert_eq;
    use usher_core::participant::Participant;

    fn provider_with(participants: Vec<Participant>) -> FakeProvider {
        let provider = FakeProvider::new();
        for p in participants {
            provider.add_participant(p);
        }
        provider
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_to_collect() {
        let provider = provider_with(vec![Participant::from_directory(
            "p1",
            "Alice",
            None,
            Some("a@x.com"),
        )]);
        let collection = collect_missing_emails(
            &provider,
            "conflict matching",
            Duration::from_secs(5),
            Duration::from_millis(200),
        )
        .await
        .unwrap();
        assert_eq!(collection, EmailCollection::default());
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_delivered_emails() {
        let provider = provider_with(vec![
            Participant::from_directory("p1", "Alice", None, None),
            Participant::from_directory("p2", "Bob", None, None),
        ]);
        provider.deliver_email("p1", "Alice@Example.com");
        provider.deliver_email("p2", "bob@example.com");

        let collection = collect_missing_emails(
            &provider,
            "conflict matching",
            Duration::from_secs(5),
            Duration::from_millis(200),
        )
        .await
        .unwrap();

        assert!(!collection.timed_out);
        assert!(collection.missing.is_empty());
        assert_eq!(
            collection.resolved.get("p1").map(String::as_str),
            Some("alice@example.com")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn partial_delivery_times_out() {
        let provider = provider_with(vec![
            Participant::from_directory("p1", "Alice", None, None),
            Participant::from_directory("p2", "Bob", None, None),
        ]);
        provider.deliver_email("p1", "a@x.com");

        let collection = collect_missing_emails(
            &provider,
            "conflict matching",
            Duration::from_secs(2),
            Duration::from_millis(400),
        )
        .await
        .unwrap();

        assert!(collection.timed_out);
        assert_eq!(collection.missing, vec!["p2".to_string()]);
        assert_eq!(collection.resolved.len(), 1);
    }
}
