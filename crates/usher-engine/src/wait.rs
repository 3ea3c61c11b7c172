//! Bounded wait for external convergence.
//!
//! Waiting on the provider to reach a state (breakout session closed, email
//! events delivered) is modeled as a deadline plus a sampling interval, not
//! ad hoc timers. Timing out is a soft outcome returned as data -- callers
//! log a warning and proceed.

use std::time::Duration;

use tokio::time::Instant;

/// How a bounded wait resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied,
    TimedOut,
}

impl WaitOutcome {
    #[must_use]
    pub const fn timed_out(self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Poll `condition` every `interval` until it returns true or `deadline`
/// elapses. The condition is always sampled at least once.
pub async fn await_condition<F, Fut>(
    deadline: Duration,
    interval: Duration,
    mut condition: F,
) -> WaitOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    loop {
        if condition().await {
            return WaitOutcome::Satisfied;
        }
        if started.elapsed() >= deadline {
            return WaitOutcome::TimedOut;
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn satisfied_immediately() {
        let outcome = await_condition(
            Duration::from_secs(5),
            Duration::from_millis(400),
            || async { true },
        )
        .await;
        assert_eq!(outcome, WaitOutcome::Satisfied);
    }

    #[tokio::test(start_paused = true)]
    async fn satisfied_after_polls() {
        let polls = Cell::new(0u32);
        let outcome = await_condition(Duration::from_secs(5), Duration::from_millis(400), || {
            polls.set(polls.get() + 1);
            let done = polls.get() >= 3;
            async move { done }
        })
        .await;
        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(polls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_never_satisfied() {
        let polls = Cell::new(0u32);
        let outcome = await_condition(Duration::from_secs(2), Duration::from_millis(400), || {
            polls.set(polls.get() + 1);
            async { false }
        })
        .await;
        assert!(outcome.timed_out());
        // ~2s / 400ms plus the initial sample.
        assert!(polls.get() >= 5, "expected repeated sampling: {}", polls.get());
    }
}
