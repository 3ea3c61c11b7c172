//! # usher-engine
//!
//! Participant reconciliation and batched operations for Usher.
//!
//! The engine consumes a [`provider::MeetingProvider`] -- the abstract
//! collaborator supplying the live participant directory and the primitive
//! move/admit/assign calls -- and layers on:
//!
//! - matching conflict emails against live participants ([`matcher`])
//! - per-item retry with exponential backoff ([`retry`])
//! - bounded-concurrency chunked batches with progress ([`batch`])
//! - a reusable bounded wait for external convergence ([`wait`])
//! - email collection with timeout correlation ([`emails`])
//! - the operation engine itself ([`engine`])
//!
//! Everything runs on a single-threaded cooperative model: the concurrency
//! limit bounds in-flight suspended provider calls, not threads. Per-item
//! failures are returned as [`usher_core::ops::OperationResult`] data, never
//! as errors unwinding across the crate boundary.

pub mod batch;
pub mod emails;
pub mod engine;
pub mod matcher;
pub mod provider;
pub mod retry;
pub mod test_support;
pub mod wait;
