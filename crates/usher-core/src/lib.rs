//! # usher-core
//!
//! Core types and error types for Usher.
//!
//! This crate provides the foundational types shared across all Usher crates:
//! - Participant and waiting-room structs normalized at the provider boundary
//! - Conflict sets (round -> normalized email set) and the email/name map
//! - Round phase enum with state machine transitions
//! - Per-operation result and failure-reason types
//! - The persisted state document (JSON round-trip contract)
//! - Email normalization and plausibility helpers
//!
//! There is no shared error enum here: soft failures travel as data in the
//! parser outcome and operation result types, and each crate that can fail
//! hard (store, config) carries its own thiserror enum.

pub mod conflicts;
pub mod document;
pub mod email;
pub mod ops;
pub mod participant;
pub mod rounds;
