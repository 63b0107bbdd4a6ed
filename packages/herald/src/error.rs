//! Structured error types.
//!
//! # The Error Boundary Rule
//!
//! Herald owns very few failures, and it keeps them apart deliberately:
//!
//! - A **missing transition registration** is not an error. Dispatch skips
//!   it silently so applications can roll out events one member at a time.
//! - A **non-member field value** is not an error. The same field may hold
//!   other payloads at other lifecycle stages.
//! - A **host save failure** belongs to the host. It travels through
//!   [`StatusWrite`](crate::StatusWrite) as `anyhow::Error` and is returned
//!   unchanged - herald adds no wrapping.
//!
//! What remains is [`HeraldError`]: pattern-matchable misconfiguration
//! caught at startup, not at dispatch time.

use thiserror::Error;

/// Structured error type for herald operations.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// A transition is already registered for this (record type, member)
    /// pair.
    #[error("transition already registered for {event_name}")]
    TransitionAlreadyRegistered {
        /// Derived event name of the existing registration.
        event_name: String,
    },
}
