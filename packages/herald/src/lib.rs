//! # Herald
//!
//! A synchronous status-event layer where records report saves, registries
//! resolve transitions, and listeners hear them before the save returns.
//!
//! ## Core Concepts
//!
//! Herald watches one designated field per record type - a field whose
//! value, when present, is a member of a closed status enumeration. When
//! the host persistence framework reports that a record was **created** or
//! **updated** and that field now holds a (newly set or changed) member,
//! herald resolves a registered transition event for
//! (record type, member) and delivers it carrying the record, the new
//! member, and the previous one.
//!
//! The key principle: **missing registrations are not errors**. A
//! transition nobody registered is skipped silently, so applications roll
//! out events one enum member at a time.
//!
//! ## Architecture
//!
//! ```text
//! Host save (create / update)
//!     │
//!     ▼ notify(stage, &record)
//! ModelHooks ── Deleted / SoftDeleted / Restored ──► (never dispatches)
//!     │
//!     ▼ Created / Updated
//! StatusDispatcher.dispatch()
//!     │  field holds a member?  changed or first assignment?
//!     ▼
//! TransitionRegistry ── no entry ──► (silent skip)
//!     │
//!     ▼ factory(record, new, old)
//! EventEnvelope ──► EventSink.deliver() ──► listeners (inline)
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Dispatch is inline** - listeners run before the triggering save
//!    returns; nothing is queued, spawned, or retried
//! 2. **Only created and updated dispatch** - deletion (hard or soft) and
//!    restore never emit a status event
//! 3. **Non-member values no-op** - the designated field may hold other
//!    payloads at other lifecycle stages without error
//! 4. **Eligibility is `changed OR previously-null`** - first-time
//!    assignment fires even where host change tracking does not apply
//! 5. **Host errors pass through unchanged** - herald wraps nothing
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use herald::{
//!     BackingValue, EventBus, FieldValue, Lifecycle, ModelHooks, Status,
//!     StatusDispatcher, TrackedRecord, TransitionRegistry,
//! };
//!
//! // 1. The status enumeration stored in the designated field
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum OrderStatus {
//!     Initiated,
//!     Processing,
//! }
//!
//! impl Status for OrderStatus {
//!     fn member_name(&self) -> &'static str {
//!         match self {
//!             OrderStatus::Initiated => "INITIATED",
//!             OrderStatus::Processing => "PROCESSING",
//!         }
//!     }
//!     fn backing(&self) -> BackingValue {
//!         match self {
//!             OrderStatus::Initiated => BackingValue::Str("initiated"),
//!             OrderStatus::Processing => BackingValue::Str("processing"),
//!         }
//!     }
//! }
//!
//! // 2. The record, as the host framework presents it after a save
//! #[derive(Debug, Clone)]
//! struct Order {
//!     id: uuid::Uuid,
//!     status: Option<OrderStatus>,
//!     original_status: Option<OrderStatus>,
//!     status_written: bool,
//! }
//!
//! impl TrackedRecord for Order {
//!     fn field_name(&self) -> &str { "status" }
//!     fn current_value(&self) -> FieldValue { FieldValue::from_option(self.status) }
//!     fn previous_value(&self) -> FieldValue { FieldValue::from_option(self.original_status) }
//!     fn was_changed(&self) -> bool { self.status_written }
//! }
//!
//! // 3. The transition events and their registrations
//! #[derive(Debug, Clone)]
//! struct OrderInitiated {
//!     order: Order,
//!     new: OrderStatus,
//!     old: Option<OrderStatus>,
//! }
//!
//! let registry = TransitionRegistry::new().with_transition(
//!     OrderStatus::Initiated,
//!     |order: Order, new, old| OrderInitiated { order, new, old },
//! );
//!
//! // 4. Wire together and install on the host's lifecycle hooks
//! let bus = Arc::new(EventBus::new());
//! bus.listen(|event: &OrderInitiated| {
//!     println!("order {} initiated", event.order.id);
//! });
//!
//! let dispatcher = Arc::new(StatusDispatcher::new(registry, bus.clone()));
//! let mut hooks = ModelHooks::new();
//! StatusDispatcher::install(&dispatcher, &mut hooks);
//!
//! // 5. Host side: report completed saves
//! hooks.notify(Lifecycle::Created, &order); // listener runs inline
//! ```
//!
//! ## What This Is Not
//!
//! Herald is **not**:
//! - An event bus with durability, ordering, or retry guarantees
//! - A persistence framework (records are owned by the host)
//! - A validator of status values
//!
//! Herald **is**:
//! > A synchronous status-event layer where records report saves,
//! > registries resolve transitions, and listeners hear them before the
//! > save returns.

// Core modules
mod bus;
mod core;
mod dispatch;
mod error;
mod hooks;
mod naming;
mod record;
mod registry;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;


// Re-export core vocabulary
pub use crate::core::{BackingValue, Event, EventEnvelope, FieldValue, Status, StatusMember};

// Re-export record capabilities
pub use crate::record::{StatusWrite, TrackedRecord};

// Re-export name derivation helpers
pub use crate::naming::{base_name, event_name, pascal_case};

// Re-export the transition registry
pub use crate::registry::TransitionRegistry;

// Re-export error types
pub use crate::error::HeraldError;

// Re-export delivery types
pub use crate::bus::{EventBus, EventSink};

// Re-export lifecycle types
pub use crate::hooks::{Lifecycle, ModelHooks};

// Re-export the dispatcher (primary entry point)
pub use crate::dispatch::StatusDispatcher;
