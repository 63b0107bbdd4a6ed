//! Testing utilities for status dispatch.
//!
//! # Feature Flag
//!
//! This module is available in this crate's own tests and, for downstream
//! crates, with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! herald = { version = "0.1", features = ["testing"] }
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use herald::testing::{EventProbe, StubRecord};
//!
//! let bus = Arc::new(EventBus::new());
//! let probe = EventProbe::<OrderInitiated>::attached(&bus);
//!
//! hooks.notify(Lifecycle::Created, &order);
//!
//! assert_eq!(probe.count(), 1);
//! assert!(probe.events()[0].old.is_none());
//! ```

use std::any::Any;
use std::sync::{Arc, Mutex};

use anyhow::bail;
use uuid::Uuid;

use crate::bus::{EventBus, EventSink};
use crate::core::{Event, EventEnvelope, FieldValue, Status, StatusMember};
use crate::record::{StatusWrite, TrackedRecord};

/// Typed capture of events delivered through an [`EventBus`].
///
/// Attach one probe per event type under test; delivery is synchronous, so
/// captured events are visible as soon as the triggering call returns.
pub struct EventProbe<E: Event + Clone> {
    seen: Arc<Mutex<Vec<E>>>,
}

impl<E: Event + Clone> EventProbe<E> {
    /// Create a probe and register it on the bus.
    pub fn attached(bus: &EventBus) -> Self {
        let probe = Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let seen = probe.seen.clone();
        bus.listen(move |event: &E| seen.lock().unwrap().push(event.clone()));
        probe
    }

    /// Number of captured events.
    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Returns true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Clone out everything captured so far.
    pub fn events(&self) -> Vec<E> {
        self.seen.lock().unwrap().clone()
    }

    /// Drain the captured events.
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

/// An [`EventSink`] that records every delivered envelope.
///
/// Useful when a test cares about delivery itself (count, derived names)
/// rather than one concrete event type.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<EventEnvelope>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Number of delivered envelopes.
    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    /// Returns true if nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Derived names of everything delivered, in order.
    pub fn names(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.name.to_string())
            .collect()
    }

    /// Clone out the delivered envelopes.
    pub fn envelopes(&self) -> Vec<EventEnvelope> {
        self.delivered.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn deliver(&self, event: EventEnvelope) {
        self.delivered.lock().unwrap().push(event);
    }
}

/// A configurable in-memory record for exercising the dispatch path.
///
/// The builder methods set up the post-save picture a host would present:
/// what the designated field holds now, what was stored before, and
/// whether the save wrote it. [`StatusWrite`] is implemented the way a
/// well-behaved host would: a successful write moves the current value to
/// previous, stores the member, and marks the field changed.
#[derive(Debug, Clone)]
pub struct StubRecord {
    /// Fixture identity, for event payload assertions.
    pub id: Uuid,
    field: &'static str,
    current: FieldValue,
    previous: FieldValue,
    changed: bool,
    fail_message: Option<&'static str>,
    reject_save: bool,
}

impl StubRecord {
    /// Create a record whose designated field is `field`, currently null.
    pub fn new(field: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            field,
            current: FieldValue::Null,
            previous: FieldValue::Null,
            changed: false,
            fail_message: None,
            reject_save: false,
        }
    }

    /// Set the current value to a status member.
    pub fn with_status<S: Status>(mut self, status: S) -> Self {
        self.current = FieldValue::member(status);
        self
    }

    /// Set the current value to a non-status payload.
    pub fn with_other<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.current = FieldValue::other(value);
        self
    }

    /// Set the previously stored value to a status member.
    pub fn with_previous<S: Status>(mut self, status: S) -> Self {
        self.previous = FieldValue::member(status);
        self
    }

    /// Set the previously stored value to a non-status payload.
    pub fn with_previous_other<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.previous = FieldValue::other(value);
        self
    }

    /// Set whether the save wrote the designated field.
    pub fn changed(mut self, changed: bool) -> Self {
        self.changed = changed;
        self
    }

    /// Make `write_status` fail with the given message.
    pub fn failing_save(mut self, message: &'static str) -> Self {
        self.fail_message = Some(message);
        self
    }

    /// Make `write_status` report that nothing was written.
    pub fn rejecting_save(mut self) -> Self {
        self.reject_save = true;
        self
    }
}

impl TrackedRecord for StubRecord {
    fn field_name(&self) -> &str {
        self.field
    }

    fn current_value(&self) -> FieldValue {
        self.current.clone()
    }

    fn previous_value(&self) -> FieldValue {
        self.previous.clone()
    }

    fn was_changed(&self) -> bool {
        self.changed
    }
}

impl StatusWrite for StubRecord {
    fn write_status(&mut self, member: StatusMember) -> anyhow::Result<bool> {
        if let Some(message) = self.fail_message {
            bail!(message);
        }
        if self.reject_save {
            return Ok(false);
        }
        self.previous = std::mem::replace(&mut self.current, FieldValue::Member(member));
        self.changed = true;
        Ok(true)
    }
}
