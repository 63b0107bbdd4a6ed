//! Transition registry mapping (record type, member) to event factories.
//!
//! The registry is populated once at startup and frozen inside the
//! dispatcher. Each entry pairs a lookup key - the record's `TypeId` plus
//! the member's symbolic name - with a factory that builds the concrete
//! event from (record, new member, previous member). A key with no entry
//! means "no event for this transition", which is a supported state, not a
//! failure: applications add transitions one member at a time.
//!
//! # Example
//!
//! ```ignore
//! let registry = TransitionRegistry::new()
//!     .with_transition(OrderStatus::Initiated, |order: Order, new, old| {
//!         OrderInitiated { order, new, old }
//!     })
//!     .with_transition(OrderStatus::Processing, |order: Order, new, old| {
//!         OrderProcessing { order, new, old }
//!     });
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::core::{Event, EventEnvelope, Status, StatusMember};
use crate::error::HeraldError;
use crate::naming::event_name;
use crate::record::{AnyRecord, TrackedRecord};

type FactoryFn =
    Box<dyn Fn(&dyn AnyRecord, &StatusMember, Option<&StatusMember>) -> Option<EventEnvelope> + Send + Sync>;

/// One registered transition: the derived event name plus the factory that
/// restores concrete types and builds the event.
pub(crate) struct TransitionRunner {
    event_name: Arc<str>,
    make: FactoryFn,
}

impl TransitionRunner {
    /// Derived event name of this registration.
    pub(crate) fn event_name(&self) -> &Arc<str> {
        &self.event_name
    }

    /// Build the event envelope, or `None` when the runtime types do not
    /// match the registered ones.
    pub(crate) fn make(
        &self,
        record: &dyn AnyRecord,
        new: &StatusMember,
        old: Option<&StatusMember>,
    ) -> Option<EventEnvelope> {
        (self.make)(record, new, old)
    }
}

impl fmt::Debug for TransitionRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRunner")
            .field("event_name", &self.event_name)
            .finish_non_exhaustive()
    }
}

/// Registry of transition event factories.
///
/// Keys are (record `TypeId`, member symbolic name). Registration is typed;
/// lookup and invocation are type-erased. Build the registry at startup,
/// then hand it to [`StatusDispatcher::new`](crate::StatusDispatcher::new).
#[derive(Default)]
pub struct TransitionRegistry {
    entries: HashMap<(TypeId, &'static str), TransitionRunner>,
}

impl TransitionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a transition event factory (builder style).
    ///
    /// `make` receives the record, the new member, and the previous member
    /// when one of the same enum type was stored. Annotate the record
    /// parameter so the key can be inferred:
    ///
    /// ```ignore
    /// registry.with_transition(OrderStatus::Initiated, |order: Order, new, old| {
    ///     OrderInitiated { order, new, old }
    /// })
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if a transition is already registered for this
    /// (record type, member) pair. Use [`TransitionRegistry::try_register`]
    /// for a non-panicking version.
    pub fn with_transition<R, S, E, F>(mut self, member: S, make: F) -> Self
    where
        R: TrackedRecord + Clone,
        S: Status + Clone,
        E: Event,
        F: Fn(R, S, Option<S>) -> E + Send + Sync + 'static,
    {
        if let Err(e) = self.try_register(member, make) {
            panic!("{}", e);
        }
        self
    }

    /// Register a transition event factory, erroring on duplicates.
    pub fn try_register<R, S, E, F>(&mut self, member: S, make: F) -> Result<(), HeraldError>
    where
        R: TrackedRecord + Clone,
        S: Status + Clone,
        E: Event,
        F: Fn(R, S, Option<S>) -> E + Send + Sync + 'static,
    {
        let member_name = member.member_name();
        let key = (TypeId::of::<R>(), member_name);
        let name: Arc<str> = event_name(std::any::type_name::<R>(), member_name).into();

        if self.entries.contains_key(&key) {
            return Err(HeraldError::TransitionAlreadyRegistered {
                event_name: name.to_string(),
            });
        }

        let label = name.clone();
        let factory: FactoryFn = Box::new(move |record, new, old| {
            let Some(record) = record.as_any().downcast_ref::<R>() else {
                trace!(event = %label, "record type mismatch, skipping");
                return None;
            };
            let Some(new) = new.downcast_ref::<S>() else {
                trace!(event = %label, "member type mismatch, skipping");
                return None;
            };
            // A previous value of a different enum type has no typed slot
            // in the event; it maps to absent.
            let old = old.and_then(|m| m.downcast_ref::<S>()).cloned();
            let event = make(record.clone(), new.clone(), old);
            Some(EventEnvelope::new(label.clone(), event))
        });

        self.entries.insert(
            key,
            TransitionRunner {
                event_name: name,
                make: factory,
            },
        );
        Ok(())
    }

    /// Look up the runner for (record type, member name).
    pub(crate) fn resolve(&self, record_type: TypeId, member_name: &'static str) -> Option<&TransitionRunner> {
        self.entries.get(&(record_type, member_name))
    }

    /// Whether a transition is registered for record type `R` and `member`.
    pub fn contains<R: TrackedRecord, S: Status>(&self, member: &S) -> bool {
        self.entries.contains_key(&(TypeId::of::<R>(), member.member_name()))
    }

    /// Number of registered transitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no registrations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRegistry")
            .field("transition_count", &self.entries.len())
            .finish()
    }
}
