//! Status dispatch: from a completed save to a delivered event.
//!
//! The `StatusDispatcher` owns the one routine both lifecycle stages share.
//! Given a record whose save just completed, it:
//!
//! 1. Reads the designated field's current value
//! 2. Stops silently unless the value is a status member
//! 3. Checks eligibility: the save wrote the field, **or** nothing was
//!    stored before (first-time assignment, where change tracking may not
//!    apply)
//! 4. Resolves the registered transition for (record type, member) -
//!    missing registrations stop silently
//! 5. Builds the event with (record, new member, previous member or
//!    absent) and hands it to the sink, inline
//!
//! The eligibility rule is deliberately `changed OR previously-null`: a
//! host that reports a freshly created record as both changed and
//! previously-null fires once per notification, and a host that notifies
//! creation and then an immediate update of the same value may fire twice.
//! That matches the observed behavior this crate reproduces; no
//! deduplication is layered on top.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::bus::EventSink;
use crate::core::{Status, StatusMember};
use crate::hooks::{Lifecycle, ModelHooks};
use crate::naming::event_name;
use crate::record::{AnyRecord, StatusWrite, TrackedRecord};
use crate::registry::TransitionRegistry;

/// Resolves and delivers status-transition events.
///
/// Built once at startup from a populated [`TransitionRegistry`] and a
/// sink, then installed on the host's [`ModelHooks`] and shared behind an
/// `Arc`.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(EventBus::new());
/// let dispatcher = Arc::new(StatusDispatcher::new(registry, bus.clone()));
///
/// let mut hooks = ModelHooks::new();
/// StatusDispatcher::install(&dispatcher, &mut hooks);
/// ```
pub struct StatusDispatcher {
    registry: TransitionRegistry,
    sink: Arc<dyn EventSink>,
}

impl StatusDispatcher {
    /// Create a dispatcher over a frozen registry and a sink.
    pub fn new(registry: TransitionRegistry, sink: Arc<dyn EventSink>) -> Self {
        Self { registry, sink }
    }

    /// Attach the dispatch routine to the host's lifecycle hooks.
    ///
    /// Registers on the *created* and *updated* stages only. Deletion
    /// (hard or soft) and restore never dispatch; that is policy, not an
    /// omission.
    pub fn install(dispatcher: &Arc<Self>, hooks: &mut ModelHooks) {
        for stage in [Lifecycle::Created, Lifecycle::Updated] {
            let dispatcher = Arc::clone(dispatcher);
            hooks.on_erased(
                stage,
                "status_dispatch",
                Box::new(move |record| dispatcher.dispatch_erased(record)),
            );
        }
    }

    /// Run the dispatch routine for a record whose save just completed.
    ///
    /// Hosts normally reach this through [`ModelHooks::notify`]; calling
    /// it directly is equivalent to one lifecycle notification.
    pub fn dispatch<R: TrackedRecord>(&self, record: &R) {
        self.dispatch_erased(record);
    }

    pub(crate) fn dispatch_erased(&self, record: &dyn AnyRecord) {
        let Some(new) = record.get_current().into_member() else {
            trace!(
                record = record.record_type_name(),
                field = record.get_field_name(),
                "field does not hold a status member, skipping"
            );
            return;
        };

        let previous = record.get_previous();
        if !record.get_was_changed() && !previous.is_null() {
            trace!(
                record = record.record_type_name(),
                field = record.get_field_name(),
                "field not written by this save, skipping"
            );
            return;
        }

        let Some(runner) = self.registry.resolve(record.record_type_id(), new.member_name()) else {
            debug!(
                record = record.record_type_name(),
                member = new.member_name(),
                event = %event_name(record.record_type_name(), new.member_name()),
                "no transition registered, skipping"
            );
            return;
        };

        let previous = previous.into_member();
        let Some(envelope) = runner.make(record, &new, previous.as_ref()) else {
            trace!(
                record = record.record_type_name(),
                event = %runner.event_name(),
                "transition factory declined, skipping"
            );
            return;
        };

        debug!(
            event = %envelope.name,
            new = new.member_name(),
            old = previous.as_ref().map(StatusMember::member_name),
            "dispatching status transition"
        );
        self.sink.deliver(envelope);
    }

    /// Persist `status` into the record's designated field and dispatch.
    ///
    /// The write goes through the host via [`StatusWrite::write_status`].
    /// On a successful write the shared dispatch routine runs before this
    /// returns `Ok(true)`. `Ok(false)` means the host declined to write;
    /// nothing is dispatched. Host save errors are returned unchanged.
    pub fn update_status<R, S>(&self, record: &mut R, status: S) -> anyhow::Result<bool>
    where
        R: StatusWrite,
        S: Status,
    {
        let member = StatusMember::new(status);
        let saved = record.write_status(member)?;
        if !saved {
            debug!(
                record = std::any::type_name::<R>(),
                field = record.field_name(),
                "save wrote nothing, skipping dispatch"
            );
            return Ok(false);
        }
        self.dispatch(&*record);
        Ok(true)
    }

    /// The registry this dispatcher resolves against.
    pub fn registry(&self) -> &TransitionRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for StatusDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusDispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BackingValue;
    use crate::testing::{RecordingSink, StubRecord};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum ReviewState {
        Submitted,
        Approved,
    }

    impl Status for ReviewState {
        fn member_name(&self) -> &'static str {
            match self {
                ReviewState::Submitted => "SUBMITTED",
                ReviewState::Approved => "APPROVED",
            }
        }

        fn backing(&self) -> BackingValue {
            match self {
                ReviewState::Submitted => BackingValue::Str("submitted"),
                ReviewState::Approved => BackingValue::Str("approved"),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct ReviewSubmitted {
        new: ReviewState,
        old: Option<ReviewState>,
    }

    fn registry() -> TransitionRegistry {
        TransitionRegistry::new().with_transition(
            ReviewState::Submitted,
            |_record: StubRecord, new, old| ReviewSubmitted { new, old },
        )
    }

    fn dispatcher() -> (StatusDispatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (StatusDispatcher::new(registry(), sink.clone()), sink)
    }

    #[test]
    fn test_changed_member_dispatches() {
        let (dispatcher, sink) = dispatcher();
        let record = StubRecord::new("state")
            .with_status(ReviewState::Submitted)
            .with_previous(ReviewState::Approved)
            .changed(true);

        dispatcher.dispatch(&record);

        assert_eq!(sink.count(), 1);
        assert_eq!(sink.names(), vec!["StubRecordSubmitted"]);
        let envelopes = sink.envelopes();
        let event = envelopes[0].downcast_ref::<ReviewSubmitted>().unwrap();
        assert_eq!(event.new, ReviewState::Submitted);
        assert_eq!(event.old, Some(ReviewState::Approved));
    }

    #[test]
    fn test_first_assignment_dispatches_with_absent_old() {
        let (dispatcher, sink) = dispatcher();
        // Fresh insert: change tracking may not apply, previous is null.
        let record = StubRecord::new("state")
            .with_status(ReviewState::Submitted)
            .changed(false);

        dispatcher.dispatch(&record);

        assert_eq!(sink.count(), 1);
        let envelopes = sink.envelopes();
        let event = envelopes[0].downcast_ref::<ReviewSubmitted>().unwrap();
        assert_eq!(event.old, None);
    }

    #[test]
    fn test_unchanged_field_with_stored_previous_skips() {
        let (dispatcher, sink) = dispatcher();
        let record = StubRecord::new("state")
            .with_status(ReviewState::Submitted)
            .with_previous(ReviewState::Submitted)
            .changed(false);

        dispatcher.dispatch(&record);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_null_field_skips() {
        let (dispatcher, sink) = dispatcher();
        let record = StubRecord::new("state").changed(true);

        dispatcher.dispatch(&record);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_non_member_field_skips() {
        let (dispatcher, sink) = dispatcher();
        let record = StubRecord::new("state")
            .with_other("just a string".to_string())
            .changed(true);

        dispatcher.dispatch(&record);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_unregistered_member_skips() {
        let (dispatcher, sink) = dispatcher();
        let record = StubRecord::new("state")
            .with_status(ReviewState::Approved)
            .changed(true);

        dispatcher.dispatch(&record);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_non_member_previous_maps_to_absent_old() {
        let (dispatcher, sink) = dispatcher();
        let record = StubRecord::new("state")
            .with_status(ReviewState::Submitted)
            .with_previous_other(17u32)
            .changed(true);

        dispatcher.dispatch(&record);

        assert_eq!(sink.count(), 1);
        let envelopes = sink.envelopes();
        assert_eq!(envelopes[0].downcast_ref::<ReviewSubmitted>().unwrap().old, None);
    }

    #[test]
    fn test_update_status_saves_then_dispatches() {
        let (dispatcher, sink) = dispatcher();
        let mut record = StubRecord::new("state").with_status(ReviewState::Approved);

        let saved = dispatcher.update_status(&mut record, ReviewState::Submitted).unwrap();

        assert!(saved);
        assert_eq!(sink.count(), 1);
        let envelopes = sink.envelopes();
        let event = envelopes[0].downcast_ref::<ReviewSubmitted>().unwrap();
        assert_eq!(event.new, ReviewState::Submitted);
        assert_eq!(event.old, Some(ReviewState::Approved));
    }

    #[test]
    fn test_update_status_propagates_save_failure_without_dispatch() {
        let (dispatcher, sink) = dispatcher();
        let mut record = StubRecord::new("state").failing_save("connection lost");

        let err = dispatcher
            .update_status(&mut record, ReviewState::Submitted)
            .unwrap_err();

        assert!(err.to_string().contains("connection lost"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_update_status_rejected_save_skips_dispatch() {
        let (dispatcher, sink) = dispatcher();
        let mut record = StubRecord::new("state").rejecting_save();

        let saved = dispatcher.update_status(&mut record, ReviewState::Submitted).unwrap();

        assert!(!saved);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_install_attaches_created_and_updated_only() {
        let (dispatcher, _sink) = dispatcher();
        let dispatcher = Arc::new(dispatcher);
        let mut hooks = ModelHooks::new();

        StatusDispatcher::install(&dispatcher, &mut hooks);

        assert_eq!(hooks.observer_count(Lifecycle::Created), 1);
        assert_eq!(hooks.observer_count(Lifecycle::Updated), 1);
        assert_eq!(hooks.observer_count(Lifecycle::Deleted), 0);
        assert_eq!(hooks.observer_count(Lifecycle::SoftDeleted), 0);
        assert_eq!(hooks.observer_count(Lifecycle::Restored), 0);
    }

    #[test]
    fn test_registry_accessor() {
        let (dispatcher, _) = dispatcher();
        assert!(dispatcher.registry().contains::<StubRecord, _>(&ReviewState::Submitted));
    }
}
