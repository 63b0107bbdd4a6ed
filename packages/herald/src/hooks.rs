//! Lifecycle hook registration and notification.
//!
//! The host persistence framework owns the save lifecycle; herald only
//! listens to it. [`ModelHooks`] is the registration point: the host calls
//! [`ModelHooks::notify`] after each completed transition, and observers
//! registered for that stage run synchronously, in registration order.
//!
//! Observers are per-record-type: a closure registered for `Order` is
//! skipped when a `Shipment` is notified. The status dispatcher installs
//! itself type-agnostically on the *created* and *updated* stages only -
//! deletion (hard or soft) and restore never feed the dispatch routine.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;
use tracing::trace;

use crate::record::{AnyRecord, TrackedRecord};

/// Save-lifecycle stages a host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// The record was inserted.
    Created,
    /// An existing record was written.
    Updated,
    /// The record was removed from storage.
    Deleted,
    /// The record was flagged deleted but kept in storage.
    SoftDeleted,
    /// A soft-deleted record was brought back.
    Restored,
}

impl Lifecycle {
    /// Returns true for the deletion stages (hard or soft).
    pub fn is_deletion(&self) -> bool {
        matches!(self, Lifecycle::Deleted | Lifecycle::SoftDeleted)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Lifecycle::Created => "created",
            Lifecycle::Updated => "updated",
            Lifecycle::Deleted => "deleted",
            Lifecycle::SoftDeleted => "soft_deleted",
            Lifecycle::Restored => "restored",
        };
        f.write_str(s)
    }
}

type Observer = Box<dyn Fn(&dyn AnyRecord) + Send + Sync>;

struct HookRunner {
    stage: Lifecycle,
    name: &'static str,
    run: Observer,
}

/// Registration point for lifecycle observers.
///
/// Built once at startup (registration takes `&mut self`), then driven by
/// the host with `&self` notifications.
///
/// # Example
///
/// ```ignore
/// let mut hooks = ModelHooks::new();
/// StatusDispatcher::install(&dispatcher, &mut hooks);
/// hooks.on_created(|order: &Order| info!(id = %order.id, "order stored"));
///
/// // Host side, after a successful insert:
/// hooks.notify(Lifecycle::Created, &order);
/// ```
#[derive(Default)]
pub struct ModelHooks {
    observers: SmallVec<[HookRunner; 4]>,
}

impl ModelHooks {
    /// Create a registration point with no observers.
    pub fn new() -> Self {
        Self {
            observers: SmallVec::new(),
        }
    }

    /// Register an observer for records of type `R` at `stage`.
    pub fn on<R, F>(&mut self, stage: Lifecycle, observer: F)
    where
        R: TrackedRecord,
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.observers.push(HookRunner {
            stage,
            name: std::any::type_name::<R>(),
            run: Box::new(move |record| {
                if let Some(record) = record.as_any().downcast_ref::<R>() {
                    observer(record);
                }
            }),
        });
    }

    /// Register an observer for the created stage.
    pub fn on_created<R, F>(&mut self, observer: F)
    where
        R: TrackedRecord,
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.on(Lifecycle::Created, observer);
    }

    /// Register an observer for the updated stage.
    pub fn on_updated<R, F>(&mut self, observer: F)
    where
        R: TrackedRecord,
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.on(Lifecycle::Updated, observer);
    }

    /// Register a type-agnostic observer (dispatcher installation).
    pub(crate) fn on_erased(&mut self, stage: Lifecycle, name: &'static str, run: Observer) {
        self.observers.push(HookRunner { stage, name, run });
    }

    /// Report a completed lifecycle transition.
    ///
    /// Observers registered for `stage` run synchronously in registration
    /// order before this returns.
    pub fn notify<R: TrackedRecord>(&self, stage: Lifecycle, record: &R) {
        self.notify_erased(stage, record);
    }

    fn notify_erased(&self, stage: Lifecycle, record: &dyn AnyRecord) {
        trace!(%stage, record = record.record_type_name(), "lifecycle notification");
        for runner in &self.observers {
            if runner.stage == stage {
                (runner.run)(record);
            }
        }
    }

    /// Number of observers registered for `stage`.
    pub fn observer_count(&self, stage: Lifecycle) -> usize {
        self.observers.iter().filter(|r| r.stage == stage).count()
    }
}

impl fmt::Debug for ModelHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHooks")
            .field("observer_count", &self.observers.len())
            .field(
                "observers",
                &self.observers.iter().map(|r| (r.stage, r.name)).collect::<Vec<_>>(),
            )
            .finish()
    }
}
