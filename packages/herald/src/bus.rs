//! Synchronous event delivery.
//!
//! # Guarantees
//!
//! - **Inline delivery**: listeners run on the caller's stack, before the
//!   triggering save returns
//! - **In-memory only**: nothing is persisted or retried
//! - **Registration order**: listeners for one event type run in the order
//!   they were added
//!
//! Hosts that already have an event bus implement [`EventSink`] and adapt
//! delivery to it. [`EventBus`] is the minimal in-crate sink for hosts
//! without one - a per-type listener table invoked inline.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::core::{Event, EventEnvelope};

/// Synchronous delivery contract towards the host's event facility.
///
/// `deliver` must hand the envelope to all interested listeners before
/// returning; the save operation that triggered the dispatch is still on
/// the stack below it.
pub trait EventSink: Send + Sync {
    /// Deliver one envelope to registered listeners.
    fn deliver(&self, event: EventEnvelope);
}

/// One registered listener: downcasts the payload and runs.
struct ListenerRunner {
    run: Box<dyn Fn(&EventEnvelope) + Send + Sync>,
}

/// Minimal synchronous event bus.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(EventBus::new());
///
/// bus.listen(|event: &OrderInitiated| {
///     println!("order {} initiated", event.order.id);
/// });
///
/// // Delivery happens inline; by the time deliver returns, every
/// // matching listener has run.
/// bus.deliver(envelope);
/// ```
#[derive(Default)]
pub struct EventBus {
    listeners: DashMap<TypeId, Vec<Arc<ListenerRunner>>>,
}

impl EventBus {
    /// Create a new bus with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
        }
    }

    /// Register a listener for event type `E`.
    ///
    /// Listeners must not register further listeners from inside a
    /// delivery; registration and delivery contend on the same table.
    pub fn listen<E, F>(&self, listener: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let runner = ListenerRunner {
            run: Box::new(move |envelope| {
                if let Some(event) = envelope.downcast_ref::<E>() {
                    listener(event);
                }
            }),
        };
        self.listeners
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Arc::new(runner));
    }

    /// Number of registered listeners across all event types.
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().map(|entry| entry.value().len()).sum()
    }
}

impl EventSink for EventBus {
    fn deliver(&self, event: EventEnvelope) {
        // Clone the runner list out so listeners run without holding the
        // table shard.
        let runners: Vec<Arc<ListenerRunner>> = match self.listeners.get(&event.type_id) {
            Some(entry) => entry.value().clone(),
            None => return,
        };
        for runner in runners {
            (runner.run)(&event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}
