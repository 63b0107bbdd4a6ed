//! Record capability traits.
//!
//! A record is anything the host framework persists. Herald never owns a
//! record's identity or lifecycle; it only reads four things after a save:
//! the designated field's name, its current value, its previously stored
//! value, and whether the save touched it. [`TrackedRecord`] is that
//! capability set, and [`StatusWrite`] adds the one mutation herald ever
//! performs - persisting a member through the host's own save path.

use std::any::{Any, TypeId};

use crate::core::{FieldValue, StatusMember};

/// A persistent record with one designated status field.
///
/// The host framework implements this for any record type that should emit
/// transition events. All four capabilities describe the state *after* the
/// save that triggered the lifecycle notification.
///
/// # Example
///
/// ```ignore
/// impl TrackedRecord for Order {
///     fn field_name(&self) -> &str {
///         "status"
///     }
///
///     fn current_value(&self) -> FieldValue {
///         FieldValue::from_option(self.status.clone())
///     }
///
///     fn previous_value(&self) -> FieldValue {
///         FieldValue::from_option(self.previous_status.clone())
///     }
///
///     fn was_changed(&self) -> bool {
///         self.status_dirty
///     }
/// }
/// ```
pub trait TrackedRecord: Any + Send + Sync {
    /// Name of the designated field, used in logs and diagnostics.
    fn field_name(&self) -> &str;

    /// The designated field's value as of the completed save.
    fn current_value(&self) -> FieldValue;

    /// The value stored before the save, `FieldValue::Null` if none.
    fn previous_value(&self) -> FieldValue;

    /// Whether the completed save wrote the designated field.
    fn was_changed(&self) -> bool;
}

/// A record whose designated field herald may write through the host.
///
/// This is the capability behind
/// [`StatusDispatcher::update_status`](crate::StatusDispatcher::update_status):
/// persist one member into the designated field using the host's normal
/// save machinery.
pub trait StatusWrite: TrackedRecord {
    /// Persist `member` into the designated field.
    ///
    /// Returns `Ok(true)` when the save wrote, `Ok(false)` when the host
    /// declined to write (e.g. nothing to do), and an error when the save
    /// failed. Errors are propagated to the caller unchanged; herald adds
    /// no wrapping.
    fn write_status(&mut self, member: StatusMember) -> anyhow::Result<bool>;
}

/// Type-erased record trait for internal use.
///
/// Automatically implemented for every [`TrackedRecord`]. Observer and
/// factory runners receive this and downcast back to the concrete type.
pub(crate) trait AnyRecord: Send + Sync {
    fn get_field_name(&self) -> &str;
    fn get_current(&self) -> FieldValue;
    fn get_previous(&self) -> FieldValue;
    fn get_was_changed(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn record_type_name(&self) -> &'static str;
    fn record_type_id(&self) -> TypeId;
}

impl<R: TrackedRecord> AnyRecord for R {
    fn get_field_name(&self) -> &str {
        TrackedRecord::field_name(self)
    }

    fn get_current(&self) -> FieldValue {
        TrackedRecord::current_value(self)
    }

    fn get_previous(&self) -> FieldValue {
        TrackedRecord::previous_value(self)
    }

    fn get_was_changed(&self) -> bool {
        TrackedRecord::was_changed(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn record_type_name(&self) -> &'static str {
        std::any::type_name::<R>()
    }

    fn record_type_id(&self) -> TypeId {
        TypeId::of::<R>()
    }
}
