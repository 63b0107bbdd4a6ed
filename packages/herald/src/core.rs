//! Core vocabulary for status tracking and event transport.
//!
//! # Overview
//!
//! Herald separates **values** from **events**:
//! - [`Status`] = a member of a closed, named enumeration stored in a
//!   record's designated field
//! - [`Event`] = the payload delivered to listeners when that field
//!   transitions
//!
//! A record's designated field is read as a [`FieldValue`]: it may be
//! empty, hold a status member, or hold anything else. Only status members
//! ever produce events; everything else is ignored without error, so the
//! same field can carry arbitrary payloads at other lifecycle stages.
//!
//! # Type Erasure
//!
//! Concrete status enums and event types stay in application code. Herald
//! moves them through [`StatusMember`] and [`EventEnvelope`], which erase
//! the concrete type behind `Arc<dyn Any>` and restore it by downcast at
//! the edges - the same shape the listener and registry runners use.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The value a status member carries in storage.
///
/// Mirrors the two backing representations a closed enumeration can have:
/// an integer discriminant or a string constant. This is the value a host
/// would find in the database column, not the symbolic member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum BackingValue {
    /// Integer-backed member.
    Int(i64),
    /// String-backed member.
    Str(&'static str),
}

impl fmt::Display for BackingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackingValue::Int(v) => write!(f, "{}", v),
            BackingValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// A member of a closed status enumeration.
///
/// Implement this for the enum stored in a record's designated field.
/// Members expose two things: a stable symbolic name (used to key
/// transition registrations and to derive event names) and the backing
/// value persisted by the host.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// enum OrderStatus {
///     Initiated,
///     Processing,
/// }
///
/// impl Status for OrderStatus {
///     fn member_name(&self) -> &'static str {
///         match self {
///             OrderStatus::Initiated => "INITIATED",
///             OrderStatus::Processing => "PROCESSING",
///         }
///     }
///
///     fn backing(&self) -> BackingValue {
///         match self {
///             OrderStatus::Initiated => BackingValue::Str("initiated"),
///             OrderStatus::Processing => BackingValue::Str("processing"),
///         }
///     }
/// }
/// ```
pub trait Status: Any + Send + Sync + fmt::Debug {
    /// Stable symbolic name of this member (e.g. `"INITIATED"`).
    ///
    /// Must not change once transitions are registered against it.
    fn member_name(&self) -> &'static str;

    /// The value this member carries in storage.
    fn backing(&self) -> BackingValue;
}

/// Type-erased status trait for internal use.
///
/// Automatically implemented for every [`Status`] type.
pub(crate) trait AnyStatus: fmt::Debug + Send + Sync {
    fn get_member_name(&self) -> &'static str;
    fn get_backing(&self) -> BackingValue;
    fn as_any(&self) -> &dyn Any;
}

impl<S: Status> AnyStatus for S {
    fn get_member_name(&self) -> &'static str {
        Status::member_name(self)
    }

    fn get_backing(&self) -> BackingValue {
        Status::backing(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A cloneable, type-erased handle to one status member.
///
/// `StatusMember` is how member values travel through the dispatch path
/// without the dispatcher knowing the concrete enum. Registered factories
/// downcast back to the concrete type via [`StatusMember::downcast_ref`].
#[derive(Clone)]
pub struct StatusMember(Arc<dyn AnyStatus>);

impl StatusMember {
    /// Wrap a concrete status member.
    pub fn new<S: Status>(status: S) -> Self {
        Self(Arc::new(status))
    }

    /// The member's stable symbolic name.
    pub fn member_name(&self) -> &'static str {
        self.0.get_member_name()
    }

    /// The member's backing value.
    pub fn backing(&self) -> BackingValue {
        self.0.get_backing()
    }

    /// Check whether this member is of the concrete enum type `S`.
    pub fn is<S: Status>(&self) -> bool {
        self.0.as_any().is::<S>()
    }

    /// Downcast to the concrete enum type.
    pub fn downcast_ref<S: Status>(&self) -> Option<&S> {
        self.0.as_any().downcast_ref()
    }

    /// TypeId of the concrete enum behind this handle.
    pub(crate) fn enum_type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }
}

impl fmt::Debug for StatusMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for StatusMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.member_name())
    }
}

impl PartialEq for StatusMember {
    fn eq(&self, other: &Self) -> bool {
        self.enum_type_id() == other.enum_type_id() && self.member_name() == other.member_name()
    }
}

impl Eq for StatusMember {}

/// The value of a record's designated field.
///
/// Hosts produce this from their attribute storage. Only the
/// [`FieldValue::Member`] variant can trigger dispatch; `Null` and `Other`
/// are observed and skipped silently.
#[derive(Clone)]
pub enum FieldValue {
    /// No value stored.
    Null,
    /// A member of a closed status enumeration.
    Member(StatusMember),
    /// Any other attribute payload (plain strings, numbers, structures).
    Other(Arc<dyn Any + Send + Sync>),
}

impl FieldValue {
    /// Wrap a concrete status member.
    pub fn member<S: Status>(status: S) -> Self {
        FieldValue::Member(StatusMember::new(status))
    }

    /// Wrap a non-status payload.
    pub fn other<T: Any + Send + Sync>(value: T) -> Self {
        FieldValue::Other(Arc::new(value))
    }

    /// Build from an optional member, mapping `None` to `Null`.
    pub fn from_option<S: Status>(status: Option<S>) -> Self {
        match status {
            Some(s) => Self::member(s),
            None => FieldValue::Null,
        }
    }

    /// Returns true if no value is stored.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Borrow the status member, if that is what the field holds.
    pub fn as_member(&self) -> Option<&StatusMember> {
        match self {
            FieldValue::Member(m) => Some(m),
            _ => None,
        }
    }

    /// Take the status member, dropping anything else.
    pub fn into_member(self) -> Option<StatusMember> {
        match self {
            FieldValue::Member(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Member(m) => f.debug_tuple("Member").field(m).finish(),
            FieldValue::Other(_) => f.write_str("Other(..)"),
        }
    }
}

/// An event payload.
///
/// **Note**: This trait is automatically implemented for any type that is
/// `Clone + Send + Sync + 'static`. You don't need to implement it
/// manually.
pub trait Event: Any + Send + Sync + 'static {}

// Blanket implementation for any type that meets the requirements
impl<T: Clone + Send + Sync + 'static> Event for T {}

/// Envelope wrapping a constructed transition event.
///
/// `EventEnvelope` is the transport format handed to the sink. It carries:
/// - The derived event name (for logs and diagnostics)
/// - The type ID of the payload for listener filtering
/// - The event payload itself
/// - When the transition was observed
#[derive(Clone)]
pub struct EventEnvelope {
    /// Derived event name, e.g. `"OrderInitiated"`.
    pub name: Arc<str>,
    /// Type ID of the payload event.
    pub type_id: TypeId,
    /// The actual event payload.
    pub payload: Arc<dyn Any + Send + Sync>,
    /// When the transition was observed.
    pub occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// Create a new envelope around an event payload.
    pub fn new<E: Event>(name: impl Into<Arc<str>>, event: E) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::of::<E>(),
            payload: Arc::new(event),
            occurred_at: Utc::now(),
        }
    }

    /// Downcast the payload to a concrete event type.
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.payload.downcast_ref()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("occurred_at", &self.occurred_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TicketState {
        Open,
        Closed,
    }

    impl Status for TicketState {
        fn member_name(&self) -> &'static str {
            match self {
                TicketState::Open => "OPEN",
                TicketState::Closed => "CLOSED",
            }
        }

        fn backing(&self) -> BackingValue {
            match self {
                TicketState::Open => BackingValue::Str("open"),
                TicketState::Closed => BackingValue::Str("closed"),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Severity {
        Low,
    }

    impl Status for Severity {
        fn member_name(&self) -> &'static str {
            "LOW"
        }

        fn backing(&self) -> BackingValue {
            BackingValue::Int(1)
        }
    }

    #[test]
    fn test_member_exposes_name_and_backing() {
        let member = StatusMember::new(TicketState::Open);
        assert_eq!(member.member_name(), "OPEN");
        assert_eq!(member.backing(), BackingValue::Str("open"));
    }

    #[test]
    fn test_member_downcast() {
        let member = StatusMember::new(TicketState::Closed);
        assert!(member.is::<TicketState>());
        assert!(!member.is::<Severity>());
        assert_eq!(member.downcast_ref::<TicketState>(), Some(&TicketState::Closed));
        assert!(member.downcast_ref::<Severity>().is_none());
    }

    #[test]
    fn test_member_equality_requires_same_enum() {
        let a = StatusMember::new(TicketState::Open);
        let b = StatusMember::new(TicketState::Open);
        let c = StatusMember::new(TicketState::Closed);
        assert_eq!(a, b);
        assert_ne!(a, c);

        // Same member name on a different enum is a different member.
        #[derive(Debug, Clone)]
        struct OtherOpen;
        impl Status for OtherOpen {
            fn member_name(&self) -> &'static str {
                "OPEN"
            }
            fn backing(&self) -> BackingValue {
                BackingValue::Str("open")
            }
        }
        assert_ne!(a, StatusMember::new(OtherOpen));
    }

    #[test]
    fn test_backing_value_display() {
        assert_eq!(BackingValue::Str("open").to_string(), "open");
        assert_eq!(BackingValue::Int(7).to_string(), "7");
    }

    #[test]
    fn test_backing_value_serializes_as_raw_column_value() {
        let s = serde_json::to_string(&BackingValue::Str("initiated")).unwrap();
        assert_eq!(s, "\"initiated\"");
        let i = serde_json::to_string(&BackingValue::Int(3)).unwrap();
        assert_eq!(i, "3");
    }

    #[test]
    fn test_field_value_member() {
        let value = FieldValue::member(TicketState::Open);
        assert!(!value.is_null());
        assert_eq!(value.as_member().unwrap().member_name(), "OPEN");
        assert!(value.into_member().is_some());
    }

    #[test]
    fn test_field_value_null_and_other() {
        assert!(FieldValue::Null.is_null());
        assert!(FieldValue::Null.as_member().is_none());

        let other = FieldValue::other("just a string".to_string());
        assert!(!other.is_null());
        assert!(other.as_member().is_none());
        assert!(other.into_member().is_none());
    }

    #[test]
    fn test_field_value_from_option() {
        assert!(FieldValue::from_option::<TicketState>(None).is_null());
        let v = FieldValue::from_option(Some(TicketState::Closed));
        assert_eq!(v.as_member().unwrap().member_name(), "CLOSED");
    }

    #[test]
    fn test_envelope_carries_name_and_payload() {
        #[derive(Debug, Clone, PartialEq)]
        struct TicketOpened {
            id: u64,
        }

        let envelope = EventEnvelope::new("TicketOpened", TicketOpened { id: 9 });
        assert_eq!(&*envelope.name, "TicketOpened");
        assert_eq!(envelope.type_id, TypeId::of::<TicketOpened>());
        assert_eq!(envelope.downcast_ref::<TicketOpened>(), Some(&TicketOpened { id: 9 }));
        assert!(envelope.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_envelope_debug() {
        let envelope = EventEnvelope::new("X", 1u32);
        let debug = format!("{:?}", envelope);
        assert!(debug.contains("EventEnvelope"));
        assert!(debug.contains("name"));
    }
}
