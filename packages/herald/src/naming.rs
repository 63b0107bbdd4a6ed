//! Derived event names.
//!
//! Transition events are labelled `<RecordBaseName><PascalCasedMember>`:
//! the record's type name with its module path stripped, followed by the
//! member's symbolic name in Pascal case. `Order` + `INITIATED` becomes
//! `OrderInitiated`; `Shipment` + `IN_TRANSIT` becomes
//! `ShipmentInTransit`. The name is a label carried on envelopes, registry
//! entries, and log lines - lookup itself is by type, not by name.

/// Strip module qualification (and any generic argument list) from a Rust
/// type path.
pub fn base_name(type_path: &str) -> &str {
    let path = type_path.split('<').next().unwrap_or(type_path);
    path.rsplit("::").next().unwrap_or(path)
}

/// Pascal-case a symbolic member name.
///
/// The name is lower-cased, split on `_`, `-`, and spaces, and each
/// segment is capitalized: `INITIATED` becomes `Initiated`,
/// `COMPLEX_ENUM_NAME` becomes `ComplexEnumName`.
pub fn pascal_case(member_name: &str) -> String {
    member_name
        .to_lowercase()
        .split(['_', '-', ' '])
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

/// Derived event name for (record type path, member name).
pub fn event_name(type_path: &str, member_name: &str) -> String {
    format!("{}{}", base_name(type_path), pascal_case(member_name))
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_module_path() {
        assert_eq!(base_name("my_app::orders::Order"), "Order");
        assert_eq!(base_name("Order"), "Order");
    }

    #[test]
    fn test_base_name_strips_generics() {
        assert_eq!(base_name("my_app::sync::Tracked<my_app::orders::Order>"), "Tracked");
    }

    #[test]
    fn test_pascal_case_single_word() {
        assert_eq!(pascal_case("INITIATED"), "Initiated");
        assert_eq!(pascal_case("error"), "Error");
    }

    #[test]
    fn test_pascal_case_joins_segments() {
        assert_eq!(pascal_case("COMPLEX_ENUM_NAME"), "ComplexEnumName");
        assert_eq!(pascal_case("no_listings_found"), "NoListingsFound");
        assert_eq!(pascal_case("in-transit"), "InTransit");
        assert_eq!(pascal_case("on hold"), "OnHold");
    }

    #[test]
    fn test_pascal_case_collapses_empty_segments() {
        assert_eq!(pascal_case("__DOUBLE__UNDERSCORE__"), "DoubleUnderscore");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn test_event_name() {
        assert_eq!(event_name("my_app::orders::Order", "INITIATED"), "OrderInitiated");
        assert_eq!(event_name("Shipment", "IN_TRANSIT"), "ShipmentInTransit");
        assert_eq!(
            event_name("my_app::tests::TestModel", "COMPLEX_ENUM_NAME"),
            "TestModelComplexEnumName"
        );
    }
}
