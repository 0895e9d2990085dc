//! Integration tests for named character reference lookup.

use wren_html::tokenizer::named_character_references::{
    LONGEST_ENTITY_NAME, any_entity_has_prefix, lookup_entity,
};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("gt;"), Some(">"));
    assert_eq!(lookup_entity("quot;"), Some("\""));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
}

#[test]
fn test_lookup_legacy_entities() {
    // Legacy entities without semicolon
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("gt"), Some(">"));
    assert_eq!(lookup_entity("AMP"), Some("&"));
    // Most names require the semicolon
    assert_eq!(lookup_entity("notin"), None);
}

#[test]
fn test_lookup_is_case_sensitive() {
    assert_eq!(lookup_entity("Aacute;"), Some("\u{00C1}"));
    assert_eq!(lookup_entity("aacute;"), Some("\u{00E1}"));
}

#[test]
fn test_lookup_two_code_point_entity() {
    assert_eq!(lookup_entity("notinE;"), Some("\u{22F9}\u{0338}"));
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_prefix_matching() {
    assert!(any_entity_has_prefix("a")); // amp, apos, alpha, etc.
    assert!(any_entity_has_prefix("am")); // amp
    assert!(any_entity_has_prefix("amp")); // amp, amp;
    assert!(any_entity_has_prefix("amp;")); // amp;
    assert!(!any_entity_has_prefix("ampx")); // nothing
    assert!(!any_entity_has_prefix("xyz")); // nothing
}

#[test]
fn test_longest_name_fits_bound() {
    assert!(lookup_entity("CounterClockwiseContourIntegral;").is_some());
    assert_eq!("CounterClockwiseContourIntegral;".len(), LONGEST_ENTITY_NAME);
}
