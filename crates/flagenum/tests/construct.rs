//! Tests for building enums from loosely typed label input.

use std::sync::Arc;

use flagenum::{
    CollectDiagnostics, DiagnosticKind, EnumError, EnumOptions, FlagEnum, Labels, NoDiagnostics, bit_for,
};
use pretty_assertions::assert_eq;

fn build(labels: impl Into<Labels>) -> (FlagEnum, Arc<CollectDiagnostics>) {
    let sink = Arc::new(CollectDiagnostics::new());
    let days = FlagEnum::build(labels, EnumOptions::new("DOW"), sink.clone()).unwrap();
    (days, sink)
}

fn kinds(sink: &CollectDiagnostics) -> Vec<DiagnosticKind> {
    sink.diagnostics().iter().map(flagenum::Diagnostic::kind).collect()
}

// =============================================================================
// 1. Flag assignment
// =============================================================================

/// Flags are exactly 1, 2, 4, ... in input order.
#[test]
fn flags_follow_input_order() {
    let labels = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
    let (days, sink) = build(labels);
    assert_eq!(days.len(), labels.len());
    for (position, member) in days.iter().enumerate() {
        assert_eq!(member.label(), labels[position]);
        assert_eq!(member.position(), Some(position));
        assert_eq!(member.flag(), &bit_for(position), "flag of {member}");
        assert!(member.flag().is_single_bit());
    }
    assert!(sink.is_empty(), "clean input should not warn: {:?}", sink.messages());
}

/// Past 64 members the flags keep working as big integers.
#[test]
fn more_members_than_bits_in_a_word() {
    let labels: Vec<String> = (0..100).map(|i| format!("m{i}")).collect();
    let (big, _) = build(labels);
    let last = big.get("M99");
    assert_eq!(last.index(), 99);
    assert_eq!(last.flag(), &bit_for(99));
    assert_eq!(last.flag().to_u64(), None);
    assert!(last.is_in(big.combo("m0|m99")));
    assert!(!big.get("m64").is_in(big.combo("m0|m99")));
    assert_eq!(big.key_for(bit_for(70)), Some("m70".to_owned()));
}

#[test]
fn values_match_keys() {
    let (days, _) = build(["mon", "tue", "wed"]);
    let values = days.values();
    assert_eq!(values.len(), 3);
    assert_eq!(values[2], days.get("wed"));
    let labels: Vec<&str> = values.iter().map(|member| member.label()).collect();
    assert_eq!(labels, days.keys());
}

/// Labels are trimmed but keep their casing.
#[test]
fn labels_are_trimmed() {
    let (days, _) = build(vec!["  Monday ", "Tuesday"]);
    assert_eq!(days.keys(), ["Monday", "Tuesday"]);
}

// =============================================================================
// 2. Input normalization
// =============================================================================

/// A single string is a one-element sequence.
#[test]
fn single_string_input() {
    let (one, sink) = build("solo");
    assert_eq!(one.keys(), ["solo"]);
    assert!(sink.is_empty());
}

/// No labels argument gives an empty enum and a warning.
#[test]
fn missing_input_is_empty_with_warning() {
    let (empty, sink) = build(Labels::None);
    assert!(empty.is_empty());
    assert_eq!(kinds(&sink), [DiagnosticKind::EmptyInput]);
}

/// Elements that are not non-empty strings are dropped one by one.
#[test]
fn bad_elements_are_dropped() {
    let input = Labels::Seq(vec![
        Labels::from("a"),
        Labels::Int(3),
        Labels::from(""),
        Labels::from("b"),
    ]);
    let (letters, sink) = build(input);
    assert_eq!(letters.keys(), ["a", "b"]);
    assert_eq!(letters.get("b").flag(), &bit_for(1), "dropped elements do not take a bit");
    assert_eq!(kinds(&sink), [DiagnosticKind::DroppedInput, DiagnosticKind::InvalidLabel]);
    assert_eq!(sink.messages()[0], "FlagEnum DOW on create: 3 not valid, omitted");
}

/// Labels clashing with key patterns can never be looked up, so they are rejected.
#[test]
fn labels_that_look_like_keys_are_dropped() {
    let (letters, sink) = build(["a", "b|c", "$d", "e$in", "42", "f"]);
    assert_eq!(letters.keys(), ["a", "f"]);
    assert_eq!(sink.len(), 4);
    assert!(kinds(&sink).iter().all(|kind| *kind == DiagnosticKind::InvalidLabel));
}

/// The sentinel name is reserved and silently skipped.
#[test]
fn sentinel_name_is_skipped_silently() {
    let (letters, sink) = build(["a", "NONE", "b"]);
    assert_eq!(letters.keys(), ["a", "b"]);
    assert!(sink.is_empty());
}

/// Case-insensitive duplicates keep the first spelling.
#[test]
fn duplicates_are_filtered() {
    let (days, sink) = build(["Monday", "monday", "Tuesday"]);
    assert_eq!(days.keys(), ["Monday", "Tuesday"]);
    assert_eq!(kinds(&sink), [DiagnosticKind::DuplicateLabel]);
}

/// JSON values are accepted as input.
#[test]
fn json_input() {
    let value = serde_json::json!(["mon", "tue", null, "wed"]);
    let (days, sink) = build(value);
    assert_eq!(days.keys(), ["mon", "tue", "wed"]);
    assert_eq!(sink.messages(), ["FlagEnum DOW on create: none not valid, omitted"]);
}

// =============================================================================
// 3. Fatal input
// =============================================================================

/// Scalars and maps are not label collections.
#[test]
fn unusable_input_is_an_error() {
    let err = FlagEnum::new(42i64, "x").unwrap_err();
    assert!(matches!(err, EnumError::InvalidLabels { found: "int" }), "got {err:?}");
    assert_eq!(err.to_string(), "labels must be a string or a sequence of strings, got int");

    let err = FlagEnum::build(serde_json::json!({"a": "b"}), EnumOptions::default(), Arc::new(NoDiagnostics))
        .unwrap_err();
    assert!(matches!(err, EnumError::InvalidLabels { found: "map" }));
}

/// Options given at construction are kept.
#[test]
fn options_are_kept() {
    let days = FlagEnum::with_options(["mon"], EnumOptions::new("DOW").read_only(true)).unwrap();
    assert_eq!(days.name(), "DOW");
    assert!(days.is_read_only());
    assert_eq!(days.display_name(), "FlagEnum$ DOW");

    let anonymous = FlagEnum::with_options(["mon"], EnumOptions::default()).unwrap();
    assert_eq!(anonymous.name(), "Anonymous instance");
}
