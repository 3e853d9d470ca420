//! Tests for structural edits and the reindexing that follows them.

use std::sync::Arc;

use flagenum::{CollectDiagnostics, Diagnostic, DiagnosticKind, EnumOptions, FlagEnum, FlagValue, Operation, bit_for};
use pretty_assertions::assert_eq;

const DAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

fn build(labels: &[&str], options: EnumOptions) -> (FlagEnum, Arc<CollectDiagnostics>) {
    let sink = Arc::new(CollectDiagnostics::new());
    let days = FlagEnum::build(labels, options, sink.clone()).unwrap();
    (days, sink)
}

fn dow() -> (FlagEnum, Arc<CollectDiagnostics>) {
    build(&DAYS, EnumOptions::new("DOW"))
}

fn kinds(sink: &CollectDiagnostics) -> Vec<DiagnosticKind> {
    sink.diagnostics().iter().map(Diagnostic::kind).collect()
}

/// Every member's flag must match its position after any edit.
fn assert_contiguous(flags: &FlagEnum) {
    for (position, member) in flags.iter().enumerate() {
        assert_eq!(member.position(), Some(position), "position of {member}");
        assert_eq!(member.flag(), &bit_for(position), "flag of {member}");
    }
}

// =============================================================================
// 1. Adding members
// =============================================================================

#[test]
fn append_adds_highest_flag() {
    let (mut days, sink) = dow();
    days.append("holiday");
    assert_eq!(days.len(), 8);
    assert_eq!(days.get("holiday").flag(), &bit_for(7));
    assert_contiguous(&days);
    assert!(sink.is_empty());
}

/// Prepending shifts every existing flag up one bit.
#[test]
fn prepend_shifts_flags() {
    let (mut days, _) = dow();
    days.prepend("zero");
    assert_eq!(days.get("zero").index(), 0);
    assert_eq!(days.get("mon").flag(), &FlagValue::from(2u8));
    assert_eq!(days.get("sun").flag(), &bit_for(7));
    assert_contiguous(&days);
}

#[test]
fn insert_clamps_position() {
    let (mut days, _) = dow();
    days.insert("midweek", 3);
    assert_eq!(days.get("midweek").index(), 3);
    assert_eq!(days.get("thu").index(), 4);
    days.insert("end", 100);
    assert_eq!(days.keys().last().map(String::as_str), Some("end"));
    assert_contiguous(&days);
}

/// Adding a label that exists under any casing is a no-op.
#[test]
fn duplicate_append_is_rejected() {
    let (mut days, sink) = build(&["monday", "tuesday"], EnumOptions::new("DOW"));
    let before = days.report();
    days.append("Monday");
    days.prepend(" TUESDAY ");
    days.insert("monday", 1);
    assert_eq!(days.len(), 2);
    assert_eq!(days.report(), before);
    assert_eq!(kinds(&sink), [DiagnosticKind::DuplicateLabel; 3]);
    assert_eq!(
        sink.messages()[0],
        "FlagEnum DOW append: \"Monday\" exists, not added"
    );
}

#[test]
fn invalid_labels_are_rejected() {
    let (mut days, sink) = dow();
    for label in ["", "   ", "a|b", "$a", "a$IN", "12", "none"] {
        days.append(label);
    }
    assert_eq!(days.len(), 7);
    assert_eq!(kinds(&sink), [DiagnosticKind::InvalidLabel; 7]);
    assert_eq!(sink.messages()[2], "FlagEnum DOW append: \"a|b\" invalid key value");
}

// =============================================================================
// 2. Removing members
// =============================================================================

/// Removing the first member renumbers the rest from bit 0.
#[test]
fn remove_reindexes() {
    let (mut letters, _) = build(&["a", "b", "c"], EnumOptions::new("letters"));
    letters.remove("A");
    assert_eq!(letters.keys(), ["b", "c"]);
    assert_eq!(letters.get("b").flag(), &FlagValue::from(1u8));
    assert_eq!(letters.get("c").flag(), &FlagValue::from(2u8));
    assert_contiguous(&letters);
}

#[test]
fn remove_missing_label_warns() {
    let (mut days, sink) = dow();
    days.remove("nope");
    assert_eq!(days.len(), 7);
    assert_eq!(sink.messages(), ["FlagEnum DOW remove: key \"nope\" does not exist"]);
}

/// Appending then removing the same label restores the original state.
#[test]
fn append_then_remove_round_trips() {
    let (mut days, _) = dow();
    let before = days.report();
    days.append("extra");
    assert_ne!(days.report(), before);
    days.remove("EXTRA");
    assert_eq!(days.report(), before);

    days.prepend("extra");
    days.remove("extra");
    assert_eq!(days.report(), before);
}

/// Removing everything leaves a usable empty enum.
#[test]
fn remove_all_then_append() {
    let (mut letters, _) = build(&["a", "b"], EnumOptions::new("letters"));
    letters.remove("a");
    letters.remove("b");
    assert!(letters.is_empty());
    letters.append("c");
    assert_eq!(letters.get("c").flag(), &bit_for(0));
}

// =============================================================================
// 3. Renaming members
// =============================================================================

/// Renaming keeps the member's position and flag.
#[test]
fn rename_keeps_position() {
    let (mut days, sink) = dow();
    days.rename("WED", "Wednesday");
    let wednesday = days.get("wednesday");
    assert_eq!(wednesday.label(), "Wednesday");
    assert_eq!(wednesday.index(), 2);
    assert_eq!(wednesday.flag(), &FlagValue::from(4u8));
    assert!(!days.contains("wed"));
    assert!(sink.is_empty());
}

#[test]
fn rename_to_other_casing() {
    let (mut days, sink) = dow();
    days.rename("mon", "MON");
    assert_eq!(days.keys()[0], "MON");
    assert!(sink.is_empty());
}

#[test]
fn rename_failures_leave_enum_unchanged() {
    let (mut days, sink) = dow();
    let before = days.report();
    days.rename("mon", "TUE");
    days.rename("nope", "other");
    days.rename("mon", "");
    days.rename("", "other");
    days.rename("mon", "none");
    assert_eq!(days.report(), before);
    assert_eq!(
        kinds(&sink),
        [
            DiagnosticKind::DuplicateLabel,
            DiagnosticKind::MissingLabel,
            DiagnosticKind::InvalidLabel,
            DiagnosticKind::InvalidLabel,
            DiagnosticKind::InvalidLabel,
        ]
    );
}

// =============================================================================
// 4. Read-only enums
// =============================================================================

#[test]
fn read_only_rejects_every_edit() {
    let (mut days, sink) = build(&DAYS, EnumOptions::new("RO").read_only(true));
    let before = days.report();
    days.append("x");
    days.prepend("x");
    days.insert("x", 2);
    days.remove("mon");
    days.rename("mon", "monday");
    assert_eq!(days.report(), before);
    assert_eq!(kinds(&sink), [DiagnosticKind::ReadOnly; 5]);
    assert_eq!(
        sink.diagnostics()[3],
        Diagnostic::ReadOnly {
            enum_name: "FlagEnum$ RO".to_owned(),
            operation: Operation::Remove,
            label: "mon".to_owned(),
        }
    );
    assert_eq!(
        sink.messages()[0],
        "FlagEnum$ RO is readonly. [append(\"x\")] not available."
    );
    // reads still work
    assert_eq!(days.get("sat").flag(), &FlagValue::from(32u8));
}

// =============================================================================
// 5. Copy-on-write
// =============================================================================

/// Editing a clone leaves the original untouched.
#[test]
fn clones_are_independent() {
    let (days, _) = dow();
    let mut workdays = days.clone();
    workdays.remove("sat");
    workdays.remove("sun");
    assert_eq!(days.len(), 7);
    assert_eq!(workdays.len(), 5);
    assert_eq!(days.get("sat").flag(), &FlagValue::from(32u8));
    assert_ne!(days, workdays);
}
