//! The flagged enumeration itself.
//!
//! A [`FlagEnum`] owns an ordered set of members keyed by their case-folded label.
//! The order is the only source of truth for flags: member `i` always carries
//! `1 << i`, so every structural edit rebuilds the whole member map (a "reindex")
//! and swaps it in. Edits take `&mut self`, which means no reader can observe a
//! half-reindexed enum; callers that want copy-on-write semantics clone first and
//! mutate the clone.

use std::{
    fmt::{self, Display},
    sync::Arc,
};

use indexmap::IndexMap;
use unicode_casefold::UnicodeCaseFold;

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, Operation, TracingDiagnostics},
    error::EnumError,
    flag::{AsFlag, FlagValue, is_subset, to_binary_string},
    labels::Labels,
    lookup::{self, Combo, KeyPattern, MembershipPredicate, Resolved},
    member::Member,
    options::EnumOptions,
};

/// Normalizes a label or key for case-insensitive comparison.
fn fold(label: &str) -> String {
    label.trim().chars().case_fold().collect()
}

/// Builds the member map for `labels` in order. Labels must already be validated
/// and unique; a repeated folded label keeps its first occurrence.
fn reindex(labels: impl IntoIterator<Item = String>) -> IndexMap<String, Member> {
    let mut members = IndexMap::new();
    for label in labels {
        let position = members.len();
        members
            .entry(fold(&label))
            .or_insert_with(|| Member::new(label, position));
    }
    members
}

/// Encoded form of an enum: its options and labels in order. Flags are derived on
/// load.
#[derive(serde::Serialize, serde::Deserialize)]
struct Snapshot {
    options: EnumOptions,
    labels: Vec<String>,
}

/// An ordered, mutable enumeration of named flags.
///
/// ```ignore
/// let days = FlagEnum::new(["mon", "tue", "wed"], "DOW")?;
/// assert_eq!(days.get("WED").flag(), &FlagValue::from(4u8));
/// assert!(days.combo("mon|wed").subset_test(days.flag_of("wed")));
/// ```
#[derive(Debug, Clone)]
pub struct FlagEnum {
    options: EnumOptions,
    members: IndexMap<String, Member>,
    sink: Arc<dyn DiagnosticSink>,
}

impl FlagEnum {
    /// Creates an enum named `name`, reporting through [`TracingDiagnostics`].
    pub fn new(labels: impl Into<Labels>, name: impl Into<String>) -> Result<Self, EnumError> {
        Self::with_options(labels, EnumOptions::new(name))
    }

    /// Creates an enum with explicit options, reporting through [`TracingDiagnostics`].
    pub fn with_options(labels: impl Into<Labels>, options: EnumOptions) -> Result<Self, EnumError> {
        Self::build(labels, options, Arc::new(TracingDiagnostics))
    }

    /// Creates an enum reporting through `sink`.
    ///
    /// Members are assigned flags in input order. The input is normalized first:
    /// * a single string is a one-element sequence;
    /// * [`Labels::None`] gives an empty enum and an `EmptyInput` diagnostic;
    /// * elements that are not strings, or are empty or malformed labels, are
    ///   dropped with a diagnostic, as are case-insensitive duplicates;
    /// * labels equal to the sentinel name are dropped silently.
    ///
    /// # Errors
    /// [`EnumError::InvalidLabels`] when `labels` is neither a string nor a sequence.
    pub fn build(
        labels: impl Into<Labels>,
        options: EnumOptions,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, EnumError> {
        let mut engine = Self {
            options,
            members: IndexMap::new(),
            sink,
        };
        let Some(elements) = labels.into().into_elements()? else {
            engine.emit(Diagnostic::EmptyInput {
                enum_name: engine.display_name(),
            });
            return Ok(engine);
        };

        let mut members = IndexMap::with_capacity(elements.len());
        for element in elements {
            let raw = match element {
                Labels::Str(raw) => raw,
                other => {
                    engine.emit(Diagnostic::DroppedInput {
                        enum_name: engine.display_name(),
                        found: other.describe(),
                    });
                    continue;
                }
            };
            let label = raw.trim();
            if engine.is_sentinel(label) {
                continue;
            }
            if !engine.is_well_formed(label) {
                engine.emit(Diagnostic::InvalidLabel {
                    enum_name: engine.display_name(),
                    operation: Operation::Create,
                    label: raw.clone(),
                });
                continue;
            }
            let key = fold(label);
            if members.contains_key(&key) {
                engine.emit(Diagnostic::DuplicateLabel {
                    enum_name: engine.display_name(),
                    operation: Operation::Create,
                    label: label.to_owned(),
                });
                continue;
            }
            let position = members.len();
            members.insert(key, Member::new(label.to_owned(), position));
        }
        engine.members = members;
        Ok(engine)
    }

    // === Accessors ===

    #[must_use]
    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// Name as it appears in diagnostics and report headers.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.options.display_name()
    }

    #[must_use]
    pub fn options(&self) -> &EnumOptions {
        &self.options
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    /// Replaces the diagnostics sink.
    pub fn set_sink(&mut self, sink: Arc<dyn DiagnosticSink>) {
        self.sink = sink;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Labels in index order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.members.values().map(|member| member.label().to_owned()).collect()
    }

    /// Members in index order.
    #[must_use]
    pub fn values(&self) -> Vec<Member> {
        self.members.values().cloned().collect()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Member> + DoubleEndedIterator {
        self.members.values()
    }

    /// Case-insensitive membership test. Never reports a diagnostic.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.members.contains_key(&fold(label))
    }

    /// The sentinel member: index −1, flag 0.
    #[must_use]
    pub fn none(&self) -> Member {
        Member::none(&self.options.sentinel_name)
    }

    // === Lookup ===

    /// Resolves any lookup key, see [`KeyPattern`] for the matching order.
    ///
    /// Never fails: unresolved keys (and unresolved sub-keys of a combination)
    /// report an `Unresolved` diagnostic and contribute the sentinel or zero flag.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Resolved {
        let trimmed = key.trim();
        match KeyPattern::parse(trimmed, &self.options) {
            KeyPattern::Index(position) => Resolved::Member(self.member_at(position, Some(trimmed))),
            KeyPattern::Combo(sub_keys) => {
                let flag = sub_keys
                    .into_iter()
                    .fold(FlagValue::zero(), |combined, sub_key| combined | self.flag_for(sub_key));
                Resolved::Combo(Combo::new(trimmed.to_owned(), flag))
            }
            KeyPattern::FlagOf(label) => Resolved::Flag(self.member_for(label, trimmed).flag().clone()),
            KeyPattern::Predicate(label) => {
                let member = self.member_for(label, trimmed);
                Resolved::Predicate(MembershipPredicate::new(
                    member.label().to_owned(),
                    member.flag().clone(),
                ))
            }
            KeyPattern::Label(label) => Resolved::Member(self.member_named(label, trimmed)),
        }
    }

    /// Looks up a single member by label or position, returning the sentinel when
    /// nothing matches.
    #[must_use]
    pub fn get(&self, key: &str) -> Member {
        let trimmed = key.trim();
        if lookup::is_index(trimmed) {
            self.member_at(trimmed.parse().unwrap_or(usize::MAX), Some(trimmed))
        } else {
            self.member_named(trimmed, trimmed)
        }
    }

    /// Member currently at `position`, or the sentinel when out of range.
    #[must_use]
    pub fn at(&self, position: usize) -> Member {
        self.member_at(position, None)
    }

    /// Flag of a label (the flag prefix is optional), zero when unresolved.
    #[must_use]
    pub fn flag_of(&self, label: &str) -> FlagValue {
        self.flag_for(label.trim())
    }

    /// Combined flag of a separator-joined key. A key without separator is a
    /// one-member combination.
    #[must_use]
    pub fn combo(&self, key: &str) -> Combo {
        let trimmed = key.trim();
        let flag = trimmed
            .split(self.options.separator)
            .fold(FlagValue::zero(), |combined, sub_key| combined | self.flag_for(sub_key.trim()));
        Combo::new(trimmed.to_owned(), flag)
    }

    /// Membership predicate for a label or position (the predicate suffix is
    /// optional).
    #[must_use]
    pub fn predicate(&self, label: &str) -> MembershipPredicate {
        let trimmed = label.trim();
        let name = lookup::strip_suffix_ignore_case(trimmed, &self.options.predicate_suffix).unwrap_or(trimmed);
        let member = self.member_for(name.trim(), trimmed);
        MembershipPredicate::new(member.label().to_owned(), member.flag().clone())
    }

    /// Reverse lookup: the label whose flag equals `flag`.
    ///
    /// Zero and multi-bit values match nothing and report an `UnknownFlag`
    /// diagnostic. A value that is not flag-shaped (e.g. negative) reports an
    /// `InvalidFlag` diagnostic.
    #[must_use]
    pub fn key_for(&self, flag: impl AsFlag) -> Option<String> {
        let Some(flag) = flag.as_flag() else {
            self.emit(Diagnostic::InvalidFlag {
                enum_name: self.display_name(),
                operation: Operation::KeyFor,
            });
            return None;
        };
        let label = flag
            .position()
            .and_then(|position| usize::try_from(position).ok())
            .and_then(|position| self.members.get_index(position))
            .map(|(_, member)| member)
            .filter(|member| member.flag() == &flag)
            .map(|member| member.label().to_owned());
        if label.is_none() {
            self.emit(Diagnostic::UnknownFlag {
                enum_name: self.display_name(),
                flag,
            });
        }
        label
    }

    /// Tests `value` against `subset` with the enum's overlap semantics.
    ///
    /// False when either operand is not flag-shaped.
    #[must_use]
    pub fn has(value: impl AsFlag, subset: impl AsFlag) -> bool {
        match (value.as_flag(), subset.as_flag()) {
            (Some(value), Some(subset)) => is_subset(&value, &subset),
            _ => false,
        }
    }

    /// Alias of [`FlagEnum::has`].
    #[must_use]
    pub fn is(value: impl AsFlag, subset: impl AsFlag) -> bool {
        Self::has(value, subset)
    }

    // === Mutation ===

    /// Adds `label` after the last member.
    pub fn append(&mut self, label: &str) {
        self.insert_at(Operation::Append, label, None);
    }

    /// Adds `label` before the first member, shifting every flag up one bit.
    pub fn prepend(&mut self, label: &str) {
        self.insert_at(Operation::Prepend, label, Some(0));
    }

    /// Adds `label` at `position`, clamped to `0..=len`.
    pub fn insert(&mut self, label: &str, position: usize) {
        self.insert_at(Operation::Insert, label, Some(position));
    }

    /// Removes the member matching `label` case-insensitively and reindexes.
    pub fn remove(&mut self, label: &str) {
        if self.rejects_mutation(Operation::Remove, label) {
            return;
        }
        let Some(removed) = self.members.get_index_of(&fold(label)) else {
            self.emit(Diagnostic::MissingLabel {
                enum_name: self.display_name(),
                operation: Operation::Remove,
                label: label.to_owned(),
            });
            return;
        };
        let labels = self
            .members
            .values()
            .filter(|member| member.position() != Some(removed))
            .map(|member| member.label().to_owned());
        self.members = reindex(labels);
    }

    /// Replaces the label of `old` with `new`, keeping its position and flag.
    ///
    /// Renaming to a different casing of the same label is allowed.
    pub fn rename(&mut self, old: &str, new: &str) {
        if self.rejects_mutation(Operation::Rename, old) {
            return;
        }
        let new_label = new.trim();
        if old.trim().is_empty() || !self.is_well_formed(new_label) || self.is_sentinel(new_label) {
            let label = if old.trim().is_empty() { old } else { new };
            self.emit(Diagnostic::InvalidLabel {
                enum_name: self.display_name(),
                operation: Operation::Rename,
                label: label.to_owned(),
            });
            return;
        }
        let old_key = fold(old);
        let Some(renamed) = self.members.get_index_of(&old_key) else {
            self.emit(Diagnostic::MissingLabel {
                enum_name: self.display_name(),
                operation: Operation::Rename,
                label: old.to_owned(),
            });
            return;
        };
        let new_key = fold(new_label);
        if new_key != old_key && self.members.contains_key(&new_key) {
            self.emit(Diagnostic::DuplicateLabel {
                enum_name: self.display_name(),
                operation: Operation::Rename,
                label: new_label.to_owned(),
            });
            return;
        }
        let labels = self.members.values().map(|member| {
            if member.position() == Some(renamed) {
                new_label.to_owned()
            } else {
                member.label().to_owned()
            }
        });
        self.members = reindex(labels);
    }

    // === Serialization ===

    /// Deterministic multi-line report: a header, a rule as wide as the header,
    /// then one line per member with label, index, and flag in decimal and binary.
    #[must_use]
    pub fn report(&self) -> String {
        self.to_string()
    }

    /// Encodes the enum's options and labels with postcard.
    pub fn dump(&self) -> Result<Vec<u8>, EnumError> {
        let snapshot = Snapshot {
            options: self.options.clone(),
            labels: self.keys(),
        };
        Ok(postcard::to_allocvec(&snapshot)?)
    }

    /// Restores an enum from [`FlagEnum::dump`] output, reporting through
    /// [`TracingDiagnostics`]. Labels are validated again, as on construction.
    pub fn load(bytes: &[u8]) -> Result<Self, EnumError> {
        let snapshot: Snapshot = postcard::from_bytes(bytes)?;
        Self::with_options(snapshot.labels, snapshot.options)
    }

    // === Internals ===

    fn emit(&self, diagnostic: Diagnostic) {
        self.sink.report(&diagnostic);
    }

    fn is_sentinel(&self, label: &str) -> bool {
        fold(label) == fold(&self.options.sentinel_name)
    }

    /// A well-formed label is non-empty, is not all digits, and cannot be mistaken
    /// for any other key pattern.
    fn is_well_formed(&self, label: &str) -> bool {
        let label = label.trim();
        !label.is_empty()
            && !lookup::is_index(label)
            && !label.contains(self.options.separator)
            && lookup::strip_prefix(label, &self.options.flag_prefix).is_none()
            && lookup::strip_suffix_ignore_case(label, &self.options.predicate_suffix).is_none()
            && !label.chars().any(char::is_control)
    }

    fn unresolved(&self, key: String, invalid: bool) -> Member {
        self.emit(Diagnostic::Unresolved {
            enum_name: self.display_name(),
            key,
            invalid,
        });
        self.none()
    }

    fn member_named(&self, label: &str, key: &str) -> Member {
        match self.members.get(&fold(label)) {
            Some(member) => member.clone(),
            None => self.unresolved(key.to_owned(), !self.is_well_formed(label)),
        }
    }

    /// Member at `position`. `key` is what the caller looked up, the position
    /// itself when `None`.
    fn member_at(&self, position: usize, key: Option<&str>) -> Member {
        match self.members.get_index(position) {
            Some((_, member)) => member.clone(),
            None => self.unresolved(key.map_or_else(|| position.to_string(), str::to_owned), false),
        }
    }

    /// Member named by a position or a label, with any marker already stripped.
    fn member_for(&self, name: &str, key: &str) -> Member {
        if lookup::is_index(name) {
            self.member_at(name.parse().unwrap_or(usize::MAX), Some(key))
        } else {
            self.member_named(name, key)
        }
    }

    /// Flag of one sub-key: an optional flag prefix, then a position or a label.
    fn flag_for(&self, sub_key: &str) -> FlagValue {
        let name = lookup::strip_prefix(sub_key, &self.options.flag_prefix)
            .unwrap_or(sub_key)
            .trim();
        self.member_for(name, sub_key).flag().clone()
    }

    /// Reports and returns true when the enum is read-only.
    fn rejects_mutation(&self, operation: Operation, label: &str) -> bool {
        if self.options.read_only {
            self.emit(Diagnostic::ReadOnly {
                enum_name: self.display_name(),
                operation,
                label: label.to_owned(),
            });
        }
        self.options.read_only
    }

    fn insert_at(&mut self, operation: Operation, label: &str, position: Option<usize>) {
        if self.rejects_mutation(operation, label) {
            return;
        }
        let trimmed = label.trim();
        if !self.is_well_formed(trimmed) || self.is_sentinel(trimmed) {
            self.emit(Diagnostic::InvalidLabel {
                enum_name: self.display_name(),
                operation,
                label: label.to_owned(),
            });
            return;
        }
        if self.contains(trimmed) {
            self.emit(Diagnostic::DuplicateLabel {
                enum_name: self.display_name(),
                operation,
                label: trimmed.to_owned(),
            });
            return;
        }
        let mut labels = self.keys();
        let position = position.map_or(labels.len(), |position| position.min(labels.len()));
        labels.insert(position, trimmed.to_owned());
        self.members = reindex(labels);
    }
}

impl PartialEq for FlagEnum {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options && self.members == other.members
    }
}

impl Display for FlagEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.display_name();
        write!(f, "{header}\n{}", "-".repeat(header.chars().count()))?;
        for member in self.members.values() {
            write!(
                f,
                "\n{} index={} flag={} ({})",
                member.label(),
                member.index(),
                member.flag(),
                to_binary_string(member.flag())
            )?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FlagEnum {
    type Item = &'a Member;
    type IntoIter = indexmap::map::Values<'a, String, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.values()
    }
}
