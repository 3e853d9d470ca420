//! String-keyed lookup protocol.
//!
//! A lookup key is classified by [`KeyPattern::parse`] using a fixed priority:
//!
//! 1. all ASCII digits: positional lookup (`"0"`)
//! 2. contains the separator: combination (`"sat|sun"`)
//! 3. starts with the flag prefix: raw flag of a label (`"$sat"`)
//! 4. ends with the predicate suffix: membership predicate (`"sat$in"`)
//! 5. anything else: plain label (`"Saturday"`)
//!
//! The engine turns a pattern into a [`Resolved`] value; this module only knows how
//! to read keys and what the results look like.

use std::fmt::{self, Display};

use crate::{
    flag::{AsFlag, FlagValue, is_subset},
    member::Member,
    options::EnumOptions,
};

/// Classification of a lookup key. Slices borrow from the (trimmed) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern<'k> {
    /// Position in the current member order. Out-of-range values saturate.
    Index(usize),
    /// Sub-keys of a combination, in the order given.
    Combo(Vec<&'k str>),
    /// Label whose raw flag is wanted.
    FlagOf(&'k str),
    /// Label whose membership predicate is wanted.
    Predicate(&'k str),
    Label(&'k str),
}

impl<'k> KeyPattern<'k> {
    /// Classifies `key` (already trimmed) against the markers in `options`.
    #[must_use]
    pub fn parse(key: &'k str, options: &EnumOptions) -> Self {
        if is_index(key) {
            return Self::Index(key.parse().unwrap_or(usize::MAX));
        }
        if key.contains(options.separator) {
            return Self::Combo(key.split(options.separator).map(str::trim).collect());
        }
        if let Some(label) = strip_prefix(key, &options.flag_prefix) {
            return Self::FlagOf(label.trim());
        }
        if let Some(label) = strip_suffix_ignore_case(key, &options.predicate_suffix) {
            return Self::Predicate(label.trim());
        }
        Self::Label(key)
    }
}

/// True for a non-empty key made only of ASCII digits.
pub(crate) fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|byte| byte.is_ascii_digit())
}

pub(crate) fn strip_prefix<'k>(key: &'k str, prefix: &str) -> Option<&'k str> {
    if prefix.is_empty() {
        return None;
    }
    key.strip_prefix(prefix)
}

/// Strips `suffix` from `key` comparing ASCII case-insensitively (`"sat$IN"`).
pub(crate) fn strip_suffix_ignore_case<'k>(key: &'k str, suffix: &str) -> Option<&'k str> {
    if suffix.is_empty() || key.len() < suffix.len() {
        return None;
    }
    let split = key.len() - suffix.len();
    let tail = key.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &key[..split])
}

/// Result of a string-keyed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A single member, or the sentinel when nothing matched.
    Member(Member),
    /// The OR of several members' flags.
    Combo(Combo),
    /// A raw flag (zero when the label was not found).
    Flag(FlagValue),
    /// "Is this member part of a subset?"
    Predicate(MembershipPredicate),
}

impl Resolved {
    /// The flag carried by the result, whatever its shape.
    #[must_use]
    pub fn flag(&self) -> &FlagValue {
        match self {
            Self::Member(member) => member.flag(),
            Self::Combo(combo) => combo.flag(),
            Self::Flag(flag) => flag,
            Self::Predicate(predicate) => predicate.flag(),
        }
    }

    /// Tests the carried flag against `candidate`.
    ///
    /// For a predicate this is the same as calling it.
    #[must_use]
    pub fn subset_test(&self, candidate: impl AsFlag) -> bool {
        candidate
            .as_flag()
            .is_some_and(|candidate| is_subset(self.flag(), &candidate))
    }

    #[must_use]
    pub fn as_member(&self) -> Option<&Member> {
        match self {
            Self::Member(member) => Some(member),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_member(self) -> Option<Member> {
        match self {
            Self::Member(member) => Some(member),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_combo(self) -> Option<Combo> {
        match self {
            Self::Combo(combo) => Some(combo),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_flag(self) -> Option<FlagValue> {
        match self {
            Self::Flag(flag) => Some(flag),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_predicate(self) -> Option<MembershipPredicate> {
        match self {
            Self::Predicate(predicate) => Some(predicate),
            _ => None,
        }
    }
}

impl AsFlag for Resolved {
    fn as_flag(&self) -> Option<FlagValue> {
        Some(self.flag().clone())
    }
}

/// Combined flag of a `"a|b|c"` lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combo {
    key: String,
    flag: FlagValue,
}

impl Combo {
    pub(crate) fn new(key: String, flag: FlagValue) -> Self {
        Self { key, flag }
    }

    /// The key the combination was resolved from.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn flag(&self) -> &FlagValue {
        &self.flag
    }

    /// Tests whether the combination overlaps `other`, see [`is_subset`].
    #[must_use]
    pub fn subset_test(&self, other: impl AsFlag) -> bool {
        other.as_flag().is_some_and(|other| is_subset(&self.flag, &other))
    }
}

impl AsFlag for Combo {
    fn as_flag(&self) -> Option<FlagValue> {
        Some(self.flag.clone())
    }
}

impl Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.flag)
    }
}

/// Predicate returned by a `"label$in"` lookup.
///
/// Captures the member's flag at lookup time; re-resolve after mutating the enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipPredicate {
    label: String,
    flag: FlagValue,
}

impl MembershipPredicate {
    pub(crate) fn new(label: String, flag: FlagValue) -> Self {
        Self { label, flag }
    }

    /// Label of the member being tested (the sentinel label when unresolved).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn flag(&self) -> &FlagValue {
        &self.flag
    }

    /// Tests whether the member is part of `subset`.
    #[must_use]
    pub fn test(&self, subset: impl AsFlag) -> bool {
        subset.as_flag().is_some_and(|subset| is_subset(&self.flag, &subset))
    }

    /// Converts the predicate into a plain closure.
    #[must_use]
    pub fn into_fn(self) -> impl Fn(&FlagValue) -> bool {
        move |subset: &FlagValue| is_subset(&self.flag, subset)
    }
}
