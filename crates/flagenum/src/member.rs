use std::fmt::{self, Display};

use crate::flag::{AsFlag, FlagValue, bit_for, is_subset};

/// Index reported by the sentinel member.
pub const NONE_INDEX: i64 = -1;

/// One named entry of a [`FlagEnum`](crate::FlagEnum).
///
/// Members are handed out by value: a `Member` is a snapshot of the entry at the
/// time of the query. After a structural edit of the enum, indices and flags of a
/// previously returned `Member` may be stale; only the label is a stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Member {
    label: String,
    position: Option<usize>,
    flag: FlagValue,
}

impl Member {
    /// Creates a visible member at `position`, deriving its flag.
    pub(crate) fn new(label: String, position: usize) -> Self {
        Self {
            label,
            position: Some(position),
            flag: bit_for(position),
        }
    }

    /// Creates the sentinel returned by failed lookups: no position, zero flag.
    pub(crate) fn none(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            position: None,
            flag: FlagValue::zero(),
        }
    }

    /// The label as originally supplied (trimmed, case preserved).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Zero-based index, or [`NONE_INDEX`] for the sentinel.
    #[must_use]
    pub fn index(&self) -> i64 {
        self.position
            .map_or(NONE_INDEX, |position| i64::try_from(position).unwrap_or(i64::MAX))
    }

    /// Zero-based index, `None` for the sentinel.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    #[must_use]
    pub fn flag(&self) -> &FlagValue {
        &self.flag
    }

    /// True for the sentinel returned by a failed lookup.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.position.is_none()
    }

    /// Tests whether this member is part of `candidate`.
    ///
    /// `candidate` may be a raw flag, a combination, or another member. Returns false
    /// when the candidate is not flag-shaped; otherwise delegates to [`is_subset`].
    #[must_use]
    pub fn subset_test(&self, candidate: impl AsFlag) -> bool {
        candidate
            .as_flag()
            .is_some_and(|candidate| is_subset(&self.flag, &candidate))
    }

    /// Alias of [`Member::subset_test`] that reads as `saturday.is_in(weekend)`.
    #[must_use]
    pub fn is_in(&self, subset: impl AsFlag) -> bool {
        self.subset_test(subset)
    }
}

impl AsFlag for Member {
    fn as_flag(&self) -> Option<FlagValue> {
        Some(self.flag.clone())
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_has_no_bits() {
        let none = Member::none("None");
        assert!(none.is_none());
        assert_eq!(none.index(), NONE_INDEX);
        assert!(none.flag().is_zero());
        assert_eq!(none.to_string(), "None");
        assert!(none.subset_test(0u8));
        assert!(!none.subset_test(7u8));
    }

    #[test]
    fn subset_test_accepts_members_and_raw_flags() {
        let wed = Member::new("wed".to_owned(), 2);
        let other = Member::new("thu".to_owned(), 3);
        assert_eq!(wed.flag(), &FlagValue::from(4u8));
        assert!(wed.subset_test(5));
        assert!(!wed.subset_test(&other));
        assert!(wed.subset_test(&wed));
        assert!(!wed.subset_test(-5));
    }
}
