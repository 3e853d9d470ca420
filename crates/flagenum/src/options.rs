//! Per-enum configuration.

/// Name given to enums created without one.
pub const DEFAULT_NAME: &str = "Anonymous instance";
/// Separator joining sub-keys of a combination lookup (`"sat|sun"`).
pub const DEFAULT_SEPARATOR: char = '|';
/// Prefix asking a lookup for the raw flag (`"$sat"`).
pub const DEFAULT_FLAG_PREFIX: &str = "$";
/// Suffix asking a lookup for a membership predicate (`"sat$in"`).
pub const DEFAULT_PREDICATE_SUFFIX: &str = "$in";
/// Label of the sentinel member. Reserved: it can never be a visible label.
pub const DEFAULT_SENTINEL_NAME: &str = "None";

/// Options controlling naming, mutability and the reserved lookup markers of a
/// [`FlagEnum`](crate::FlagEnum).
///
/// Missing fields take their defaults when deserialized, so a JSON definition only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EnumOptions {
    /// Human-readable name used in diagnostics and reports.
    pub name: String,
    /// Rejects every mutation when set.
    pub read_only: bool,
    pub separator: char,
    pub flag_prefix: String,
    pub predicate_suffix: String,
    pub sentinel_name: String,
}

impl Default for EnumOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            read_only: false,
            separator: DEFAULT_SEPARATOR,
            flag_prefix: DEFAULT_FLAG_PREFIX.to_owned(),
            predicate_suffix: DEFAULT_PREDICATE_SUFFIX.to_owned(),
            sentinel_name: DEFAULT_SENTINEL_NAME.to_owned(),
        }
    }
}

impl EnumOptions {
    /// Creates options with the given name and every other field at its default.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the enum name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Makes the enum read-only.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the combination separator.
    #[must_use]
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the flag-of prefix.
    #[must_use]
    pub fn flag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.flag_prefix = prefix.into();
        self
    }

    /// Sets the membership-predicate suffix.
    #[must_use]
    pub fn predicate_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.predicate_suffix = suffix.into();
        self
    }

    /// Sets the sentinel label.
    #[must_use]
    pub fn sentinel_name(mut self, name: impl Into<String>) -> Self {
        self.sentinel_name = name.into();
        self
    }

    /// Header line used by reports: `FlagEnum <name>`, or `FlagEnum$ <name>` when
    /// read-only.
    #[must_use]
    pub fn display_name(&self) -> String {
        let marker = if self.read_only { "$" } else { "" };
        format!("FlagEnum{marker} {}", self.name)
    }
}
