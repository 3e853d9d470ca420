//! Diagnostics for recoverable misuse.
//!
//! Failed lookups and rejected mutations never return errors: the operation becomes
//! a no-op (or yields the sentinel) and a [`Diagnostic`] is handed to the enum's
//! [`DiagnosticSink`]. Callers pick the sink at construction time:
//!
//! | Sink | Purpose |
//! |------|---------|
//! | [`TracingDiagnostics`] | Default; emits a `tracing` warning event per diagnostic |
//! | [`CollectDiagnostics`] | Records diagnostics so callers can enforce strictness or assert on them |
//! | [`NoDiagnostics`] | Drops everything |
//!
//! ```ignore
//! let sink = Arc::new(CollectDiagnostics::new());
//! let mut days = FlagEnum::build(["mon", "tue"], EnumOptions::new("DOW"), sink.clone())?;
//! days.append("MON");
//! assert_eq!(sink.messages(), ["FlagEnum DOW append: \"MON\" exists, not added"]);
//! ```

use std::{
    fmt::{self, Display},
    sync::{Mutex, PoisonError},
};

use crate::flag::FlagValue;

/// Operation during which a diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    #[strum(serialize = "on create")]
    Create,
    Append,
    Prepend,
    Insert,
    Remove,
    Rename,
    #[strum(serialize = "key_for")]
    KeyFor,
}

/// Discriminant of a [`Diagnostic`], used as a structured field by log sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DiagnosticKind {
    Unresolved,
    InvalidLabel,
    DuplicateLabel,
    MissingLabel,
    ReadOnly,
    EmptyInput,
    DroppedInput,
    InvalidFlag,
    UnknownFlag,
}

/// One recoverable problem reported by an enum.
///
/// Every variant carries the display name of the enum that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A lookup key matched nothing; the sentinel (or a zero flag) was returned.
    Unresolved {
        enum_name: String,
        key: String,
        /// The key is not even a well-formed label.
        invalid: bool,
    },
    /// A label was empty, malformed, or reserved.
    InvalidLabel {
        enum_name: String,
        operation: Operation,
        label: String,
    },
    /// A label already exists under case-insensitive comparison.
    DuplicateLabel {
        enum_name: String,
        operation: Operation,
        label: String,
    },
    /// The label to remove or rename does not exist.
    MissingLabel {
        enum_name: String,
        operation: Operation,
        label: String,
    },
    /// A mutation was attempted on a read-only enum.
    ReadOnly {
        enum_name: String,
        operation: Operation,
        label: String,
    },
    /// The enum was created without any labels argument.
    EmptyInput { enum_name: String },
    /// A construction input element was not a string and was omitted.
    DroppedInput { enum_name: String, found: String },
    /// A reverse lookup was given something that is not a flag.
    InvalidFlag { enum_name: String, operation: Operation },
    /// A reverse lookup was given a flag no member carries (zero, several bits,
    /// or past the last member).
    UnknownFlag { enum_name: String, flag: FlagValue },
}

impl Diagnostic {
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Unresolved { .. } => DiagnosticKind::Unresolved,
            Self::InvalidLabel { .. } => DiagnosticKind::InvalidLabel,
            Self::DuplicateLabel { .. } => DiagnosticKind::DuplicateLabel,
            Self::MissingLabel { .. } => DiagnosticKind::MissingLabel,
            Self::ReadOnly { .. } => DiagnosticKind::ReadOnly,
            Self::EmptyInput { .. } => DiagnosticKind::EmptyInput,
            Self::DroppedInput { .. } => DiagnosticKind::DroppedInput,
            Self::InvalidFlag { .. } => DiagnosticKind::InvalidFlag,
            Self::UnknownFlag { .. } => DiagnosticKind::UnknownFlag,
        }
    }

    /// Display name of the enum that raised this diagnostic.
    #[must_use]
    pub fn enum_name(&self) -> &str {
        match self {
            Self::Unresolved { enum_name, .. }
            | Self::InvalidLabel { enum_name, .. }
            | Self::DuplicateLabel { enum_name, .. }
            | Self::MissingLabel { enum_name, .. }
            | Self::ReadOnly { enum_name, .. }
            | Self::EmptyInput { enum_name }
            | Self::DroppedInput { enum_name, .. }
            | Self::InvalidFlag { enum_name, .. }
            | Self::UnknownFlag { enum_name, .. } => enum_name,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { enum_name, key, invalid } => {
                let marker = if *invalid { " (invalid!)" } else { "" };
                write!(f, "{enum_name}[{key}{marker}] does not exist")
            }
            Self::InvalidLabel {
                enum_name,
                operation,
                label,
            } => write!(f, "{enum_name} {operation}: \"{label}\" invalid key value"),
            Self::DuplicateLabel {
                enum_name,
                operation,
                label,
            } => write!(f, "{enum_name} {operation}: \"{label}\" exists, not added"),
            Self::MissingLabel {
                enum_name,
                operation,
                label,
            } => write!(f, "{enum_name} {operation}: key \"{label}\" does not exist"),
            Self::ReadOnly {
                enum_name,
                operation,
                label,
            } => write!(f, "{enum_name} is readonly. [{operation}(\"{label}\")] not available."),
            Self::EmptyInput { enum_name } => write!(f, "{enum_name} on create: no labels given, created empty"),
            Self::DroppedInput { enum_name, found } => write!(f, "{enum_name} on create: {found} not valid, omitted"),
            Self::InvalidFlag { enum_name, operation } => {
                write!(f, "{enum_name}.{operation} input should be a non-negative flag value")
            }
            Self::UnknownFlag { enum_name, flag } => {
                write!(f, "{enum_name}.key_for: no member has flag {flag}")
            }
        }
    }
}

/// Receiver of diagnostics.
///
/// Implementations must accept every diagnostic and must not panic; the enum
/// carries on with its no-op or sentinel result regardless of what the sink does.
pub trait DiagnosticSink: fmt::Debug + Send + Sync {
    /// Called once per diagnostic, after the operation has been absorbed.
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default sink: one `WARN` event per diagnostic on the `flagenum` target.
///
/// Events carry `enum_name` and `kind` as structured fields, so a subscriber can
/// filter on them (e.g. `RUST_LOG=flagenum=off` silences everything).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        let kind: &'static str = diagnostic.kind().into();
        tracing::warn!(
            target: "flagenum",
            enum_name = diagnostic.enum_name(),
            kind,
            "{diagnostic}"
        );
    }
}

/// Sink that records every diagnostic.
///
/// Uses a `Mutex` so it can be shared through an `Arc` with the enum that reports
/// into it while the caller keeps a handle for inspection.
#[derive(Debug, Default)]
pub struct CollectDiagnostics(Mutex<Vec<Diagnostic>>);

impl CollectDiagnostics {
    /// Creates a new empty `CollectDiagnostics`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded diagnostics, oldest first.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the recorded diagnostics rendered as messages.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics().iter().map(ToString::to_string).collect()
    }

    /// Drains and returns the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}

/// Sink that ignores all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl DiagnosticSink for NoDiagnostics {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_enum_and_operation() {
        let duplicate = Diagnostic::DuplicateLabel {
            enum_name: "FlagEnum DOW".to_owned(),
            operation: Operation::Append,
            label: "MON".to_owned(),
        };
        assert_eq!(duplicate.to_string(), "FlagEnum DOW append: \"MON\" exists, not added");

        let unresolved = Diagnostic::Unresolved {
            enum_name: "FlagEnum DOW".to_owned(),
            key: "m o n".to_owned(),
            invalid: true,
        };
        assert_eq!(unresolved.to_string(), "FlagEnum DOW[m o n (invalid!)] does not exist");

        let dropped = Diagnostic::InvalidLabel {
            enum_name: "FlagEnum DOW".to_owned(),
            operation: Operation::Create,
            label: "|".to_owned(),
        };
        assert_eq!(dropped.to_string(), "FlagEnum DOW on create: \"|\" invalid key value");

        let unknown = Diagnostic::UnknownFlag {
            enum_name: "FlagEnum DOW".to_owned(),
            flag: FlagValue::from(5u8),
        };
        assert_eq!(unknown.to_string(), "FlagEnum DOW.key_for: no member has flag 5");
        assert_eq!(unknown.kind(), DiagnosticKind::UnknownFlag);
    }

    #[test]
    fn collect_sink_records_in_order() {
        let sink = CollectDiagnostics::new();
        assert!(sink.is_empty());
        sink.report(&Diagnostic::EmptyInput {
            enum_name: "a".to_owned(),
        });
        sink.report(&Diagnostic::InvalidFlag {
            enum_name: "b".to_owned(),
            operation: Operation::KeyFor,
        });
        assert_eq!(sink.len(), 2);
        let kinds: Vec<_> = sink.take().iter().map(Diagnostic::kind).collect();
        assert_eq!(kinds, [DiagnosticKind::EmptyInput, DiagnosticKind::InvalidFlag]);
        assert!(sink.is_empty());
    }

    #[test]
    fn kind_names_are_snake_case() {
        let name: &'static str = DiagnosticKind::DuplicateLabel.into();
        assert_eq!(name, "duplicate_label");
        assert_eq!(Operation::Create.to_string(), "on create");
        assert_eq!(Operation::KeyFor.to_string(), "key_for");
    }
}
