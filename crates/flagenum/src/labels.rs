//! Loose input model for enum construction.
//!
//! Enums are frequently built from data that was not produced by Rust code (JSON
//! definitions, user input), so construction accepts a `Labels` value rather than a
//! `Vec<String>`. Only a string or a sequence is usable; every other shape is either
//! reported and skipped or rejected outright, see [`FlagEnum::build`](crate::FlagEnum::build).

use crate::error::EnumError;

/// A labels argument as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// No labels argument at all. Builds an empty enum with a warning.
    None,
    /// A single label; treated as a one-element sequence.
    Str(String),
    /// An ordered sequence. Elements that are not strings are dropped with a warning.
    Seq(Vec<Labels>),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A keyed object, e.g. a JSON map.
    Map(Vec<(String, Labels)>),
}

impl Labels {
    /// Name of the value's kind, used in diagnostics and errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Str(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Map(_) => "map",
        }
    }

    /// Flattens the top-level argument into its elements.
    ///
    /// Returns `Ok(None)` for an absent argument and an error for any shape that is
    /// neither a string nor a sequence.
    pub(crate) fn into_elements(self) -> Result<Option<Vec<Self>>, EnumError> {
        match self {
            Self::None => Ok(None),
            Self::Str(label) => Ok(Some(vec![Self::Str(label)])),
            Self::Seq(items) => Ok(Some(items)),
            other => Err(EnumError::InvalidLabels {
                found: other.type_name(),
            }),
        }
    }

    /// Short rendering of a rejected element for diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::None => "none".to_owned(),
            Self::Str(label) => format!("\"{label}\""),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Seq(_) | Self::Map(_) => self.type_name().to_owned(),
        }
    }
}

impl From<&str> for Labels {
    fn from(label: &str) -> Self {
        Self::Str(label.to_owned())
    }
}

impl From<String> for Labels {
    fn from(label: String) -> Self {
        Self::Str(label)
    }
}

impl From<&String> for Labels {
    fn from(label: &String) -> Self {
        Self::Str(label.clone())
    }
}

impl From<i64> for Labels {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Labels {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Labels {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Labels>> From<Option<T>> for Labels {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

impl<T: Into<Labels>> From<Vec<T>> for Labels {
    fn from(items: Vec<T>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Labels>> From<&[T]> for Labels {
    fn from(items: &[T]) -> Self {
        Self::Seq(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Labels>, const N: usize> From<[T; N]> for Labels {
    fn from(items: [T; N]) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Labels {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::None,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Int(value),
                None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(label) => Self::Str(label),
            Value::Array(items) => Self::Seq(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Self::Map(map.into_iter().map(|(key, value)| (key, value.into())).collect()),
        }
    }
}
