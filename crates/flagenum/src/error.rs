use std::fmt;

/// Fatal errors. Everything else an enum can go wrong with is reported through its
/// [`DiagnosticSink`](crate::DiagnosticSink) and absorbed.
#[derive(Debug)]
pub enum EnumError {
    /// The labels argument is neither a string nor a sequence, so no enum can be
    /// built from it.
    InvalidLabels {
        /// Kind of value that was supplied instead.
        found: &'static str,
    },
    /// A snapshot could not be encoded or decoded.
    Snapshot(postcard::Error),
}

impl fmt::Display for EnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLabels { found } => {
                write!(f, "labels must be a string or a sequence of strings, got {found}")
            }
            Self::Snapshot(error) => write!(f, "snapshot error: {error}"),
        }
    }
}

impl std::error::Error for EnumError {}

impl From<postcard::Error> for EnumError {
    fn from(error: postcard::Error) -> Self {
        Self::Snapshot(error)
    }
}
