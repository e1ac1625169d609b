//! Lenient parse outcomes.

/// Result of a parse that never fails outright.
///
/// Either the input parsed cleanly, or a fallback value was substituted and
/// the parse error is kept so callers and tests can tell which branch ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// The input parsed as expected.
    Value(T),
    /// The input did not parse; `value` is the fallback.
    Recovered { value: T, error: String },
}

impl<T> Parsed<T> {
    /// Build from a `Result`, substituting `fallback` on error.
    pub fn or_fallback<E: std::fmt::Display>(result: Result<T, E>, fallback: T) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(e) => Self::Recovered {
                value: fallback,
                error: e.to_string(),
            },
        }
    }

    /// Whether the fallback branch was taken.
    pub fn recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// Borrow the contained value.
    pub fn value(&self) -> &T {
        match self {
            Self::Value(value) | Self::Recovered { value, .. } => value,
        }
    }

    /// Take the contained value.
    pub fn into_value(self) -> T {
        match self {
            Self::Value(value) | Self::Recovered { value, .. } => value,
        }
    }

    /// The parse error, if the fallback branch was taken.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Recovered { error, .. } => Some(error),
        }
    }
}
