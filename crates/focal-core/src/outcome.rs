//! Outcome wrapper for calls into best-effort external services.

/// Result of a call that degrades to a fallback instead of failing.
///
/// Generation, sentiment, and estimation never abort the request that
/// triggered them; when the remote service is unavailable the caller
/// still gets a usable value. This wrapper keeps the distinction
/// observable instead of collapsing it to the bare value.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOutcome<T> {
    /// The service produced the value.
    Served(T),
    /// The service was not attempted (unconfigured, or input below the
    /// threshold worth sending); the value is the documented default.
    Skipped(T),
    /// The service failed; the value is the fallback and the error is
    /// retained for logging.
    Recovered { value: T, error: String },
}

impl<T> ServiceOutcome<T> {
    pub fn recovered(value: T, error: impl Into<String>) -> Self {
        Self::Recovered {
            value,
            error: error.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Served(value) | Self::Skipped(value) => value,
            Self::Recovered { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Served(value) | Self::Skipped(value) => value,
            Self::Recovered { value, .. } => value,
        }
    }

    pub fn is_served(&self) -> bool {
        matches!(self, Self::Served(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// The retained error, if the service failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Recovered { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceOutcome<U> {
        match self {
            Self::Served(value) => ServiceOutcome::Served(f(value)),
            Self::Skipped(value) => ServiceOutcome::Skipped(f(value)),
            Self::Recovered { value, error } => ServiceOutcome::Recovered {
                value: f(value),
                error,
            },
        }
    }
}
