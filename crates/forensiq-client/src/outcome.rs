//! `Outcome<T>` — a value that is always safe to use, plus an optional diagnostic.

use crate::error::SessionError;

/// Result of a best-effort session operation.
///
/// The value is meaningful either way: on failure it is the neutral value for
/// the operation (`None`, `false`, an empty list). Callers that only care about
/// the primary workflow read [`value`](Outcome::value) and move on; callers that
/// want to surface problems look at [`error`](Outcome::error).
#[derive(Debug)]
pub struct Outcome<T> {
    value: T,
    error: Option<SessionError>,
}

impl<T> Outcome<T> {
    /// Successful outcome.
    pub fn done(value: T) -> Self {
        Outcome { value, error: None }
    }

    /// Failed outcome carrying a caller-chosen fallback value.
    pub fn degraded(value: T, error: SessionError) -> Self {
        Outcome {
            value,
            error: Some(error),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn into_parts(self) -> (T, Option<SessionError>) {
        (self.value, self.error)
    }

    /// Convert to a `Result`, dropping the fallback value on failure.
    pub fn into_result(self) -> Result<T, SessionError> {
        match self.error {
            None => Ok(self.value),
            Some(e) => Err(e),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Failed outcome with the type's default as the neutral value.
    pub fn unavailable(error: SessionError) -> Self {
        Outcome::degraded(T::default(), error)
    }
}
