//! # Assertion Result
//!
//! `AssertResult<T>` is the value every assertion call returns. A mismatch is
//! an ordinary outcome, so it is data (`Failure`) rather than an `Err`.
//! Callers decide per call site whether to
//!
//! - transform the value (`map`),
//! - fall back (`get_or_else`, `get_or_else_with`),
//! - inspect the records (`errors`), or
//! - escalate (`into_result`, `?` via `From`, or the panicking `unwrap`).
//!
//! `Success` holds the value the engine accepted, including any rewrites the
//! engine applied in place (defaults, coercion, stripped properties).

use crate::error::{ErrorRecords, ValidationError};

/// Outcome of checking one value against a schema.
#[must_use = "an assertion result may be a Failure, which should be handled"]
#[derive(Debug, Clone, PartialEq)]
pub enum AssertResult<T> {
    /// The value passed validation.
    Success(T),
    /// The value failed validation; no `T` is available.
    Failure(ErrorRecords),
}

impl<T> AssertResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AssertResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AssertResult::Failure(_))
    }

    /// Returns the validated value.
    ///
    /// # Panics
    ///
    /// Panics on `Failure` with the [`ValidationError`] display, which
    /// lists every record. Use [`into_result`](Self::into_result) to get the
    /// error as a value instead.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self.into_result() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Escalates a `Failure` into a [`ValidationError`] carrying the records.
    pub fn into_result(self) -> Result<T, ValidationError> {
        match self {
            AssertResult::Success(value) => Ok(value),
            AssertResult::Failure(errors) => Err(ValidationError::new(errors)),
        }
    }

    /// Applies `f` to a `Success` value. A `Failure` is passed along with
    /// the same records and `f` is not called.
    pub fn map<U, F>(self, f: F) -> AssertResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            AssertResult::Success(value) => AssertResult::Success(f(value)),
            AssertResult::Failure(errors) => AssertResult::Failure(errors),
        }
    }

    /// Chains a fallible step. Used to convert validated values into richer
    /// types whose conversion can itself fail.
    pub fn and_then<U, F>(self, f: F) -> AssertResult<U>
    where
        F: FnOnce(T) -> AssertResult<U>,
    {
        match self {
            AssertResult::Success(value) => f(value),
            AssertResult::Failure(errors) => AssertResult::Failure(errors),
        }
    }

    /// `None` for `Success`, the records for `Failure`.
    pub fn errors(&self) -> Option<&ErrorRecords> {
        match self {
            AssertResult::Success(_) => None,
            AssertResult::Failure(errors) => Some(errors),
        }
    }

    pub fn into_errors(self) -> Option<ErrorRecords> {
        match self {
            AssertResult::Success(_) => None,
            AssertResult::Failure(errors) => Some(errors),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AssertResult::Success(value) => Some(value),
            AssertResult::Failure(_) => None,
        }
    }

    pub fn as_ref(&self) -> AssertResult<&T> {
        match self {
            AssertResult::Success(value) => AssertResult::Success(value),
            AssertResult::Failure(errors) => AssertResult::Failure(errors.clone()),
        }
    }

    /// The value on `Success`, `fallback` unchanged on `Failure`.
    pub fn get_or_else(self, fallback: T) -> T {
        match self {
            AssertResult::Success(value) => value,
            AssertResult::Failure(_) => fallback,
        }
    }

    /// The value on `Success`; on `Failure`, `f` applied to the records.
    /// `f` runs only on the failure path, exactly once.
    pub fn get_or_else_with<F>(self, f: F) -> T
    where
        F: FnOnce(&ErrorRecords) -> T,
    {
        match self {
            AssertResult::Success(value) => value,
            AssertResult::Failure(errors) => f(&errors),
        }
    }
}

impl<T> From<AssertResult<T>> for Result<T, ValidationError> {
    fn from(result: AssertResult<T>) -> Self {
        result.into_result()
    }
}
