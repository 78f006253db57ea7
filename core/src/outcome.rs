//! Three-state outcome of an asynchronous operation.
//!
//! [`Outcome`] threads the result of an intent handler through the reducer
//! pipeline. It is success-biased: combinators operate on `Success` and pass
//! `Fail` and `Loading` through unchanged.
//!
//! Outcomes are transient. They are produced by a handler, consumed by the
//! container and never stored in state.

use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Discriminant of an [`Outcome`], used in mismatch errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Operation still in progress
    Loading,
    /// Operation produced a value
    Success,
    /// Operation failed
    Fail,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Error returned when an outcome is unwrapped as the wrong variant
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeError {
    /// `require_data` on a non-success, or `require_error` on a non-failure
    #[error("Outcome mismatch: expected {expected}, found {found}")]
    Mismatch {
        /// The variant the caller asked for
        expected: OutcomeKind,
        /// The variant actually held
        found: OutcomeKind,
    },
}

/// Outcome of an asynchronous operation
///
/// # Examples
///
/// ```
/// use composable_mvi_core::outcome::Outcome;
///
/// let outcome: Outcome<u32, String> = Outcome::Success(2);
/// assert_eq!(outcome.map(|n| n * 10), Outcome::Success(20));
///
/// let failed: Outcome<u32, String> = Outcome::Fail("boom".to_string());
/// assert!(failed.map(|n| n * 10).is_fail());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// Operation still in progress
    Loading,
    /// Operation produced a value
    Success(T),
    /// Operation failed
    Fail(E),
}

impl<T, E> Outcome<T, E> {
    /// The variant held by this outcome
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Loading => OutcomeKind::Loading,
            Self::Success(_) => OutcomeKind::Success,
            Self::Fail(_) => OutcomeKind::Fail,
        }
    }

    /// Returns true if this is `Loading`
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if this is `Success`
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if this is `Fail`
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Borrow the contents
    #[must_use]
    pub const fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(value) => Outcome::Success(value),
            Self::Fail(error) => Outcome::Fail(error),
        }
    }

    /// Apply `f` to a success value
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        self.flat_map(|value| Outcome::Success(f(value)))
    }

    /// Chain an outcome-producing function onto a success value
    pub fn flat_map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Outcome<U, E>,
    {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(value) => f(value),
            Self::Fail(error) => Outcome::Fail(error),
        }
    }

    /// Apply `f` to a failure
    pub fn map_err<E2, F>(self, f: F) -> Outcome<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(value) => Outcome::Success(value),
            Self::Fail(error) => Outcome::Fail(f(error)),
        }
    }

    /// Async counterpart of [`Outcome::map`]
    pub async fn map_async<U, F, Fut>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = U>,
    {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(value) => Outcome::Success(f(value).await),
            Self::Fail(error) => Outcome::Fail(error),
        }
    }

    /// Async counterpart of [`Outcome::flat_map`]
    pub async fn flat_map_async<U, F, Fut>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Outcome<U, E>>,
    {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success(value) => f(value).await,
            Self::Fail(error) => Outcome::Fail(error),
        }
    }

    /// Unwrap a success value
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::Mismatch`] if this is not `Success`.
    pub fn require_data(self) -> Result<T, OutcomeError> {
        match self {
            Self::Success(value) => Ok(value),
            other => Err(OutcomeError::Mismatch {
                expected: OutcomeKind::Success,
                found: other.kind(),
            }),
        }
    }

    /// Unwrap a failure
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::Mismatch`] if this is not `Fail`.
    pub fn require_error(self) -> Result<E, OutcomeError> {
        match self {
            Self::Fail(error) => Ok(error),
            other => Err(OutcomeError::Mismatch {
                expected: OutcomeKind::Fail,
                found: other.kind(),
            }),
        }
    }

    /// The success value, or `default` for any other variant
    pub fn data_or(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Loading | Self::Fail(_) => default,
        }
    }

    /// The success value, if any
    pub fn data(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Loading | Self::Fail(_) => None,
        }
    }

    /// The failure, if any
    pub fn error(self) -> Option<E> {
        match self {
            Self::Fail(error) => Some(error),
            Self::Loading | Self::Success(_) => None,
        }
    }

    /// Run `f` on a success value and return `self` for chaining
    #[must_use]
    pub fn on_success<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Self::Success(value) = &self {
            f(value);
        }
        self
    }

    /// Run `f` on a failure and return `self` for chaining
    #[must_use]
    pub fn on_failure<F>(self, f: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Self::Fail(error) = &self {
            f(error);
        }
        self
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Fail(error),
        }
    }
}
