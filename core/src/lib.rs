//! # Composable MVI Core
//!
//! Core traits and types for the Composable MVI architecture.
//!
//! This crate provides the building blocks of a unidirectional data flow:
//! a UI issues intents, an async handler turns each intent into a stream of
//! outcomes, and a pure reducer folds the resulting effects into state.
//!
//! ## Core Concepts
//!
//! - **State**: Immutable view-model snapshot, replaced on every reduce step
//! - **Intent**: A user- or system-triggered request
//! - **Effect**: A pending state transition produced by handling an intent
//! - **`SideEffect`**: A one-shot notification (toast, navigation) outside of state
//! - **Outcome**: `Loading | Success(T) | Fail(E)` carrier between handler and reducer
//! - **Reducer**: Pure function `(State, Effect) → (State, Option<SideEffect>)`
//! - **Capabilities**: Optional loading/error reducers the runtime applies when present
//!
//! ## Example
//!
//! ```ignore
//! use composable_mvi_core::reducer::{ReduceError, ReduceResult, Reducer};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState { count: u32 }
//!
//! #[derive(Clone, Debug)]
//! enum CounterEffect { Set(u32) }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Effect = CounterEffect;
//!     type SideEffect = ();
//!
//!     fn reduce(
//!         &self,
//!         _state: &CounterState,
//!         effect: CounterEffect,
//!     ) -> Result<ReduceResult<CounterState, ()>, ReduceError> {
//!         match effect {
//!             CounterEffect::Set(count) => Ok(ReduceResult::new(CounterState { count })),
//!         }
//!     }
//! }
//! ```

/// Handler contract for turning intents into outcome streams
pub mod handler;

/// Three-state outcome union used between handlers and the reducer pipeline
pub mod outcome;

pub use handler::{IntentHandler, OutcomeStream, StateView};
pub use outcome::{Outcome, OutcomeError, OutcomeKind};
pub use reducer::{Capabilities, ReduceError, ReduceResult, Reducer};

/// Model module - Marker traits for the four MVI value kinds
///
/// Every marker is blanket-implemented, so any owned, cloneable, thread-safe
/// type qualifies. The traits exist to make signatures read in domain terms.
pub mod model {
    use std::fmt::Debug;

    /// Immutable view-model snapshot
    pub trait State: Clone + Debug + Send + Sync + 'static {}

    impl<T> State for T where T: Clone + Debug + Send + Sync + 'static {}

    /// User- or system-triggered request
    pub trait Intent: Clone + Debug + Send + Sync + 'static {}

    impl<T> Intent for T where T: Clone + Debug + Send + Sync + 'static {}

    /// Pending state transition, consumed exactly once by a reducer
    pub trait Effect: Debug + Send + 'static {}

    impl<T> Effect for T where T: Debug + Send + 'static {}

    /// One-shot external notification
    ///
    /// Side effects are broadcast, so they must be cheap to clone.
    pub trait SideEffect: Clone + Debug + Send + Sync + 'static {}

    impl<T> SideEffect for T where T: Clone + Debug + Send + Sync + 'static {}
}

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Effect) → (State, Option<SideEffect>)`.
///
/// Two optional capabilities extend a reducer:
/// - **Loading**: `(State, Intent) → ReduceResult`, applied before the handler runs
/// - **Error**: `(State, Intent, Failure) → ReduceResult`, applied on `Outcome::Fail`
///
/// Capabilities are plain optional functions held by [`Capabilities`]; the
/// runtime checks for their presence instead of inspecting the reducer type.
pub mod reducer {
    use std::fmt;
    use std::sync::Arc;
    use thiserror::Error;

    /// Result of a single reduce step
    ///
    /// Carries the complete next state and, optionally, a side effect to be
    /// published once the state is in place.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ReduceResult<S, SE> {
        /// The next authoritative state
        pub state: S,
        /// Side effect to emit after the state is published
        pub side_effect: Option<SE>,
    }

    impl<S, SE> ReduceResult<S, SE> {
        /// A result that only replaces state
        #[must_use]
        pub const fn new(state: S) -> Self {
            Self {
                state,
                side_effect: None,
            }
        }

        /// A result that replaces state and emits a side effect
        #[must_use]
        pub const fn with_side_effect(state: S, side_effect: SE) -> Self {
            Self {
                state,
                side_effect: Some(side_effect),
            }
        }

        /// Split into `(state, side_effect)`
        #[must_use]
        pub fn into_parts(self) -> (S, Option<SE>) {
            (self.state, self.side_effect)
        }
    }

    /// Error raised from inside a reduce step
    ///
    /// The runtime never lets this reach state: it is passed to the container's
    /// reporter and the prior state stays authoritative.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    #[error("Reduce failed: {reason}")]
    pub struct ReduceError {
        reason: String,
    }

    impl ReduceError {
        /// Create a reduce error with a human readable reason
        #[must_use]
        pub fn new(reason: impl Into<String>) -> Self {
            Self {
                reason: reason.into(),
            }
        }

        /// The reason given when the error was raised
        #[must_use]
        pub fn reason(&self) -> &str {
            &self.reason
        }
    }

    /// The Reducer trait - pure state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The view state this reducer folds effects into
    /// - `Effect`: The effect type produced by the intent handler
    /// - `SideEffect`: One-shot notifications the reducer may request
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for ClapsReducer {
    ///     type State = ClapsState;
    ///     type Effect = ClapsEffect;
    ///     type SideEffect = ClapsSideEffect;
    ///
    ///     fn reduce(&self, state: &ClapsState, effect: ClapsEffect)
    ///         -> Result<ReduceResult<ClapsState, ClapsSideEffect>, ReduceError>
    ///     {
    ///         match effect {
    ///             ClapsEffect::Claps(claps) => Ok(ReduceResult::new(ClapsState { claps, ..state.clone() })),
    ///             ClapsEffect::Toast => Ok(ReduceResult::with_side_effect(state.clone(), ClapsSideEffect::Toast)),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer: Send + Sync + 'static {
        /// The state type this reducer operates on
        type State: crate::model::State;

        /// The effect type this reducer consumes
        type Effect: crate::model::Effect;

        /// The side effect type this reducer may emit
        type SideEffect: crate::model::SideEffect;

        /// Reduce an effect against the current state
        ///
        /// Must be deterministic and must not rely on anything but its inputs.
        /// The current state is borrowed immutably; the next state is returned
        /// whole.
        ///
        /// # Errors
        ///
        /// Returns [`ReduceError`] when the effect cannot be applied. The
        /// runtime reports it and keeps the current state.
        fn reduce(
            &self,
            state: &Self::State,
            effect: Self::Effect,
        ) -> Result<ReduceResult<Self::State, Self::SideEffect>, ReduceError>;
    }

    /// Loading capability: `(state, intent) → result`
    pub type LoadingFn<S, I, SE> = Arc<dyn Fn(&S, &I) -> ReduceResult<S, SE> + Send + Sync>;

    /// Error capability: `(state, intent, failure) → result`
    pub type ErrorFn<S, I, E, SE> = Arc<dyn Fn(&S, &I, &E) -> ReduceResult<S, SE> + Send + Sync>;

    /// Optional reducer capabilities
    ///
    /// The runtime applies a capability only when it is present:
    /// - `on_loading` runs synchronously when an intent is dispatched
    /// - `on_error` runs for every `Outcome::Fail` the handler yields
    ///
    /// # Example
    ///
    /// ```ignore
    /// let capabilities = Capabilities::none()
    ///     .with_loading(|state: &ClapsState, _intent: &ClapsIntent| {
    ///         ReduceResult::new(ClapsState { loading: true, ..state.clone() })
    ///     });
    /// assert!(capabilities.supports_loading());
    /// assert!(!capabilities.supports_error());
    /// ```
    pub struct Capabilities<S, I, E, SE> {
        on_loading: Option<LoadingFn<S, I, SE>>,
        on_error: Option<ErrorFn<S, I, E, SE>>,
    }

    impl<S, I, E, SE> Capabilities<S, I, E, SE> {
        /// No capabilities: loading and error steps are skipped
        #[must_use]
        pub const fn none() -> Self {
            Self {
                on_loading: None,
                on_error: None,
            }
        }

        /// Install the loading capability
        #[must_use]
        pub fn with_loading<F>(mut self, on_loading: F) -> Self
        where
            F: Fn(&S, &I) -> ReduceResult<S, SE> + Send + Sync + 'static,
        {
            self.on_loading = Some(Arc::new(on_loading));
            self
        }

        /// Install the error capability
        #[must_use]
        pub fn with_error<F>(mut self, on_error: F) -> Self
        where
            F: Fn(&S, &I, &E) -> ReduceResult<S, SE> + Send + Sync + 'static,
        {
            self.on_error = Some(Arc::new(on_error));
            self
        }

        /// Whether a loading capability is installed
        #[must_use]
        pub const fn supports_loading(&self) -> bool {
            self.on_loading.is_some()
        }

        /// Whether an error capability is installed
        #[must_use]
        pub const fn supports_error(&self) -> bool {
            self.on_error.is_some()
        }

        /// Apply the loading capability, if present
        pub fn on_loading(&self, state: &S, intent: &I) -> Option<ReduceResult<S, SE>> {
            self.on_loading.as_ref().map(|f| f(state, intent))
        }

        /// Apply the error capability, if present
        pub fn on_error(&self, state: &S, intent: &I, failure: &E) -> Option<ReduceResult<S, SE>> {
            self.on_error.as_ref().map(|f| f(state, intent, failure))
        }
    }

    impl<S, I, E, SE> Default for Capabilities<S, I, E, SE> {
        fn default() -> Self {
            Self::none()
        }
    }

    impl<S, I, E, SE> Clone for Capabilities<S, I, E, SE> {
        fn clone(&self) -> Self {
            Self {
                on_loading: self.on_loading.clone(),
                on_error: self.on_error.clone(),
            }
        }
    }

    impl<S, I, E, SE> fmt::Debug for Capabilities<S, I, E, SE> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Capabilities")
                .field("loading", &self.supports_loading())
                .field("error", &self.supports_error())
                .finish()
        }
    }
}

/// Environment module - Dependency injection traits
///
/// External sources of non-determinism are abstracted behind traits so that
/// handlers can be driven deterministically in tests.
pub mod environment {
    /// Source of random decisions
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - backed by the thread-local RNG
    /// struct SystemRandom;
    /// impl RandomSource for SystemRandom {
    ///     fn next_bool(&self) -> bool {
    ///         rand::random()
    ///     }
    /// }
    ///
    /// // Test - always takes the same branch
    /// struct Always(bool);
    /// impl RandomSource for Always {
    ///     fn next_bool(&self) -> bool {
    ///         self.0
    ///     }
    /// }
    /// ```
    pub trait RandomSource: Send + Sync {
        /// A fair coin flip
        fn next_bool(&self) -> bool;
    }
}

#[cfg(test)]
mod tests {
    use super::reducer::{Capabilities, ReduceError, ReduceResult};

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Flag {
        on: bool,
    }

    #[test]
    fn test_capabilities_none_skips_both_steps() {
        let capabilities: Capabilities<Flag, (), String, ()> = Capabilities::none();

        assert!(!capabilities.supports_loading());
        assert!(!capabilities.supports_error());
        assert!(capabilities.on_loading(&Flag { on: false }, &()).is_none());
        assert!(
            capabilities
                .on_error(&Flag { on: false }, &(), &"boom".to_string())
                .is_none()
        );
    }

    #[test]
    fn test_capabilities_apply_installed_functions() {
        let capabilities: Capabilities<Flag, (), String, &'static str> = Capabilities::none()
            .with_loading(|_, ()| ReduceResult::new(Flag { on: true }))
            .with_error(|_, (), failure: &String| {
                ReduceResult::with_side_effect(Flag { on: false }, if failure.is_empty() { "empty" } else { "failed" })
            });

        let loading = capabilities.on_loading(&Flag { on: false }, &());
        assert_eq!(loading, Some(ReduceResult::new(Flag { on: true })));

        let error = capabilities.on_error(&Flag { on: true }, &(), &"boom".to_string());
        assert_eq!(
            error,
            Some(ReduceResult::with_side_effect(Flag { on: false }, "failed"))
        );
    }

    #[test]
    fn test_capabilities_debug_reports_presence() {
        let capabilities: Capabilities<Flag, (), String, ()> =
            Capabilities::none().with_loading(|state: &Flag, ()| ReduceResult::new(state.clone()));

        assert_eq!(
            format!("{capabilities:?}"),
            "Capabilities { loading: true, error: false }"
        );
    }

    #[test]
    fn test_reduce_result_into_parts() {
        let (state, side_effect) = ReduceResult::with_side_effect(Flag { on: true }, 7).into_parts();
        assert_eq!(state, Flag { on: true });
        assert_eq!(side_effect, Some(7));
    }

    #[test]
    fn test_reduce_error_display() {
        let error = ReduceError::new("counter overflow");
        assert_eq!(error.reason(), "counter overflow");
        assert_eq!(error.to_string(), "Reduce failed: counter overflow");
    }
}
