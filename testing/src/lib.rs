//! # Composable MVI Testing
//!
//! Testing utilities and helpers for the Composable MVI architecture.
//!
//! This crate provides:
//! - Deterministic implementations of environment traits
//! - A recording reporter for asserting on pipeline failures
//! - Helpers for draining side effects and waiting on state
//! - Property-testing strategies and assertions for reducers
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use composable_mvi_runtime::Container;
//! use composable_mvi_testing::{RecordingReporter, drain_side_effects, wait_for_state};
//! use std::time::Duration;
//!
//! #[tokio::test]
//! async fn test_intent_settles() {
//!     let reporter = RecordingReporter::new();
//!     let container = Container::with_config(
//!         MyState::default(),
//!         MyReducer,
//!         MyHandler,
//!         my_capabilities(),
//!         reporter.config(),
//!     );
//!     let mut states = container.subscribe_state();
//!     let mut side_effects = container.subscribe_side_effects();
//!
//!     container.dispatch(MyIntent::Refresh).unwrap();
//!     let settled = wait_for_state(&mut states, |s| !s.loading, Duration::from_secs(1)).await;
//!
//!     assert!(settled.is_some());
//!     assert_eq!(drain_side_effects(&mut side_effects), vec![MySideEffect::Refreshed]);
//!     assert!(reporter.errors().is_empty());
//! }
//! ```

/// Given-When-Then harness for reducers
pub mod reducer_test;

pub use reducer_test::ReducerTest;

/// Mock implementations for testing.
pub mod mocks {
    use composable_mvi_core::environment::RandomSource;
    use composable_mvi_runtime::{ContainerConfig, DispatchError};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Random source that replays a fixed script
    ///
    /// Once the script is exhausted every flip returns the fallback value
    /// (`false` unless set with [`ScriptedRandom::with_fallback`]).
    ///
    /// # Example
    ///
    /// ```
    /// use composable_mvi_testing::mocks::ScriptedRandom;
    /// use composable_mvi_core::environment::RandomSource;
    ///
    /// let random = ScriptedRandom::new([true, false]);
    /// assert!(random.next_bool());
    /// assert!(!random.next_bool());
    /// assert!(!random.next_bool()); // fallback
    /// ```
    #[derive(Debug, Clone)]
    pub struct ScriptedRandom {
        script: Arc<Mutex<VecDeque<bool>>>,
        fallback: bool,
    }

    impl ScriptedRandom {
        /// Create a random source that yields `script` in order
        #[must_use]
        pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into_iter().collect())),
                fallback: false,
            }
        }

        /// A random source that always yields `value`
        #[must_use]
        pub fn always(value: bool) -> Self {
            Self::new([]).with_fallback(value)
        }

        /// Value returned once the script is exhausted
        #[must_use]
        pub const fn with_fallback(mut self, fallback: bool) -> Self {
            self.fallback = fallback;
            self
        }

        /// Number of scripted values not consumed yet
        #[must_use]
        pub fn remaining(&self) -> usize {
            self.script.lock().map(|script| script.len()).unwrap_or(0)
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_bool(&self) -> bool {
            self.script
                .lock()
                .ok()
                .and_then(|mut script| script.pop_front())
                .unwrap_or(self.fallback)
        }
    }

    /// Reporter that records every pipeline failure
    ///
    /// # Example
    ///
    /// ```ignore
    /// let reporter = RecordingReporter::new();
    /// let container = Container::with_config(state, reducer, handler, caps, reporter.config());
    /// // ...
    /// assert_eq!(reporter.errors().len(), 1);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct RecordingReporter {
        errors: Arc<Mutex<Vec<DispatchError>>>,
    }

    impl RecordingReporter {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Default container configuration reporting into this recorder
        #[must_use]
        pub fn config(&self) -> ContainerConfig {
            let errors = Arc::clone(&self.errors);
            ContainerConfig::default().with_reporter(move |error| {
                if let Ok(mut errors) = errors.lock() {
                    errors.push(error.clone());
                }
            })
        }

        /// Failures recorded so far
        #[must_use]
        pub fn errors(&self) -> Vec<DispatchError> {
            self.errors
                .lock()
                .map(|errors| errors.clone())
                .unwrap_or_default()
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use std::time::Duration;
    use tokio::sync::broadcast::{self, error::TryRecvError};
    use tokio::sync::watch;

    /// Take every side effect currently buffered for this receiver
    ///
    /// Does not wait: side effects emitted later are not included.
    pub fn drain_side_effects<T: Clone>(receiver: &mut broadcast::Receiver<T>) -> Vec<T> {
        let mut drained = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(value) => drained.push(value),
                Err(TryRecvError::Lagged(_)) => {},
                Err(TryRecvError::Empty | TryRecvError::Closed) => return drained,
            }
        }
    }

    /// Wait until the state satisfies `predicate`
    ///
    /// Returns `None` on timeout or if the container was dropped first.
    pub async fn wait_for_state<S, F>(
        receiver: &mut watch::Receiver<S>,
        predicate: F,
        timeout: Duration,
    ) -> Option<S>
    where
        S: Clone,
        F: FnMut(&S) -> bool,
    {
        tokio::time::timeout(timeout, receiver.wait_for(predicate))
            .await
            .ok()?
            .ok()
            .map(|state| state.clone())
    }

    /// Install a test-friendly tracing subscriber
    ///
    /// Honours `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use composable_mvi_core::outcome::Outcome;
    use composable_mvi_core::reducer::Reducer;
    use proptest::prelude::*;
    use std::fmt::Debug;

    /// Strategy producing every `Outcome` variant
    pub fn outcome<T, E>(
        success: impl Strategy<Value = T> + 'static,
        failure: impl Strategy<Value = E> + 'static,
    ) -> BoxedStrategy<Outcome<T, E>>
    where
        T: Debug + 'static,
        E: Debug + 'static,
    {
        prop_oneof![
            Just(()).prop_map(|()| Outcome::Loading),
            success.prop_map(Outcome::Success),
            failure.prop_map(Outcome::Fail),
        ]
        .boxed()
    }

    /// Assert that reducing `effect` against `state` is pure
    ///
    /// Reduces twice from the same input and checks that both results agree
    /// and that the input state is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the two reductions disagree or the input changed.
    pub fn assert_reduce_is_pure<R>(reducer: &R, state: &R::State, effect: &R::Effect)
    where
        R: Reducer,
        R::State: PartialEq,
        R::Effect: Clone,
        R::SideEffect: PartialEq,
    {
        let before = state.clone();
        let first = reducer.reduce(state, effect.clone());
        let second = reducer.reduce(state, effect.clone());

        assert_eq!(first, second, "reduce is not deterministic for {effect:?}");
        assert_eq!(&before, state, "reduce changed its input state");
    }
}

// Re-export commonly used items
pub use helpers::{drain_side_effects, init_test_tracing, wait_for_state};
pub use mocks::{RecordingReporter, ScriptedRandom};

#[cfg(test)]
mod tests {
    use super::*;
    use composable_mvi_core::environment::RandomSource;
    use composable_mvi_runtime::DispatchError;
    use std::time::Duration;
    use tokio::sync::{broadcast, watch};

    #[test]
    fn test_scripted_random_replays_then_falls_back() {
        let random = ScriptedRandom::new([true, true, false]).with_fallback(true);
        assert_eq!(random.remaining(), 3);

        let flips: Vec<bool> = (0..5).map(|_| random.next_bool()).collect();
        assert_eq!(flips, vec![true, true, false, true, true]);
        assert_eq!(random.remaining(), 0);
    }

    #[test]
    fn test_scripted_random_clones_share_script() {
        let random = ScriptedRandom::new([true, false]);
        let clone = random.clone();

        assert!(random.next_bool());
        assert!(!clone.next_bool());
        assert_eq!(random.remaining(), 0);
    }

    #[test]
    fn test_recording_reporter_collects() {
        let reporter = RecordingReporter::new();
        let config = reporter.config();

        (config.reporter)(&DispatchError::Panicked("first".into()));
        (config.reporter)(&DispatchError::Panicked("second".into()));

        assert_eq!(
            reporter.errors(),
            vec![
                DispatchError::Panicked("first".into()),
                DispatchError::Panicked("second".into()),
            ]
        );
    }

    #[test]
    fn test_drain_side_effects_takes_buffered_only() {
        let (sender, mut receiver) = broadcast::channel(4);
        let _ = sender.send(1);
        let _ = sender.send(2);

        assert_eq!(drain_side_effects(&mut receiver), vec![1, 2]);
        assert!(drain_side_effects(&mut receiver).is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_state_times_out() {
        let (sender, mut receiver) = watch::channel(0_u32);

        let reached = wait_for_state(&mut receiver, |n| *n == 1, Duration::from_millis(10)).await;
        assert_eq!(reached, None);

        sender.send_replace(1);
        let reached = wait_for_state(&mut receiver, |n| *n == 1, Duration::from_millis(10)).await;
        assert_eq!(reached, Some(1));
    }
}
