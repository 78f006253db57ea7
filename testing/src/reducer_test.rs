//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use composable_mvi_core::reducer::{ReduceError, Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for side effect assertion functions
type SideEffectAssertion<SE> = Box<dyn FnOnce(Option<&SE>)>;

/// Type alias for error assertion functions
type ErrorAssertion = Box<dyn FnOnce(&ReduceError)>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use composable_mvi_testing::ReducerTest;
///
/// ReducerTest::new(ClapsReducer)
///     .given_state(ClapsState { claps: 2, loading: true, error: None })
///     .when_effect(ClapsEffect::Claps(3))
///     .then_state(|state| {
///         assert_eq!(state.claps, 3);
///         assert!(!state.loading);
///     })
///     .then_side_effect(|side_effect| {
///         assert!(side_effect.is_none());
///     })
///     .run();
/// ```
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    initial_state: Option<R::State>,
    effect: Option<R::Effect>,
    state_assertions: Vec<StateAssertion<R::State>>,
    side_effect_assertions: Vec<SideEffectAssertion<R::SideEffect>>,
    error_assertions: Vec<ErrorAssertion>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            effect: None,
            state_assertions: Vec::new(),
            side_effect_assertions: Vec::new(),
            error_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the effect to reduce (When)
    #[must_use]
    pub fn when_effect(mut self, effect: R::Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the emitted side effect (Then)
    #[must_use]
    pub fn then_side_effect<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(Option<&R::SideEffect>) + 'static,
    {
        self.side_effect_assertions.push(Box::new(assertion));
        self
    }

    /// Expect the reduce step to fail, and assert on the error (Then)
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&ReduceError) + 'static,
    {
        self.error_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state or effect is not set, if the reduce outcome
    /// does not match the kind of assertions registered (error assertions
    /// expect a failure, all others expect success), or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let effect = self.effect.expect("Effect must be set with when_effect()");

        let expects_error = !self.error_assertions.is_empty();

        match self.reducer.reduce(&state, effect) {
            Ok(result) => {
                assert!(
                    !expects_error,
                    "Expected reduce to fail, but it produced {:?}",
                    result.state
                );

                for assertion in self.state_assertions {
                    assertion(&result.state);
                }

                for assertion in self.side_effect_assertions {
                    assertion(result.side_effect.as_ref());
                }
            },
            Err(error) => {
                assert!(expects_error, "Expected reduce to succeed, but it failed: {error}");

                for assertion in self.error_assertions {
                    assertion(&error);
                }
            },
        }
    }
}

/// Helper assertions for side effects
pub mod assertions {
    use std::fmt::Debug;

    /// Assert that no side effect was emitted
    ///
    /// # Panics
    ///
    /// Panics if a side effect is present.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_side_effect<SE: Debug>(side_effect: Option<&SE>) {
        assert!(
            side_effect.is_none(),
            "Expected no side effect, but found {side_effect:?}"
        );
    }

    /// Assert that exactly `expected` was emitted
    ///
    /// # Panics
    ///
    /// Panics if no side effect, or a different one, was emitted.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_side_effect<SE: Debug + PartialEq>(side_effect: Option<&SE>, expected: &SE) {
        assert_eq!(
            side_effect,
            Some(expected),
            "Expected side effect {expected:?}, but found {side_effect:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_mvi_core::reducer::ReduceResult;

    #[derive(Clone, Debug, PartialEq)]
    struct TestState {
        count: u8,
    }

    #[derive(Debug)]
    enum TestEffect {
        Increment,
        Reset,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestSideEffect {
        WasReset,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Effect = TestEffect;
        type SideEffect = TestSideEffect;

        fn reduce(
            &self,
            state: &TestState,
            effect: TestEffect,
        ) -> Result<ReduceResult<TestState, TestSideEffect>, ReduceError> {
            match effect {
                TestEffect::Increment => state
                    .count
                    .checked_add(1)
                    .map(|count| ReduceResult::new(TestState { count }))
                    .ok_or_else(|| ReduceError::new("count overflow")),
                TestEffect::Reset => Ok(ReduceResult::with_side_effect(
                    TestState { count: 0 },
                    TestSideEffect::WasReset,
                )),
            }
        }
    }

    #[test]
    fn test_reducer_test_increment() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_effect(TestEffect::Increment)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .then_side_effect(assertions::assert_no_side_effect)
            .run();
    }

    #[test]
    fn test_reducer_test_side_effect() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 9 })
            .when_effect(TestEffect::Reset)
            .then_state(|state| {
                assert_eq!(state.count, 0);
            })
            .then_side_effect(|side_effect| {
                assertions::assert_side_effect(side_effect, &TestSideEffect::WasReset);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_error() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: u8::MAX })
            .when_effect(TestEffect::Increment)
            .then_error(|error| {
                assert_eq!(error.reason(), "count overflow");
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "Expected reduce to fail")]
    fn test_reducer_test_error_expected_but_succeeded() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_effect(TestEffect::Increment)
            .then_error(|_| {})
            .run();
    }

    #[test]
    #[should_panic(expected = "Initial state must be set")]
    fn test_reducer_test_requires_state() {
        ReducerTest::new(TestReducer)
            .when_effect(TestEffect::Reset)
            .run();
    }
}
