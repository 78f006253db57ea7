//! Pure reducer for the claps counter.

use crate::state::{ClapsEffect, ClapsError, ClapsIntent, ClapsSideEffect, ClapsState};
use composable_mvi_core::reducer::{Capabilities, ReduceError, ReduceResult, Reducer};

/// Claps reducer
///
/// Folds handler effects into [`ClapsState`]. Loading and error handling are
/// supplied as capabilities by [`ClapsReducer::capabilities`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClapsReducer;

impl ClapsReducer {
    /// Loading and error capabilities for the claps container
    #[must_use]
    pub fn capabilities() -> Capabilities<ClapsState, ClapsIntent, ClapsError, ClapsSideEffect> {
        Capabilities::none()
            .with_loading(Self::on_loading)
            .with_error(Self::on_error)
    }

    /// A click started: show progress, hide the previous error
    #[must_use]
    pub fn on_loading(
        state: &ClapsState,
        _intent: &ClapsIntent,
    ) -> ReduceResult<ClapsState, ClapsSideEffect> {
        ReduceResult::new(ClapsState {
            loading: true,
            error: None,
            ..state.clone()
        })
    }

    /// A click failed: reset the counter and show the failure
    #[must_use]
    pub fn on_error(
        _state: &ClapsState,
        _intent: &ClapsIntent,
        failure: &ClapsError,
    ) -> ReduceResult<ClapsState, ClapsSideEffect> {
        ReduceResult::new(ClapsState {
            claps: 0,
            loading: false,
            error: Some(failure.clone()),
        })
    }
}

impl Reducer for ClapsReducer {
    type State = ClapsState;
    type Effect = ClapsEffect;
    type SideEffect = ClapsSideEffect;

    fn reduce(
        &self,
        state: &ClapsState,
        effect: ClapsEffect,
    ) -> Result<ReduceResult<ClapsState, ClapsSideEffect>, ReduceError> {
        Ok(match effect {
            ClapsEffect::Claps(claps) => ReduceResult::new(ClapsState {
                claps,
                loading: false,
                error: None,
            }),
            ClapsEffect::Toast => ReduceResult::with_side_effect(
                ClapsState {
                    loading: false,
                    ..state.clone()
                },
                ClapsSideEffect::Toast,
            ),
        })
    }
}
