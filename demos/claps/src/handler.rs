//! Intent handling for the claps counter.

use crate::state::{ClapsEffect, ClapsError, ClapsIntent, ClapsState};
use composable_mvi_core::environment::RandomSource;
use composable_mvi_core::handler::{IntentHandler, OutcomeStream, StateView};
use composable_mvi_core::outcome::Outcome;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

/// Simulated latency of a click
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Claps at which the counter stops and toasts instead
pub const DEFAULT_THRESHOLD: u32 = 3;

/// Injected dependencies of the claps handler
#[derive(Clone)]
pub struct ClapsEnvironment {
    /// Coin flipped on every click below the threshold
    pub random: Arc<dyn RandomSource>,
    /// Delay before a click is decided
    pub delay: Duration,
    /// Counter value that triggers the toast
    pub threshold: u32,
}

impl ClapsEnvironment {
    /// Environment with the default delay and threshold
    #[must_use]
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self {
            random,
            delay: DEFAULT_DELAY,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the click delay
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the toast threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl std::fmt::Debug for ClapsEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClapsEnvironment")
            .field("delay", &self.delay)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// Claps intent handler
///
/// Each click sleeps for the configured delay, then decides against the
/// state as it is at that point, not as it was when the click happened.
#[derive(Debug, Clone)]
pub struct ClapsHandler {
    environment: ClapsEnvironment,
}

impl ClapsHandler {
    /// Create a handler over `environment`
    #[must_use]
    pub const fn new(environment: ClapsEnvironment) -> Self {
        Self { environment }
    }

    /// The handler's environment
    #[must_use]
    pub const fn environment(&self) -> &ClapsEnvironment {
        &self.environment
    }

    /// Decide the outcome of a click given the current counter
    ///
    /// Flips the coin only below the threshold.
    #[must_use]
    pub fn decide(&self, claps: u32) -> Outcome<ClapsEffect, ClapsError> {
        if claps >= self.environment.threshold {
            Outcome::Success(ClapsEffect::Toast)
        } else if self.environment.random.next_bool() {
            Outcome::Success(ClapsEffect::Claps(claps.saturating_add(1)))
        } else {
            Outcome::Fail(ClapsError::Random)
        }
    }

    fn clicked(&self, state: StateView<ClapsState>) -> OutcomeStream<ClapsEffect, ClapsError> {
        let handler = self.clone();

        async_stream::stream! {
            tokio::time::sleep(handler.environment.delay).await;

            let claps = state.with(|s| s.claps);
            let outcome = handler.decide(claps);
            tracing::debug!(claps, outcome = %outcome.kind(), "Click decided");

            yield outcome;
        }
        .boxed()
    }
}

impl IntentHandler for ClapsHandler {
    type State = ClapsState;
    type Intent = ClapsIntent;
    type Effect = ClapsEffect;
    type Error = ClapsError;

    fn handle(
        &self,
        intent: ClapsIntent,
        state: StateView<ClapsState>,
    ) -> OutcomeStream<ClapsEffect, ClapsError> {
        match intent {
            ClapsIntent::ClapsClicked => self.clicked(state),
        }
    }

    fn on_failure(&self, failure: &ClapsError) {
        tracing::warn!(error = %failure, "Click failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_mvi_testing::ScriptedRandom;

    fn handler(script: impl IntoIterator<Item = bool>) -> (ClapsHandler, ScriptedRandom) {
        let random = ScriptedRandom::new(script);
        let environment = ClapsEnvironment::new(Arc::new(random.clone())).with_delay(Duration::ZERO);
        (ClapsHandler::new(environment), random)
    }

    #[test]
    fn test_decide_at_threshold_toasts_without_flipping() {
        let (handler, random) = handler([true]);

        assert_eq!(handler.decide(3), Outcome::Success(ClapsEffect::Toast));
        assert_eq!(handler.decide(7), Outcome::Success(ClapsEffect::Toast));
        assert_eq!(random.remaining(), 1);
    }

    #[test]
    fn test_decide_below_threshold_flips() {
        let (handler, _) = handler([true, false]);

        assert_eq!(handler.decide(1), Outcome::Success(ClapsEffect::Claps(2)));
        assert_eq!(handler.decide(1), Outcome::Fail(ClapsError::Random));
    }

    #[test]
    fn test_custom_threshold() {
        let (handler, _) = handler([]);
        let handler = ClapsHandler::new(handler.environment().clone().with_threshold(1));

        assert_eq!(handler.decide(1), Outcome::Success(ClapsEffect::Toast));
    }

    #[tokio::test]
    async fn test_clicked_reads_state_after_delay() {
        let (handler, _) = handler([true]);
        let (sender, receiver) = tokio::sync::watch::channel(ClapsState::default());

        let mut outcomes = handler.handle(ClapsIntent::ClapsClicked, StateView::new(receiver));
        sender.send_replace(ClapsState {
            claps: 2,
            ..ClapsState::default()
        });

        assert_eq!(
            outcomes.next().await,
            Some(Outcome::Success(ClapsEffect::Claps(3)))
        );
        assert_eq!(outcomes.next().await, None);
    }
}
