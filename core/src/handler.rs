//! Intent handling contract.
//!
//! An [`IntentHandler`] holds the domain logic of a feature. For every intent
//! it returns a stream of [`Outcome`]s; the runtime filters failures into the
//! error capability and reduces every successful effect.
//!
//! Handlers may suspend (timers, I/O) between items. They read state through
//! a [`StateView`] so that decisions are taken against the state as it is
//! when the handler resumes, not when the intent was dispatched.

use crate::model::{Effect, Intent, State};
use crate::outcome::Outcome;
use futures::stream::BoxStream;
use tokio::sync::watch;

/// Boxed stream of outcomes yielded by a handler
pub type OutcomeStream<F, E> = BoxStream<'static, Outcome<F, E>>;

/// Read-only view of a container's current state
///
/// Cloning a view is cheap; every clone observes the same state cell.
#[derive(Debug, Clone)]
pub struct StateView<S> {
    receiver: watch::Receiver<S>,
}

impl<S: Clone> StateView<S> {
    /// Wrap a watch receiver
    #[must_use]
    pub const fn new(receiver: watch::Receiver<S>) -> Self {
        Self { receiver }
    }

    /// Clone of the current state
    #[must_use]
    pub fn current(&self) -> S {
        self.receiver.borrow().clone()
    }

    /// Read the current state through a closure without cloning it
    pub fn with<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.receiver.borrow())
    }
}

/// Domain logic that turns intents into outcome streams
///
/// # Example
///
/// ```ignore
/// impl IntentHandler for ClapsHandler {
///     type State = ClapsState;
///     type Intent = ClapsIntent;
///     type Effect = ClapsEffect;
///     type Error = ClapsError;
///
///     fn handle(&self, intent: ClapsIntent, state: StateView<ClapsState>)
///         -> OutcomeStream<ClapsEffect, ClapsError>
///     {
///         match intent {
///             ClapsIntent::ClapsClicked => self.clicked(state),
///         }
///     }
/// }
/// ```
pub trait IntentHandler: Send + Sync + 'static {
    /// The state the handler may read
    type State: State;

    /// The intents this handler understands
    type Intent: Intent;

    /// The effects this handler produces
    type Effect: Effect;

    /// Domain failure carried by `Outcome::Fail`
    type Error: std::fmt::Debug + Send + Sync + 'static;

    /// Handle a single intent
    ///
    /// The returned stream may yield any number of outcomes over time. It must
    /// own everything it needs, since it outlives the call.
    ///
    /// When the container has a loading capability, the stream must end with a
    /// `Success` whose reduce clears loading, or with a `Fail` handled by the
    /// error capability. A stream that ends empty, or with only `Loading`
    /// outcomes, leaves the loading state set.
    fn handle(
        &self,
        intent: Self::Intent,
        state: StateView<Self::State>,
    ) -> OutcomeStream<Self::Effect, Self::Error>;

    /// Hook invoked for every failure, before the error capability runs
    ///
    /// The default does nothing; override it for logging or telemetry.
    fn on_failure(&self, _failure: &Self::Error) {}
}
