//! # Composable MVI Runtime
//!
//! Runtime implementation for the Composable MVI architecture.
//!
//! This crate provides the [`Container`] that owns a feature's state and
//! drives the intent pipeline:
//!
//! ```text
//! dispatch(intent)
//!   → on_loading capability (synchronous)
//!   → IntentHandler::handle (spawned task, may suspend)
//!   → Outcome::Fail    → on_failure hook → on_error capability
//!   → Outcome::Success → Reducer::reduce → publish state → publish side effect
//! ```
//!
//! State is published on a latest-value cell (`tokio::sync::watch`); side
//! effects on an event channel (`tokio::sync::broadcast`) that never replays.
//!
//! ## Example
//!
//! ```ignore
//! use composable_mvi_runtime::Container;
//!
//! let container = Container::new(
//!     ClapsState::default(),
//!     ClapsReducer,
//!     handler,
//!     ClapsReducer::capabilities(),
//! );
//!
//! let mut toasts = container.subscribe_side_effects();
//! let handle = container.dispatch(ClapsIntent::ClapsClicked)?;
//! handle.wait().await;
//!
//! let claps = container.state_with(|s| s.claps);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Deterministic and system implementations of environment traits
pub mod environment;

/// Metric names and descriptions for observability
pub mod metrics;

/// JSON snapshots for restoring state across restarts
pub mod snapshot;

/// Error types for the Container runtime
pub mod error {
    use crate::snapshot::SnapshotError;
    use composable_mvi_core::reducer::ReduceError;
    use thiserror::Error;

    /// Errors returned to callers of the Container API
    #[derive(Error, Debug)]
    pub enum ContainerError {
        /// Container was closed and no longer accepts intents
        #[error("Container is closed")]
        Closed,

        /// `dispatch` was called outside of a tokio runtime
        #[error("No tokio runtime available to run the intent")]
        NoRuntime,

        /// Timeout waiting for a dispatched intent to finish
        #[error("Timeout waiting for dispatch to complete")]
        Timeout,

        /// State could not be snapshotted
        #[error("State snapshot failed: {0}")]
        Snapshot(#[from] SnapshotError),
    }

    /// Failures caught at the pipeline boundary
    ///
    /// These never reach state. They are handed to the container's
    /// [`Reporter`](crate::Reporter) and the prior state stays authoritative.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum DispatchError {
        /// The reducer rejected an effect
        #[error(transparent)]
        Reduce(#[from] ReduceError),

        /// A reducer, capability or handler stream panicked
        #[error("Dispatch pipeline panicked: {0}")]
        Panicked(String),
    }
}

pub use container::Container;
pub use error::{ContainerError, DispatchError};

/// Pluggable sink for pipeline failures
pub type Reporter = Arc<dyn Fn(&DispatchError) + Send + Sync>;

/// Default reporter: log the failure and carry on
#[must_use]
pub fn log_reporter() -> Reporter {
    Arc::new(|error| {
        tracing::error!(error = %error, "Dispatch pipeline failed");
    })
}

/// How concurrent intents relate to each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Every intent runs independently; reduce steps interleave in whatever
    /// order the scheduler picks and the last write wins
    #[default]
    Concurrent,

    /// Intents run one at a time, in the order they acquire the dispatch lock
    ///
    /// The loading capability still runs synchronously inside `dispatch`.
    /// While intents are queued behind the running one, every state it
    /// publishes has the loading capability re-applied, so loading is only
    /// cleared by the last queued intent.
    Serialized,
}

/// Configuration for Container instances
///
/// # Example
///
/// ```ignore
/// let config = ContainerConfig::default()
///     .with_side_effect_capacity(64)
///     .with_dispatch_mode(DispatchMode::Serialized)
///     .with_reporter(|error| eprintln!("pipeline failed: {error}"));
///
/// let container = Container::with_config(state, reducer, handler, capabilities, config);
/// ```
#[derive(Clone)]
pub struct ContainerConfig {
    /// Buffer size of the side-effect channel per subscriber
    pub side_effect_capacity: usize,
    /// Concurrency policy for dispatched intents
    pub dispatch_mode: DispatchMode,
    /// Sink for failures caught at the pipeline boundary
    pub reporter: Reporter,
}

impl ContainerConfig {
    /// Set the side-effect channel capacity (minimum 1)
    #[must_use]
    pub fn with_side_effect_capacity(mut self, capacity: usize) -> Self {
        self.side_effect_capacity = capacity.max(1);
        self
    }

    /// Set the dispatch mode
    #[must_use]
    pub const fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = mode;
        self
    }

    /// Replace the failure reporter
    #[must_use]
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.reporter = Arc::new(reporter);
        self
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            side_effect_capacity: 16,
            dispatch_mode: DispatchMode::default(),
            reporter: log_reporter(),
        }
    }
}

impl std::fmt::Debug for ContainerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerConfig")
            .field("side_effect_capacity", &self.side_effect_capacity)
            .field("dispatch_mode", &self.dispatch_mode)
            .finish_non_exhaustive()
    }
}

/// How a dispatched intent ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The handler stream was fully consumed (or stopped after a reported failure)
    Completed,
    /// The container was closed or dropped, or the handle aborted, before the
    /// intent finished; its remaining results were discarded
    Cancelled,
}

/// Handle for a dispatched intent
///
/// Dispatch is fire-and-forget: dropping the handle does not cancel the
/// intent. Keep it to wait for completion or to abort a single intent.
///
/// # Example
///
/// ```ignore
/// let handle = container.dispatch(ClapsIntent::ClapsClicked)?;
/// assert_eq!(handle.wait().await, DispatchStatus::Completed);
/// ```
#[derive(Debug)]
pub struct DispatchHandle {
    task: JoinHandle<DispatchStatus>,
}

impl DispatchHandle {
    /// Wait for the intent to finish
    pub async fn wait(self) -> DispatchStatus {
        match self.task.await {
            Ok(status) => status,
            Err(error) => {
                if error.is_panic() {
                    tracing::error!(error = %error, "Dispatch task panicked outside the pipeline");
                }
                DispatchStatus::Cancelled
            },
        }
    }

    /// Wait for the intent to finish, giving up after `timeout`
    ///
    /// The intent keeps running after a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Timeout`] if the intent is still running when
    /// the timeout expires.
    pub async fn wait_with_timeout(self, timeout: Duration) -> Result<DispatchStatus, ContainerError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ContainerError::Timeout)
    }

    /// Abandon this intent; results it has not reduced yet are discarded
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Whether the intent has finished
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Guard that decrements the in-flight counter on drop
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        metrics::gauge!(metrics::INTENTS_IN_FLIGHT).increment(1.0);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
        metrics::gauge!(metrics::INTENTS_IN_FLIGHT).decrement(1.0);
    }
}

/// Marks an intent as waiting for the serialized dispatch lock
///
/// Dropped once the lock is acquired, or when the intent is abandoned first.
struct QueuedGuard(Arc<AtomicUsize>);

impl QueuedGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for QueuedGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Render a panic payload for reporting
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Container module - The runtime for reducers and intent handlers
pub mod container {
    use super::{
        Arc, AtomicUsize, ContainerConfig, ContainerError, DispatchError, DispatchHandle,
        DispatchMode, DispatchStatus, InFlightGuard, Ordering, QueuedGuard, Reporter,
        panic_message,
    };
    use crate::snapshot;
    use composable_mvi_core::handler::{IntentHandler, StateView};
    use composable_mvi_core::outcome::Outcome;
    use composable_mvi_core::reducer::{Capabilities, ReduceError, ReduceResult, Reducer};
    use futures::{FutureExt, Stream, StreamExt};
    use std::future::Future;
    use std::panic::{self, AssertUnwindSafe};
    use tokio::runtime::Handle;
    use tokio::sync::{Mutex, MutexGuard, broadcast, watch};

    /// Capabilities matching a reducer/handler pair
    pub type ContainerCapabilities<R, H> = Capabilities<
        <R as Reducer>::State,
        <H as IntentHandler>::Intent,
        <H as IntentHandler>::Error,
        <R as Reducer>::SideEffect,
    >;

    type StepResult<R> =
        Result<Option<ReduceResult<<R as Reducer>::State, <R as Reducer>::SideEffect>>, ReduceError>;

    /// State shared between the container and its in-flight intents
    struct Shared<R, H>
    where
        R: Reducer,
        H: IntentHandler<State = R::State, Effect = R::Effect>,
    {
        reducer: R,
        handler: H,
        capabilities: ContainerCapabilities<R, H>,
        state: watch::Sender<R::State>,
        side_effects: broadcast::Sender<R::SideEffect>,
        reporter: Reporter,
        serial: Option<Mutex<()>>,
        queued: Arc<AtomicUsize>,
    }

    /// The Container - owner of a feature's state and its output channels
    ///
    /// The Container manages:
    /// 1. State (a `watch` cell holding exactly one authoritative value)
    /// 2. Side effects (a `broadcast` channel, at-most-once to active subscribers)
    /// 3. Intent dispatch (one task per intent, cancelled on close or drop)
    ///
    /// # Type Parameters
    ///
    /// - `R`: Reducer implementation
    /// - `H`: Intent handler producing effects for `R`
    ///
    /// # Lifetime
    ///
    /// In-flight intents are tied to the container: calling [`Container::close`]
    /// or dropping the container abandons them and discards their results.
    pub struct Container<R, H>
    where
        R: Reducer,
        H: IntentHandler<State = R::State, Effect = R::Effect>,
    {
        shared: Arc<Shared<R, H>>,
        shutdown: watch::Sender<bool>,
        in_flight: Arc<AtomicUsize>,
    }

    impl<R, H> Container<R, H>
    where
        R: Reducer,
        H: IntentHandler<State = R::State, Effect = R::Effect>,
    {
        /// Create a container with default configuration
        ///
        /// Defaults: concurrent dispatch, side-effect capacity 16, failures
        /// logged through `tracing`.
        #[must_use]
        pub fn new(
            initial_state: R::State,
            reducer: R,
            handler: H,
            capabilities: ContainerCapabilities<R, H>,
        ) -> Self {
            Self::with_config(
                initial_state,
                reducer,
                handler,
                capabilities,
                ContainerConfig::default(),
            )
        }

        /// Create a container with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: R::State,
            reducer: R,
            handler: H,
            capabilities: ContainerCapabilities<R, H>,
            config: ContainerConfig,
        ) -> Self {
            let (state, _) = watch::channel(initial_state);
            let (side_effects, _) = broadcast::channel(config.side_effect_capacity.max(1));
            let (shutdown, _) = watch::channel(false);
            let serial = match config.dispatch_mode {
                DispatchMode::Concurrent => None,
                DispatchMode::Serialized => Some(Mutex::new(())),
            };

            tracing::debug!(
                dispatch_mode = ?config.dispatch_mode,
                capabilities = ?capabilities,
                "Container created"
            );

            Self {
                shared: Arc::new(Shared {
                    reducer,
                    handler,
                    capabilities,
                    state,
                    side_effects,
                    reporter: config.reporter,
                    serial,
                    queued: Arc::new(AtomicUsize::new(0)),
                }),
                shutdown,
                in_flight: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Clone of the current state
        #[must_use]
        pub fn state(&self) -> R::State {
            self.shared.state.borrow().clone()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let claps = container.state_with(|s| s.claps);
        /// ```
        pub fn state_with<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State) -> T,
        {
            f(&self.shared.state.borrow())
        }

        /// Subscribe to state changes
        ///
        /// The receiver always holds the latest state; intermediate values may
        /// be skipped by slow readers.
        #[must_use]
        pub fn subscribe_state(&self) -> watch::Receiver<R::State> {
            self.shared.state.subscribe()
        }

        /// Subscribe to side effects
        ///
        /// Only side effects emitted after this call are delivered. Nothing is
        /// replayed, and emissions with no subscribers are dropped.
        #[must_use]
        pub fn subscribe_side_effects(&self) -> broadcast::Receiver<R::SideEffect> {
            self.shared.side_effects.subscribe()
        }

        /// Read-only view of the state, as handed to intent handlers
        #[must_use]
        pub fn state_view(&self) -> StateView<R::State> {
            StateView::new(self.shared.state.subscribe())
        }

        /// The capabilities this container applies
        #[must_use]
        pub fn capabilities(&self) -> &ContainerCapabilities<R, H> {
            &self.shared.capabilities
        }

        /// Number of dispatched intents that have not finished yet
        #[must_use]
        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        /// Whether [`Container::close`] has been called
        #[must_use]
        pub fn is_closed(&self) -> bool {
            *self.shutdown.borrow()
        }

        /// Stop accepting intents and abandon the in-flight ones
        ///
        /// State and side-effect subscribers keep the last published values.
        pub fn close(&self) {
            if self.shutdown.send_replace(true) {
                return;
            }
            tracing::info!(in_flight = self.in_flight(), "Closing container");
            metrics::counter!(crate::metrics::CONTAINER_CLOSED).increment(1);
        }

        /// Serialize the current state for later restoration
        ///
        /// # Errors
        ///
        /// Returns [`ContainerError::Snapshot`] if the state cannot be encoded.
        pub fn snapshot(&self) -> Result<String, ContainerError>
        where
            R::State: serde::Serialize,
        {
            let state = self.shared.state.borrow();
            Ok(snapshot::save_state(&*state)?)
        }

        /// Dispatch an intent
        ///
        /// 1. Applies the loading capability, if present, before returning
        /// 2. Spawns a task that runs the handler and reduces its outcomes
        ///
        /// Returns immediately; the returned handle may be ignored.
        ///
        /// # Concurrency
        ///
        /// With [`DispatchMode::Concurrent`] intents race: their reduce steps
        /// interleave and the last write wins. Each individual reduce step is
        /// atomic. With [`DispatchMode::Serialized`] intents run one at a time.
        ///
        /// # Errors
        ///
        /// - [`ContainerError::Closed`] if the container was closed
        /// - [`ContainerError::NoRuntime`] if called outside a tokio runtime
        #[tracing::instrument(skip(self), name = "container_dispatch")]
        pub fn dispatch(&self, intent: H::Intent) -> Result<DispatchHandle, ContainerError> {
            let runtime = self.ensure_accepting()?;
            metrics::counter!(crate::metrics::INTENTS_DISPATCHED).increment(1);

            if self.shared.capabilities.supports_loading() {
                tracing::trace!("Applying loading capability");
                let capabilities = &self.shared.capabilities;
                self.shared
                    .apply(None, |state| Ok(capabilities.on_loading(state, &intent)));
            }

            let queued = self
                .shared
                .serial
                .as_ref()
                .map(|_| QueuedGuard::acquire(&self.shared.queued));
            let shared = Arc::clone(&self.shared);
            Ok(self.spawn_tracked(&runtime, async move {
                shared.run_intent(intent, queued).await;
            }))
        }

        /// Feed a stream of effects straight into the reducer
        ///
        /// No intent is involved, so neither capability runs. A reduce failure
        /// is reported and stops the stream.
        ///
        /// # Errors
        ///
        /// - [`ContainerError::Closed`] if the container was closed
        /// - [`ContainerError::NoRuntime`] if called outside a tokio runtime
        pub fn dispatch_effects<St>(&self, effects: St) -> Result<DispatchHandle, ContainerError>
        where
            St: Stream<Item = R::Effect> + Send + 'static,
        {
            let runtime = self.ensure_accepting()?;
            let shared = Arc::clone(&self.shared);
            Ok(self.spawn_tracked(&runtime, async move {
                let _permit = shared.serialize().await;
                shared.reduce_all(effects).await;
            }))
        }

        fn ensure_accepting(&self) -> Result<Handle, ContainerError> {
            if self.is_closed() {
                tracing::warn!("Rejected intent: container is closed");
                metrics::counter!(crate::metrics::INTENTS_REJECTED).increment(1);
                return Err(ContainerError::Closed);
            }
            Handle::try_current().map_err(|_| ContainerError::NoRuntime)
        }

        /// Spawn a pipeline that is abandoned when the container shuts down
        fn spawn_tracked<Fut>(&self, runtime: &Handle, pipeline: Fut) -> DispatchHandle
        where
            Fut: Future<Output = ()> + Send + 'static,
        {
            let mut shutdown = self.shutdown.subscribe();
            let reporter = Arc::clone(&self.shared.reporter);
            let guard = InFlightGuard::acquire(&self.in_flight);

            let task = runtime.spawn(async move {
                let _guard = guard;

                tokio::select! {
                    result = AssertUnwindSafe(pipeline).catch_unwind() => {
                        if let Err(payload) = result {
                            let error = DispatchError::Panicked(panic_message(payload.as_ref()));
                            metrics::counter!(crate::metrics::PIPELINE_FAILURES).increment(1);
                            reporter(&error);
                        }
                        metrics::counter!(crate::metrics::INTENTS_COMPLETED).increment(1);
                        DispatchStatus::Completed
                    }
                    _ = shutdown.wait_for(|closed| *closed) => {
                        tracing::debug!("Container shut down, abandoning in-flight intent");
                        metrics::counter!(crate::metrics::INTENTS_CANCELLED).increment(1);
                        DispatchStatus::Cancelled
                    }
                }
            });

            DispatchHandle { task }
        }
    }

    impl<R, H> std::fmt::Debug for Container<R, H>
    where
        R: Reducer,
        H: IntentHandler<State = R::State, Effect = R::Effect>,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Container")
                .field("state", &*self.shared.state.borrow())
                .field("capabilities", &self.shared.capabilities)
                .field("in_flight", &self.in_flight())
                .field("closed", &self.is_closed())
                .finish_non_exhaustive()
        }
    }

    impl<R, H> Shared<R, H>
    where
        R: Reducer,
        H: IntentHandler<State = R::State, Effect = R::Effect>,
    {
        /// Hold the dispatch lock when running serialized
        async fn serialize(&self) -> Option<MutexGuard<'_, ()>> {
            match &self.serial {
                Some(lock) => Some(lock.lock().await),
                None => None,
            }
        }

        async fn run_intent(&self, intent: H::Intent, queued: Option<QueuedGuard>) {
            let _permit = self.serialize().await;
            drop(queued);

            let view = StateView::new(self.state.subscribe());
            let mut outcomes = self.handler.handle(intent.clone(), view);

            while let Some(outcome) = outcomes.next().await {
                match outcome {
                    Outcome::Success(effect) => {
                        if !self.reduce(Some(&intent), effect) {
                            tracing::debug!("Discarding remaining outcomes after reduce failure");
                            break;
                        }
                    },
                    Outcome::Fail(failure) => self.fail(&intent, &failure),
                    Outcome::Loading => tracing::trace!("Skipping loading outcome"),
                }
            }
        }

        async fn reduce_all<St>(&self, effects: St)
        where
            St: Stream<Item = R::Effect>,
        {
            let mut effects = std::pin::pin!(effects);
            while let Some(effect) = effects.next().await {
                if !self.reduce(None, effect) {
                    tracing::debug!("Discarding remaining effects after reduce failure");
                    break;
                }
            }
        }

        fn fail(&self, intent: &H::Intent, failure: &H::Error) {
            tracing::debug!(?failure, "Intent handler yielded a failure");
            metrics::counter!(crate::metrics::OUTCOMES_FAILED).increment(1);

            self.handler.on_failure(failure);

            if self.capabilities.supports_error() {
                let capabilities = &self.capabilities;
                self.apply(Some(intent), |state| {
                    Ok(capabilities.on_error(state, intent, failure))
                });
            }
        }

        fn reduce(&self, intent: Option<&H::Intent>, effect: R::Effect) -> bool {
            tracing::trace!(?effect, "Reducing effect");
            let start = std::time::Instant::now();
            let reducer = &self.reducer;
            let applied = self.apply(intent, |state| reducer.reduce(state, effect).map(Some));
            metrics::histogram!(crate::metrics::REDUCE_DURATION).record(start.elapsed().as_secs_f64());
            applied
        }

        /// Run one state transition atomically and publish its results
        ///
        /// The step runs while the state cell is write-locked, so it always
        /// sees the latest state and no other step can interleave with it.
        /// When `intent` is given and serialized intents are still queued,
        /// the loading capability is re-applied to the next state within the
        /// same step; its side effect, if any, is dropped.
        /// Returns `false` when the step failed and was reported.
        fn apply<F>(&self, intent: Option<&H::Intent>, step: F) -> bool
        where
            F: FnOnce(&R::State) -> StepResult<R>,
        {
            let mut side_effect = None;
            let mut failure = None;
            let capabilities = &self.capabilities;
            let queued = &self.queued;

            let transition = |current: &R::State| -> StepResult<R> {
                let Some(result) = step(current)? else {
                    return Ok(None);
                };
                match intent {
                    Some(intent) if queued.load(Ordering::SeqCst) > 0 => {
                        let (next, emitted) = result.into_parts();
                        let next = capabilities
                            .on_loading(&next, intent)
                            .map_or(next, |loading| loading.state);
                        Ok(Some(ReduceResult {
                            state: next,
                            side_effect: emitted,
                        }))
                    },
                    _ => Ok(Some(result)),
                }
            };

            self.state.send_if_modified(|current| {
                match panic::catch_unwind(AssertUnwindSafe(|| transition(current))) {
                    Ok(Ok(Some(result))) => {
                        let (next, emitted) = result.into_parts();
                        *current = next;
                        side_effect = emitted;
                        true
                    },
                    Ok(Ok(None)) => false,
                    Ok(Err(error)) => {
                        failure = Some(DispatchError::Reduce(error));
                        false
                    },
                    Err(payload) => {
                        failure = Some(DispatchError::Panicked(panic_message(payload.as_ref())));
                        false
                    },
                }
            });

            if let Some(error) = failure {
                metrics::counter!(crate::metrics::PIPELINE_FAILURES).increment(1);
                (self.reporter)(&error);
                return false;
            }

            if let Some(side_effect) = side_effect {
                tracing::debug!(?side_effect, "Publishing side effect");
                if self.side_effects.send(side_effect).is_err() {
                    tracing::trace!("No side effect subscribers, emission dropped");
                }
            }

            true
        }
    }
}
