//! Metrics for observing the dispatch pipeline.
//!
//! The container records through the [`metrics`] facade. Nothing is exported
//! unless the host application installs a recorder; without one, every
//! macro call is a no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use composable_mvi_runtime::metrics::describe_metrics;
//!
//! install_my_recorder();
//! describe_metrics();
//! ```

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Intents accepted by `dispatch`
pub const INTENTS_DISPATCHED: &str = "container.intents.dispatched";

/// Intents refused because the container was closed
pub const INTENTS_REJECTED: &str = "container.intents.rejected";

/// Pipelines that ran to the end of their stream
pub const INTENTS_COMPLETED: &str = "container.intents.completed";

/// Pipelines abandoned by container shutdown
pub const INTENTS_CANCELLED: &str = "container.intents.cancelled";

/// Pipelines currently running
pub const INTENTS_IN_FLIGHT: &str = "container.intents.in_flight";

/// `Outcome::Fail` values yielded by handlers
pub const OUTCOMES_FAILED: &str = "container.outcomes.failed";

/// Failures caught at the pipeline boundary and sent to the reporter
pub const PIPELINE_FAILURES: &str = "container.pipeline.failures";

/// Time spent inside a single reduce step
pub const REDUCE_DURATION: &str = "container.reduce.duration_seconds";

/// Containers closed explicitly
pub const CONTAINER_CLOSED: &str = "container.closed";

/// Register descriptions for every container metric.
///
/// Call once, after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(INTENTS_DISPATCHED, "Total number of intents dispatched");
    describe_counter!(
        INTENTS_REJECTED,
        "Total number of intents rejected by a closed container"
    );
    describe_counter!(INTENTS_COMPLETED, "Total number of intent pipelines completed");
    describe_counter!(
        INTENTS_CANCELLED,
        "Total number of intent pipelines abandoned on shutdown"
    );
    describe_gauge!(INTENTS_IN_FLIGHT, "Number of intent pipelines currently running");
    describe_counter!(OUTCOMES_FAILED, "Total number of failed outcomes yielded by handlers");
    describe_counter!(
        PIPELINE_FAILURES,
        "Total number of reduce errors and panics caught by the pipeline"
    );
    describe_histogram!(
        REDUCE_DURATION,
        Unit::Seconds,
        "Duration of a single reduce step"
    );
    describe_counter!(CONTAINER_CLOSED, "Total number of containers closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_without_recorder_is_noop() {
        describe_metrics();
        counter!(INTENTS_DISPATCHED).increment(1);
        gauge!(INTENTS_IN_FLIGHT).increment(1.0);
        histogram!(REDUCE_DURATION).record(0.001);
    }

    #[test]
    fn test_metric_names_are_namespaced() {
        for name in [
            INTENTS_DISPATCHED,
            INTENTS_REJECTED,
            INTENTS_COMPLETED,
            INTENTS_CANCELLED,
            INTENTS_IN_FLIGHT,
            OUTCOMES_FAILED,
            PIPELINE_FAILURES,
            REDUCE_DURATION,
            CONTAINER_CLOSED,
        ] {
            assert!(name.starts_with("container."), "{name} is not namespaced");
        }
    }
}
