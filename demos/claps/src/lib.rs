//! # Claps Example
//!
//! A claps counter demonstrating the Composable MVI architecture.
//!
//! This example showcases:
//! - Intents, effects and side effects as plain enums
//! - A pure reducer with loading and error capabilities
//! - An async intent handler that reads state after a delay
//! - Injected randomness for deterministic tests
//!
//! ## Behaviour
//!
//! Every click waits for the configured delay, then:
//! - at the threshold, emits a toast and leaves the counter alone
//! - otherwise flips a coin: heads increments, tails fails and resets to 0
//!
//! ## Example
//!
//! ```no_run
//! use claps::{ClapsConfig, ClapsIntent, claps_container};
//! use composable_mvi_runtime::environment::SystemRandom;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), composable_mvi_runtime::ContainerError> {
//! let config = ClapsConfig::default();
//! let container = claps_container(&config, Default::default(), Arc::new(SystemRandom));
//!
//! container.dispatch(ClapsIntent::ClapsClicked)?.wait().await;
//! let claps = container.state_with(|s| s.claps);
//! # Ok(())
//! # }
//! ```

use composable_mvi_core::environment::RandomSource;
use composable_mvi_runtime::{Container, ContainerConfig};
use std::sync::Arc;

pub mod config;
pub mod handler;
pub mod reducer;
pub mod state;

pub use config::ClapsConfig;
pub use handler::{ClapsEnvironment, ClapsHandler};
pub use reducer::ClapsReducer;
pub use state::{ClapsEffect, ClapsError, ClapsIntent, ClapsSideEffect, ClapsState};

/// Container type for the claps feature
pub type ClapsContainer = Container<ClapsReducer, ClapsHandler>;

/// Wire up a claps container from configuration
///
/// Uses the configured threshold, delay and dispatch mode; failures caught
/// by the pipeline go to the default logging reporter.
#[must_use]
pub fn claps_container(
    config: &ClapsConfig,
    initial_state: ClapsState,
    random: Arc<dyn RandomSource>,
) -> ClapsContainer {
    let environment = ClapsEnvironment::new(random)
        .with_delay(config.delay)
        .with_threshold(config.threshold);

    Container::with_config(
        initial_state,
        ClapsReducer,
        ClapsHandler::new(environment),
        ClapsReducer::capabilities(),
        ContainerConfig::default().with_dispatch_mode(config.dispatch_mode),
    )
}

/// Text rendering of what the claps screen shows
pub mod view {
    use crate::state::ClapsState;

    /// Render the screen for `state`, one line per widget
    #[must_use]
    pub fn render(state: &ClapsState, threshold: u32) -> String {
        let mut lines = vec![format!("Max number of claps is: {threshold}")];

        if state.loading {
            lines.push("[loading]".to_string());
        }

        if state.claps < threshold {
            lines.push(format!("Claps : {}", state.claps));
        } else {
            lines.push("Congratulation!!!".to_string());
        }

        if let Some(error) = &state.error {
            lines.push(error.to_string());
        }

        lines.join("\n")
    }

    /// Text of the toast shown for [`ClapsSideEffect::Toast`](crate::ClapsSideEffect::Toast)
    #[must_use]
    pub fn toast(threshold: u32) -> String {
        format!("Claps become {threshold}")
    }

}
