//! Claps state, intents, effects and side effects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the claps screen shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClapsState {
    /// Number of successful claps, reset to 0 on failure
    pub claps: u32,
    /// A click is being handled
    pub loading: bool,
    /// Failure of the last click, cleared by the next one
    pub error: Option<ClapsError>,
}

/// User requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClapsIntent {
    /// The clap button was pressed
    ClapsClicked,
}

/// State transitions requested by the handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClapsEffect {
    /// Set the counter
    Claps(u32),
    /// Threshold reached, notify the user
    Toast,
}

/// One-shot notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClapsSideEffect {
    /// Show the "threshold reached" toast
    Toast,
}

/// Domain failures of a click
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClapsError {
    /// The coin flip came up tails
    #[error("A Random Exception")]
    Random,
}
