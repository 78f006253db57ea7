//! Claps example binary
//!
//! Drives the claps container from a scripted click loop and prints what
//! the screen would show after every click.

use anyhow::Context;
use claps::{ClapsConfig, ClapsIntent, ClapsSideEffect, ClapsState, claps_container, view};
use composable_mvi_runtime::environment::SystemRandom;
use composable_mvi_runtime::metrics::describe_metrics;
use composable_mvi_runtime::snapshot::restore_state;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claps=debug,composable_mvi_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    describe_metrics();

    let config = ClapsConfig::from_env();
    tracing::info!(?config, "Starting claps demo");

    let initial_state = match &config.restore_state {
        Some(snapshot) => restore_state::<ClapsState>(snapshot)
            .context("CLAPS_RESTORE_STATE is not a valid claps snapshot")?,
        None => ClapsState::default(),
    };

    println!("=== Claps Example: Composable MVI Architecture ===\n");

    let container = claps_container(&config, initial_state, Arc::new(SystemRandom));

    let mut side_effects = container.subscribe_side_effects();
    let threshold = config.threshold;
    let toasts = tokio::spawn(async move {
        loop {
            match side_effects.recv().await {
                Ok(ClapsSideEffect::Toast) => println!("  (toast) {}", view::toast(threshold)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Toast listener lagged");
                },
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{}", view::render(&container.state(), threshold));

    for click in 1..=config.clicks {
        println!("\n>>> Click {click}");
        let handle = container.dispatch(ClapsIntent::ClapsClicked)?;
        println!("{}", view::render(&container.state(), threshold));

        handle.wait().await;
        println!("{}", view::render(&container.state(), threshold));
    }

    let snapshot = container.snapshot()?;
    println!("\nFinal snapshot: {snapshot}");

    container.close();
    drop(container);
    toasts.await.context("toast listener failed")?;

    Ok(())
}
