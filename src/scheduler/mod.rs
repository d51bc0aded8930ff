//! Recurring scrape trigger.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::AppState;

/// Tick forever, running one scrape cycle per interval.
///
/// A single task owns the schedule, so scheduled runs never overlap. Cycle
/// errors are logged and the loop continues.
pub async fn run(state: AppState, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately; skip it so startup is quiet.
    interval.tick().await;

    loop {
        interval.tick().await;
        tracing::info!("Running scheduled scrape");
        if let Err(err) = state.pipeline.run_cycle(&state.config.campaign).await {
            tracing::error!("Scheduled scrape failed: {}", err);
        }
    }
}
