//! Scrape endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::scrape::CycleOutcome;
use crate::AppState;

/// GET /api/scrape - Run one scrape cycle for the configured campaign.
///
/// Same contract as the scheduled trigger: per-page failures degrade
/// entries, only store failures surface as errors.
pub async fn run_scrape(State(state): State<AppState>) -> ApiResult<CycleOutcome> {
    let outcome = state.pipeline.run_cycle(&state.config.campaign).await?;
    success(outcome)
}
