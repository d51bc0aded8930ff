//! Snapshot read endpoints.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Snapshot;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CampaignQuery {
    pub campaign: Option<String>,
}

/// GET /api/data - Full snapshot history for a campaign, oldest first.
pub async fn list_snapshots(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> ApiResult<Vec<Snapshot>> {
    let campaign = query.campaign.unwrap_or_else(|| state.config.campaign.clone());
    let snapshots = state.store.list_for_campaign(&campaign).await?;
    success(snapshots)
}

/// GET /api/data/latest - Most recent snapshot for a campaign.
pub async fn latest_snapshot(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> ApiResult<Snapshot> {
    let campaign = query.campaign.unwrap_or_else(|| state.config.campaign.clone());

    match state.store.find_latest(&campaign).await? {
        Some(snapshot) => success(snapshot),
        None => Err(AppError::NotFound(format!(
            "No snapshots for campaign {}",
            campaign
        ))),
    }
}
