//! Dashboard API endpoints.

use axum::extract::State;
use serde::Deserialize;

use super::{error, success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{DashboardState, DashboardSummary};
use crate::store::LoadOutcome;
use crate::AppState;

/// Request body for overriding the loading flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLoadingRequest {
    pub is_loading: bool,
}

/// GET /api/dashboard - Current dashboard state.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardState> {
    let dashboard = state.store.state().await;
    let is_loading = dashboard.is_loading;
    success(dashboard, is_loading)
}

/// POST /api/dashboard/reload - Fetch a fresh snapshot through the gateway.
pub async fn reload_dashboard(State(state): State<AppState>) -> ApiResult<DashboardState> {
    let outcome = state.store.load().await;
    let dashboard = state.store.state().await;
    let is_loading = dashboard.is_loading;

    match outcome {
        LoadOutcome::Loaded { .. } => success(dashboard, is_loading),
        LoadOutcome::Failed { reason } => error(AppError::Gateway(reason), is_loading),
        LoadOutcome::Disposed => error(
            AppError::Disposed("Dashboard store has been disposed".to_string()),
            is_loading,
        ),
    }
}

/// PUT /api/dashboard/loading - Override the loading flag.
pub async fn set_loading(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SetLoadingRequest>,
) -> ApiResult<DashboardState> {
    state.store.set_loading(request.is_loading).await;
    let dashboard = state.store.state().await;
    let is_loading = dashboard.is_loading;
    success(dashboard, is_loading)
}

/// GET /api/dashboard/summary - Derived progress and benefit counts.
pub async fn get_summary(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let dashboard = state.store.state().await;

    match dashboard.summary() {
        Some(summary) => success(summary, dashboard.is_loading),
        None => error(
            AppError::NotLoaded("Dashboard has not been loaded yet".to_string()),
            dashboard.is_loading,
        ),
    }
}
