//! Benefit API endpoints.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{error, error_with_details, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Benefit, BenefitCategory, BenefitFilter, ClaimRecord, ClaimStatus};
use crate::store::ClaimOutcome;
use crate::AppState;

/// Query parameters for the benefits listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BenefitQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl BenefitQuery {
    fn into_filter(self) -> Result<BenefitFilter, AppError> {
        let category = self
            .category
            .map(|raw| {
                BenefitCategory::parse(&raw)
                    .ok_or_else(|| AppError::Validation(format!("Unknown category: {}", raw)))
            })
            .transpose()?;
        let status = self
            .status
            .map(|raw| {
                ClaimStatus::parse(&raw)
                    .ok_or_else(|| AppError::Validation(format!("Unknown status: {}", raw)))
            })
            .transpose()?;
        Ok(BenefitFilter { category, status })
    }
}

/// Response body for a successful claim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub benefit_id: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefit: Option<Benefit>,
}

/// GET /api/benefits - List benefits, optionally filtered.
pub async fn list_benefits(
    State(state): State<AppState>,
    Query(query): Query<BenefitQuery>,
) -> ApiResult<Vec<Benefit>> {
    let benefits = state.store.benefits().await;
    let is_loading = state.store.is_loading().await;

    match query.into_filter() {
        Ok(filter) => success(filter.apply(&benefits), is_loading),
        Err(e) => error(e, is_loading),
    }
}

/// POST /api/benefits/{id}/claim - Claim a benefit.
pub async fn claim_benefit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ClaimResponse> {
    let outcome = state.store.claim(&id).await;
    let dashboard = state.store.state().await;
    let is_loading = dashboard.is_loading;
    let label = outcome.as_str();

    match outcome {
        ClaimOutcome::Claimed | ClaimOutcome::AlreadyClaimed => {
            let benefit = dashboard.benefits.into_iter().find(|b| b.id == id);
            success(
                ClaimResponse {
                    benefit_id: id,
                    outcome: label,
                    benefit,
                },
                is_loading,
            )
        }
        ClaimOutcome::Rejected => error_with_details(
            AppError::ClaimRejected(format!("Benefit {} could not be claimed", id)),
            Some(serde_json::json!({ "benefitId": id })),
            is_loading,
        ),
        ClaimOutcome::InFlight => error_with_details(
            AppError::ClaimInProgress(format!("Benefit {} is already being claimed", id)),
            Some(serde_json::json!({ "benefitId": id })),
            is_loading,
        ),
        ClaimOutcome::UnknownBenefit => error(
            AppError::NotFound(format!("Benefit {} not found", id)),
            is_loading,
        ),
        ClaimOutcome::Failed(reason) => error(AppError::Gateway(reason), is_loading),
        ClaimOutcome::Disposed => error(
            AppError::Disposed("Dashboard store has been disposed".to_string()),
            is_loading,
        ),
    }
}

/// GET /api/benefits/{id}/claims - Recorded claims for a loaded benefit.
pub async fn get_claim_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<ClaimRecord>> {
    let benefits = state.store.benefits().await;
    let is_loading = state.store.is_loading().await;

    if !benefits.iter().any(|b| b.id == id) {
        return error(
            AppError::NotFound(format!("Benefit {} not found", id)),
            is_loading,
        );
    }

    match state.store.claim_history(&id).await {
        Ok(Some(records)) => success(records, is_loading),
        Ok(None) => error(
            AppError::NotFound(format!(
                "The {} gateway does not record claim history",
                state.store.gateway_name()
            )),
            is_loading,
        ),
        Err(e) => error(AppError::from(e), is_loading),
    }
}
