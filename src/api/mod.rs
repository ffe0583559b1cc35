//! REST API module.
//!
//! Exposes the dashboard store to the view layer. Every response carries the
//! store's loading flag next to the payload.

mod benefits;
mod dashboard;

pub use benefits::*;
pub use dashboard::*;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{AppError, AppErrorWithState};
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub is_loading: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, is_loading: bool) -> Self {
        Self {
            success: true,
            data,
            is_loading,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// JSON body extractor whose rejections use the error envelope.
///
/// Well-formed JSON of the wrong shape is a `VALIDATION_ERROR`; anything axum
/// cannot read as JSON at all is a `BAD_REQUEST`.
pub struct ApiJson<T>(pub T);

impl<T> FromRequest<AppState> for ApiJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppErrorWithState;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let error = match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => return Ok(ApiJson(value)),
            Err(JsonRejection::JsonDataError(rejection)) => {
                AppError::Validation(rejection.body_text())
            }
            Err(rejection) => AppError::BadRequest(rejection.body_text()),
        };
        Err(AppErrorWithState::new(error, state.store.is_loading().await))
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithState>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, is_loading: bool) -> ApiResult<T> {
    Ok(ApiResponse::new(data, is_loading))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, is_loading: bool) -> ApiResult<T> {
    error_with_details(err, None, is_loading)
}

/// Create an error API response with structured details.
pub fn error_with_details<T: Serialize>(
    err: AppError,
    details: Option<serde_json::Value>,
    is_loading: bool,
) -> ApiResult<T> {
    Err(AppErrorWithState {
        error: err,
        details,
        is_loading,
    })
}
