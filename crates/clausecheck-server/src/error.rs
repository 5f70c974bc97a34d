use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use clausecheck_core::AnalysisError;

use crate::store::StoreError;

/// Boundary error for the analyze function. Every failure class
/// (validation, authentication, upstream model, persistence) surfaces as
/// the same flat `{"error": message}` payload with HTTP 500; clients only
/// ever branch on the presence of the `error` key.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    Validation(String),
    Analysis(AnalysisError),
    Store(StoreError),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        Self::Analysis(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Unauthenticated => "User not authenticated".to_string(),
            Self::Validation(message) => message.clone(),
            Self::Analysis(err) => err.to_string(),
            Self::Store(err) => err.to_string(),
        };
        tracing::error!(%message, "analyze-contract request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}
