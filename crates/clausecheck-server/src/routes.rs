use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use clausecheck_core::{format_response, Analyzer, PublicResponse};

use crate::auth::TokenVerifier;
use crate::error::ApiError;
use crate::store::{AnalysisOutcome, AnalysisStore, NewContract};

/// Dependencies for the analyze function. The analyzer strategy is fixed
/// at startup by deployment configuration; it is never chosen per request.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn Analyzer>,
    pub store: Arc<dyn AnalysisStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub model_version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/analyze-contract",
            post(analyze_contract).options(preflight),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    // Missing and empty are the same failure to callers.
    #[serde(default)]
    contract_text: String,
    industry_type: String,
    #[serde(default)]
    file_name: Option<String>,
}

/// `OPTIONS /analyze-contract` short-circuits with an empty 200; the CORS
/// layer decorates it with permissive headers.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// `POST /analyze-contract`: verify the bearer credential, persist the
/// contract, run the configured analyzer, record the outcome, and return
/// the public response shape.
async fn analyze_contract(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PublicResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthenticated)?;
    let principal = state
        .verifier
        .verify(token)
        .await
        .map_err(|_| ApiError::Unauthenticated)?;

    // Parsed by hand so malformed bodies surface through the same flat
    // error payload as every other failure.
    let request: AnalyzeRequest = serde_json::from_slice(&body)
        .map_err(|err| ApiError::Validation(format!("invalid request body: {err}")))?;
    if request.contract_text.is_empty() {
        return Err(ApiError::Validation("Contract text is required".to_string()));
    }

    let contract_id = state
        .store
        .insert_contract(NewContract {
            user_id: principal.user_id.clone(),
            title: request
                .file_name
                .clone()
                .unwrap_or_else(|| "Uploaded Contract".to_string()),
            content: request.contract_text.clone(),
            file_name: request.file_name.clone(),
        })
        .await?;
    let analysis_id = state
        .store
        .begin_analysis(contract_id, &principal.user_id)
        .await?;

    let started = Instant::now();
    match state
        .analyzer
        .analyze(&request.contract_text, &request.industry_type)
        .await
    {
        Ok(result) => {
            state
                .store
                .complete_analysis(
                    analysis_id,
                    AnalysisOutcome {
                        result: result.clone(),
                        processing_time_ms: started.elapsed().as_millis() as u64,
                        model_version: state.model_version.clone(),
                    },
                )
                .await?;
            info!(
                %contract_id,
                risk_score = result.risk_score,
                "contract analysis completed"
            );
            Ok(Json(format_response(result, request.file_name)))
        }
        Err(err) => {
            // Best effort; the analysis row stays inspectable either way.
            if let Err(store_err) = state
                .store
                .fail_analysis(analysis_id, &err.to_string())
                .await
            {
                warn!(%store_err, "could not record analysis failure");
            }
            Err(err.into())
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
