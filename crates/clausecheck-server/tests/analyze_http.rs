//! End-to-end tests for the analyze function: routing, auth, validation,
//! persistence transitions, and the flat error contract.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use clausecheck_core::{AnalysisError, AnalysisResult, Analyzer, HeuristicAnalyzer, Lexicon};
use clausecheck_server::{router, AnalysisStatus, AppState, InMemoryAnalysisStore, StaticTokenVerifier};

struct FailingAnalyzer;

#[async_trait]
impl Analyzer for FailingAnalyzer {
    async fn analyze(&self, _: &str, _: &str) -> Result<AnalysisResult, AnalysisError> {
        Err(AnalysisError::Upstream("completion endpoint returned 503".into()))
    }
}

fn heuristic_state(store: Arc<InMemoryAnalysisStore>) -> AppState {
    AppState {
        analyzer: Arc::new(HeuristicAnalyzer::new(Lexicon::builtin()).unwrap()),
        store,
        verifier: Arc::new(StaticTokenVerifier::new().with_token("good-token", "user-1")),
        model_version: "rule-based-v1".to_string(),
    }
}

fn analyze_request(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/analyze-contract")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "http://localhost:5173");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn analyzes_contract_and_persists_records() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store.clone()));

    let response = app
        .oneshot(analyze_request(
            Some("good-token"),
            json!({
                "contractText": "The vendor accepts unlimited liability and binding arbitration.",
                "industryType": "tech",
                "fileName": "msa.pdf"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));

    let body = body_json(response).await;
    assert_eq!(body["fileName"], "msa.pdf");
    assert_eq!(body["overallRisk"], "medium");
    assert_eq!(body["riskyClauses"].as_array().unwrap().len(), 2);
    assert!(body["plainEnglishSummary"]
        .as_str()
        .unwrap()
        .contains("tech contract"));
    assert_eq!(body["negotiationPoints"].as_array().unwrap().len(), 1);

    let contracts = store.contracts();
    assert_eq!(contracts.len(), 1);
    assert_eq!(contracts[0].user_id, "user-1");
    assert_eq!(contracts[0].title, "msa.pdf");
    assert_eq!(contracts[0].status, "active");

    let analyses = store.analyses();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].status, AnalysisStatus::Completed);
    assert_eq!(analyses[0].risk_score, Some(53));
    assert_eq!(analyses[0].model_version.as_deref(), Some("rule-based-v1"));
    assert!(analyses[0].processing_time_ms.is_some());
    assert!(analyses[0].completed_at.is_some());
}

#[tokio::test]
async fn missing_bearer_token_fails_before_analysis() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store.clone()));

    let response = app
        .oneshot(analyze_request(
            None,
            json!({ "contractText": "text", "industryType": "general" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "User not authenticated");
    assert!(store.contracts().is_empty());
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store.clone()));

    let response = app
        .oneshot(analyze_request(
            Some("stolen-token"),
            json!({ "contractText": "text", "industryType": "general" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.contracts().is_empty());
}

#[tokio::test]
async fn empty_contract_text_is_rejected() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store.clone()));

    let response = app
        .oneshot(analyze_request(
            Some("good-token"),
            json!({ "contractText": "", "industryType": "general" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Contract text is required");
    assert!(store.contracts().is_empty());
}

#[tokio::test]
async fn missing_contract_text_is_rejected_like_empty() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store.clone()));

    let response = app
        .oneshot(analyze_request(
            Some("good-token"),
            json!({ "industryType": "general" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Contract text is required");
    assert!(store.contracts().is_empty());
}

#[tokio::test]
async fn malformed_body_surfaces_flat_error() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store));

    let request = Request::builder()
        .method("POST")
        .uri("/analyze-contract")
        .header(header::AUTHORIZATION, "Bearer good-token")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("invalid request body"));
}

#[tokio::test]
async fn analyzer_failure_marks_analysis_failed_without_rollback() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let state = AppState {
        analyzer: Arc::new(FailingAnalyzer),
        store: store.clone(),
        verifier: Arc::new(StaticTokenVerifier::new().with_token("good-token", "user-1")),
        model_version: "gpt-4o-mini".to_string(),
    };
    let app = router(state);

    let response = app
        .oneshot(analyze_request(
            Some("good-token"),
            json!({ "contractText": "some contract", "industryType": "general" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("model request failed"));

    // Partial progress is kept: the contract row stays, the analysis row is
    // marked failed for later inspection.
    assert_eq!(store.contracts().len(), 1);
    let analyses = store.analyses();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].status, AnalysisStatus::Failed);
    assert!(analyses[0].error.as_deref().unwrap().contains("503"));
}

#[tokio::test]
async fn options_short_circuits_with_empty_200() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/analyze-contract")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn default_file_name_is_applied() {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let app = router(heuristic_state(store.clone()));

    let response = app
        .oneshot(analyze_request(
            Some("good-token"),
            json!({ "contractText": "plain terms", "industryType": "retail" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["fileName"], "Uploaded Contract");
    assert_eq!(store.contracts()[0].title, "Uploaded Contract");
    assert_eq!(store.contracts()[0].file_name, None);
}
