use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use clausecheck_core::AnalysisResult;

/// Contract row handed to the storage collaborator.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContractRecord {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub file_name: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Pending,
    Completed,
    Failed,
}

/// Analysis row. Created `pending`, transitioned to `completed` (with
/// timing and model-version metadata) or `failed`. A row stuck in
/// `pending`/`failed` is the system's crash-recovery signal; nothing is
/// rolled back.
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub user_id: String,
    pub status: AnalysisStatus,
    pub risk_score: Option<u8>,
    pub summary: Option<String>,
    pub issues: Option<serde_json::Value>,
    pub recommendations: Option<serde_json::Value>,
    pub processing_time_ms: Option<u64>,
    pub model_version: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Payload recorded when an analysis finishes successfully.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub processing_time_ms: u64,
    pub model_version: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage rejected {operation}: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
    #[error("analysis record {0} not found")]
    AnalysisNotFound(Uuid),
}

/// Port for the external persistence collaborator. The analyzer itself is
/// oblivious to persistence; only the HTTP boundary drives these calls.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert_contract(&self, contract: NewContract) -> Result<Uuid, StoreError>;

    /// Insert an analysis record in `pending` state.
    async fn begin_analysis(&self, contract_id: Uuid, user_id: &str) -> Result<Uuid, StoreError>;

    async fn complete_analysis(
        &self,
        analysis_id: Uuid,
        outcome: AnalysisOutcome,
    ) -> Result<(), StoreError>;

    async fn fail_analysis(&self, analysis_id: Uuid, message: &str) -> Result<(), StoreError>;
}

/// In-memory stand-in for the managed database backend.
#[derive(Debug, Default)]
pub struct InMemoryAnalysisStore {
    contracts: Mutex<Vec<ContractRecord>>,
    analyses: Mutex<Vec<AnalysisRecord>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contracts(&self) -> Vec<ContractRecord> {
        self.contracts.lock().expect("contracts lock").clone()
    }

    pub fn analyses(&self) -> Vec<AnalysisRecord> {
        self.analyses.lock().expect("analyses lock").clone()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn insert_contract(&self, contract: NewContract) -> Result<Uuid, StoreError> {
        let record = ContractRecord {
            id: Uuid::new_v4(),
            user_id: contract.user_id,
            title: contract.title,
            content: contract.content,
            file_name: contract.file_name,
            status: "active".to_string(),
            created_at: Utc::now(),
        };
        let id = record.id;
        self.contracts.lock().expect("contracts lock").push(record);
        Ok(id)
    }

    async fn begin_analysis(&self, contract_id: Uuid, user_id: &str) -> Result<Uuid, StoreError> {
        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            contract_id,
            user_id: user_id.to_string(),
            status: AnalysisStatus::Pending,
            risk_score: None,
            summary: None,
            issues: None,
            recommendations: None,
            processing_time_ms: None,
            model_version: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let id = record.id;
        self.analyses.lock().expect("analyses lock").push(record);
        Ok(id)
    }

    async fn complete_analysis(
        &self,
        analysis_id: Uuid,
        outcome: AnalysisOutcome,
    ) -> Result<(), StoreError> {
        let issues = serde_json::to_value(&outcome.result.issues).map_err(|err| {
            StoreError::Rejected {
                operation: "complete_analysis",
                message: err.to_string(),
            }
        })?;
        let recommendations =
            serde_json::to_value(&outcome.result.recommendations).map_err(|err| {
                StoreError::Rejected {
                    operation: "complete_analysis",
                    message: err.to_string(),
                }
            })?;

        let mut analyses = self.analyses.lock().expect("analyses lock");
        let record = analyses
            .iter_mut()
            .find(|a| a.id == analysis_id)
            .ok_or(StoreError::AnalysisNotFound(analysis_id))?;
        record.status = AnalysisStatus::Completed;
        record.risk_score = Some(outcome.result.risk_score);
        record.summary = Some(outcome.result.summary);
        record.issues = Some(issues);
        record.recommendations = Some(recommendations);
        record.processing_time_ms = Some(outcome.processing_time_ms);
        record.model_version = Some(outcome.model_version);
        record.completed_at = Some(Utc::now());
        Ok(())
    }

    async fn fail_analysis(&self, analysis_id: Uuid, message: &str) -> Result<(), StoreError> {
        let mut analyses = self.analyses.lock().expect("analyses lock");
        let record = analyses
            .iter_mut()
            .find(|a| a.id == analysis_id)
            .ok_or(StoreError::AnalysisNotFound(analysis_id))?;
        record.status = AnalysisStatus::Failed;
        record.error = Some(message.to_string());
        Ok(())
    }
}
