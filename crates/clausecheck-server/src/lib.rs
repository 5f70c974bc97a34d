pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use auth::{AuthError, Principal, StaticTokenVerifier, TokenVerifier};
pub use config::{AnalyzerStrategy, ServerConfig};
pub use error::ApiError;
pub use routes::{router, AppState};
pub use store::{
    AnalysisOutcome, AnalysisRecord, AnalysisStatus, AnalysisStore, ContractRecord,
    InMemoryAnalysisStore, NewContract, StoreError,
};
