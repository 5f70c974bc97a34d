use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clausecheck_core::{
    Analyzer, FileLexiconSource, HeuristicAnalyzer, Lexicon, LexiconSource, LlmSettings,
    ModelAnalyzer,
};
use clausecheck_server::{
    router, AnalyzerStrategy, AppState, InMemoryAnalysisStore, ServerConfig, StaticTokenVerifier,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ServerConfig::from_env()?;

    let (analyzer, model_version): (Arc<dyn Analyzer>, String) = match config.strategy {
        AnalyzerStrategy::Heuristic => {
            let lexicon = match &config.lexicon_dir {
                Some(dir) => FileLexiconSource::new(dir)
                    .load()
                    .await
                    .with_context(|| format!("failed to load lexicon from {}", dir.display()))?,
                None => Lexicon::builtin(),
            };
            info!(terms = lexicon.len(), "using heuristic analyzer");
            (
                Arc::new(HeuristicAnalyzer::new(lexicon)?),
                "rule-based-v1".to_string(),
            )
        }
        AnalyzerStrategy::Model => {
            let settings = LlmSettings::from_env()?;
            let analyzer = ModelAnalyzer::new(&settings)?;
            let model_version = analyzer.model().to_string();
            info!(model = %model_version, "using model-backed analyzer");
            (Arc::new(analyzer), model_version)
        }
    };

    let verifier = StaticTokenVerifier::from_spec(&config.api_tokens)
        .context("invalid CLAUSECHECK_API_TOKENS")?;
    let state = AppState {
        analyzer,
        store: Arc::new(InMemoryAnalysisStore::new()),
        verifier: Arc::new(verifier),
        model_version,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "clausecheck server listening");
    axum::serve(listener, router(state))
        .await
        .context("server terminated")?;
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
