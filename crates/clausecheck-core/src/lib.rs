pub mod analysis;
pub mod llm;
pub mod response;

pub use analysis::{
    file_source::FileLexiconSource, heuristic::HeuristicAnalyzer, AnalysisError, AnalysisResult,
    Analyzer, Issue, Lexicon, LexiconEntry, LexiconSource, LexiconValidationError, Recommendation,
    RiskTier,
};
pub use llm::{LlmSettings, ModelAnalyzer};
pub use response::{format_response, render_report, OutputFormat, PublicResponse};
