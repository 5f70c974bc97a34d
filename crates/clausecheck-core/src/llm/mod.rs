mod openai;
mod settings;

pub use openai::ModelAnalyzer;
pub use settings::LlmSettings;
