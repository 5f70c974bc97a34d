use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clausecheck_core::{
    render_report, Analyzer, FileLexiconSource, HeuristicAnalyzer, Lexicon, LexiconSource,
    LlmSettings, ModelAnalyzer, OutputFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clausecheck",
    author,
    version,
    about = "Contract risk analysis CLI"
)]
struct Cli {
    /// Directory containing the lexicon pack (terms.txt); builtin lexicon
    /// when omitted
    #[arg(long = "lexicon-dir", value_name = "DIR", global = true)]
    lexicon_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a contract file and print the risk report
    Analyze {
        /// Path to the contract text file
        file: PathBuf,
        /// Industry label used by the industry-specific rules
        #[arg(long, default_value = "general")]
        industry: String,
        /// Emit the report as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Delegate to the model-backed analyzer (configured via
        /// CLAUSECHECK_* environment variables)
        #[arg(long = "with-model")]
        with_model: bool,
    },
    /// List all loaded lexicon terms
    ListTerms {
        /// Emit terms as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::ListTerms { json: false }) {
        Commands::Analyze {
            file,
            industry,
            json,
            with_model,
        } => analyze(cli.lexicon_dir.as_deref(), &file, &industry, json, with_model).await?,
        Commands::ListTerms { json } => list_terms(cli.lexicon_dir.as_deref(), json).await?,
    }
    Ok(())
}

async fn load_lexicon(lexicon_dir: Option<&Path>) -> Result<Lexicon> {
    match lexicon_dir {
        Some(dir) => FileLexiconSource::new(dir)
            .load()
            .await
            .with_context(|| format!("failed to load lexicon from {}", dir.display())),
        None => Ok(Lexicon::builtin()),
    }
}

async fn analyze(
    lexicon_dir: Option<&Path>,
    file: &Path,
    industry: &str,
    json: bool,
    with_model: bool,
) -> Result<()> {
    let contract_text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read contract file {}", file.display()))?;
    if contract_text.is_empty() {
        bail!("contract text is required: {} is empty", file.display());
    }

    let analyzer: Arc<dyn Analyzer> = if with_model {
        let settings = LlmSettings::from_env()?;
        Arc::new(ModelAnalyzer::new(&settings)?)
    } else {
        let lexicon = load_lexicon(lexicon_dir).await?;
        Arc::new(HeuristicAnalyzer::new(lexicon)?)
    };

    let result = analyzer
        .analyze(&contract_text, industry)
        .await
        .context("contract analysis failed")?;
    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    print!("{}", render_report(&result, format)?);
    Ok(())
}

async fn list_terms(lexicon_dir: Option<&Path>, json: bool) -> Result<()> {
    let lexicon = load_lexicon(lexicon_dir).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(lexicon.entries())?);
        return Ok(());
    }

    println!("{} term(s) loaded", lexicon.len());
    for entry in lexicon.entries() {
        println!(
            "- {term:<24} [{tier:6}] weight {weight:>3}",
            term = entry.term,
            tier = entry.tier.to_string(),
            weight = entry.weight
        );
    }
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
