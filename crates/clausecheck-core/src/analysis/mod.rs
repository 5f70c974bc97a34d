use anyhow::Result as AnyResult;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod file_source;
pub mod heuristic;

/// Baseline risk assigned to every contract before any lexicon hit.
pub const BASE_RISK_SCORE: u32 = 20;

/// Qualitative risk severity, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Map a clamped risk score (0–100) into a tier using the fixed
    /// thresholds: `>70` high, `>40` medium, otherwise low.
    pub fn from_score(score: u8) -> Self {
        if score > 70 {
            Self::High
        } else if score > 40 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

impl FromStr for RiskTier {
    type Err = LexiconValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(LexiconValidationError::UnknownTier {
                tier: other.to_string(),
            }),
        }
    }
}

/// One risk-indicating clause term and its scoring weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Literal substring matched case-insensitively against contract text.
    pub term: String,
    pub tier: RiskTier,
    /// Contribution to the risk score (0–100 inclusive).
    pub weight: u8,
}

impl LexiconEntry {
    /// Construct a new entry, validating invariants before returning.
    pub fn new(
        term: impl Into<String>,
        tier: RiskTier,
        weight: u8,
    ) -> Result<Self, LexiconValidationError> {
        let entry = Self {
            term: term.into(),
            tier,
            weight,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Validate invariants for existing entry definitions.
    pub fn validate(&self) -> Result<(), LexiconValidationError> {
        if self.term.trim().is_empty() {
            return Err(LexiconValidationError::EmptyTerm);
        }
        if self.weight > 100 {
            return Err(LexiconValidationError::InvalidWeight {
                term: self.term.clone(),
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Errors emitted while validating lexicon definitions.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LexiconValidationError {
    #[error("lexicon term must not be blank")]
    EmptyTerm,
    #[error("term `{term}` weight must be within 0..=100 (got {weight})")]
    InvalidWeight { term: String, weight: u8 },
    #[error("duplicate lexicon term `{term}`")]
    DuplicateTerm { term: String },
    #[error("unknown risk tier `{tier}` (expected low, medium, or high)")]
    UnknownTier { tier: String },
}

/// Immutable ordered table of risk terms, validated on construction and
/// loaded once at process start.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

static BUILTIN_LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let entries = [
        ("liquidated damages", RiskTier::High, 20),
        ("unlimited liability", RiskTier::High, 25),
        ("indemnification", RiskTier::Medium, 15),
        ("non-compete", RiskTier::Medium, 10),
        ("automatic renewal", RiskTier::Medium, 10),
        ("penalty", RiskTier::High, 15),
        ("force majeure", RiskTier::Low, 5),
        ("arbitration", RiskTier::Medium, 8),
    ]
    .into_iter()
    .map(|(term, tier, weight)| LexiconEntry {
        term: term.to_string(),
        tier,
        weight,
    })
    .collect();
    Lexicon::new(entries).expect("builtin lexicon must be valid")
});

impl Lexicon {
    /// Build a lexicon from entries, rejecting invalid or duplicate terms.
    pub fn new(entries: Vec<LexiconEntry>) -> Result<Self, LexiconValidationError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.term.to_lowercase()) {
                return Err(LexiconValidationError::DuplicateTerm {
                    term: entry.term.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// The default clause lexicon shipped with the analyzer.
    pub fn builtin() -> Self {
        BUILTIN_LEXICON.clone()
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One detected risk concern tied to a contract clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(rename = "risk")]
    pub tier: RiskTier,
    pub suggestion: String,
}

/// One suggested textual change with rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub clause: String,
    pub current_text: String,
    pub suggested_text: String,
    pub reasoning: String,
}

/// Structured outcome of one contract analysis. Never mutated after
/// construction; issue and recommendation order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_risk: RiskTier,
    pub risk_score: u8,
    #[serde(rename = "plainEnglishSummary")]
    pub summary: String,
    #[serde(rename = "legalIssues")]
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisResult {
    /// Construct a result from a raw accumulated score, clamping it to 100
    /// and deriving the overall tier from the fixed thresholds.
    pub fn from_raw_score(
        raw_score: u32,
        summary: String,
        issues: Vec<Issue>,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        let risk_score = raw_score.min(100) as u8;
        Self {
            overall_risk: RiskTier::from_score(risk_score),
            risk_score,
            summary,
            issues,
            recommendations,
        }
    }
}

/// Failures an analyzer strategy can surface. The heuristic path never
/// fails; the model-backed path maps network and contract violations here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("model request failed: {0}")]
    Upstream(String),
    #[error("model response malformed: {0}")]
    Parse(String),
}

/// An analyzer strategy turning raw contract text plus an industry label
/// into a structured risk report. The two shipped implementations
/// (heuristic and model-backed) are interchangeable; one is selected per
/// deployment.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        contract_text: &str,
        industry_type: &str,
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// Abstraction over lexicon loading so different backends (files,
/// in-memory, HTTP) can be swapped transparently.
#[async_trait]
pub trait LexiconSource: Send + Sync {
    /// Retrieve the full lexicon currently active.
    async fn load(&self) -> AnyResult<Lexicon>;
}
