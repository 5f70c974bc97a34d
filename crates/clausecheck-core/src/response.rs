use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, Issue, Recommendation, RiskTier};

/// Response shape consumed by UI clients. Pure renaming of an
/// `AnalysisResult`; every key is always present, arrays may be empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicResponse {
    pub file_name: String,
    pub overall_risk: RiskTier,
    pub risky_clauses: Vec<Issue>,
    pub plain_english_summary: String,
    pub negotiation_points: Vec<Recommendation>,
}

/// Reshape an analysis result for the public API. `file_name` falls back to
/// the original's default label when the caller supplied none.
pub fn format_response(result: AnalysisResult, file_name: Option<String>) -> PublicResponse {
    PublicResponse {
        file_name: file_name.unwrap_or_else(|| "Uploaded Contract".to_string()),
        overall_risk: result.overall_risk,
        risky_clauses: result.issues,
        plain_english_summary: result.summary,
        negotiation_points: result.recommendations,
    }
}

/// Format styles supported by the CLI reporter.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Produce a report string from an `AnalysisResult` in the desired format.
pub fn render_report(report: &AnalysisResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(report),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn render_human(report: &AnalysisResult) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "Risk Score: {}/100 ({})",
        report.risk_score, report.overall_risk
    )?;
    writeln!(out)?;

    if report.issues.is_empty() {
        writeln!(out, "No risky clauses detected.")?;
    } else {
        writeln!(out, "Risky Clauses:")?;
        for issue in &report.issues {
            writeln!(
                out,
                "  - [{tier}] {kind}: {description}",
                tier = issue.tier,
                kind = issue.kind,
                description = issue.description,
            )?;
            writeln!(out, "    Suggestion: {}", issue.suggestion)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Negotiation Points:")?;
    for point in &report.recommendations {
        writeln!(
            out,
            "  - {clause}: {suggested}",
            clause = point.clause,
            suggested = point.suggested_text
        )?;
        writeln!(out, "    Reasoning: {}", point.reasoning)?;
    }

    writeln!(out, "\nSummary: {}", report.summary)?;
    Ok(out)
}
