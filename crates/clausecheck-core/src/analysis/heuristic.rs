use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};
use tracing::{debug, instrument};

use super::{
    AnalysisError, AnalysisResult, Analyzer, Issue, Lexicon, Recommendation, RiskTier,
    BASE_RISK_SCORE,
};

/// One industry-conditional augmentation: when the industry label contains
/// `industry_fragment` and the contract text contains any of
/// `term_fragments`, the issue described here is appended. Scoring is not
/// affected.
struct IndustryRule {
    industry_fragment: &'static str,
    term_fragments: &'static [&'static str],
    kind: &'static str,
    description: &'static str,
    tier: RiskTier,
    suggestion: &'static str,
}

// Single shipped rule; the table exists so further industries can be added
// without touching the scan loop.
const INDUSTRY_RULES: &[IndustryRule] = &[IndustryRule {
    industry_fragment: "tech",
    term_fragments: &["intellectual property", "ip"],
    kind: "IP Rights",
    description: "Intellectual property clauses detected",
    tier: RiskTier::Medium,
    suggestion: "Ensure IP ownership and licensing terms are clearly defined",
}];

/// Lexicon-driven analyzer: accumulates a risk score from case-insensitive
/// substring hits and emits one templated issue per matched term. Pure and
/// deterministic for any input; the scan holds no mutable state, so
/// concurrent analyses need no coordination.
pub struct HeuristicAnalyzer {
    lexicon: Lexicon,
    automaton: Option<AhoCorasick>,
}

impl HeuristicAnalyzer {
    /// Compile the lexicon into a keyword automaton. The lexicon is fixed
    /// for the analyzer's lifetime.
    pub fn new(lexicon: Lexicon) -> Result<Self> {
        let automaton = if lexicon.is_empty() {
            None
        } else {
            let patterns: Vec<String> = lexicon
                .entries()
                .iter()
                .map(|entry| entry.term.to_lowercase())
                .collect();
            Some(
                AhoCorasick::new(patterns)
                    .context("failed to build keyword automaton from lexicon")?,
            )
        };
        Ok(Self { lexicon, automaton })
    }

    /// Indices of lexicon entries whose term occurs at least once in the
    /// lowered text. Overlapping matches are included so each entry behaves
    /// exactly like an independent substring-containment check; multiple
    /// occurrences of the same term still count once.
    fn matched_entries(&self, lowered: &str) -> HashSet<usize> {
        let mut hits = HashSet::new();
        if let Some(automaton) = &self.automaton {
            for mat in automaton.find_overlapping_iter(lowered) {
                hits.insert(mat.pattern().as_usize());
            }
        }
        hits
    }

    /// Run the full analysis synchronously. Cannot fail for any string
    /// input; empty text is the caller's concern.
    pub fn evaluate(&self, contract_text: &str, industry_type: &str) -> AnalysisResult {
        let lowered = contract_text.to_lowercase();
        let hits = self.matched_entries(&lowered);

        let mut raw_score = BASE_RISK_SCORE;
        let mut issues = Vec::new();
        for (idx, entry) in self.lexicon.entries().iter().enumerate() {
            if !hits.contains(&idx) {
                continue;
            }
            raw_score += u32::from(entry.weight);
            issues.push(Issue {
                kind: "Contract Clause".to_string(),
                description: format!("Contains {} clause which may have implications", entry.term),
                tier: entry.tier,
                suggestion: format!(
                    "Review the {} clause carefully and consider negotiating terms",
                    entry.term
                ),
            });
        }

        let industry_lowered = industry_type.to_lowercase();
        for rule in INDUSTRY_RULES {
            if industry_lowered.contains(rule.industry_fragment)
                && rule.term_fragments.iter().any(|t| lowered.contains(t))
            {
                issues.push(Issue {
                    kind: rule.kind.to_string(),
                    description: rule.description.to_string(),
                    tier: rule.tier,
                    suggestion: rule.suggestion.to_string(),
                });
            }
        }

        let risk_score = raw_score.min(100) as u8;
        let overall_risk = RiskTier::from_score(risk_score);

        // The heuristic path synthesizes exactly one recommendation.
        let recommendation = if risk_score > 50 {
            Recommendation {
                clause: "Overall Contract".to_string(),
                current_text: "Multiple high-risk clauses identified".to_string(),
                suggested_text: "Consider legal review before signing".to_string(),
                reasoning: "High risk score indicates potential legal complications".to_string(),
            }
        } else {
            Recommendation {
                clause: "General Recommendation".to_string(),
                current_text: "Standard contract terms".to_string(),
                suggested_text: "Review all terms carefully".to_string(),
                reasoning: "Always understand all contract terms before signing".to_string(),
            }
        };

        let summary = format!(
            "This {industry_type} contract contains {count} potential issues. \
             The contract appears to be {overall_risk} risk based on the clauses identified. \
             Key areas of concern include liability, payment terms, and termination conditions.",
            count = issues.len(),
        );

        debug!(
            issues = issues.len(),
            risk_score,
            %overall_risk,
            "heuristic analysis completed"
        );

        AnalysisResult {
            overall_risk,
            risk_score,
            summary,
            issues,
            recommendations: vec![recommendation],
        }
    }
}

#[async_trait::async_trait]
impl Analyzer for HeuristicAnalyzer {
    #[instrument(
        name = "heuristic_analysis",
        skip(self, contract_text),
        fields(text_len = contract_text.len())
    )]
    async fn analyze(
        &self,
        contract_text: &str,
        industry_type: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        Ok(self.evaluate(contract_text, industry_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LexiconEntry;
    use proptest::prelude::*;

    fn analyzer() -> HeuristicAnalyzer {
        HeuristicAnalyzer::new(Lexicon::builtin()).unwrap()
    }

    #[tokio::test]
    async fn clean_text_scores_base_risk() {
        let report = analyzer()
            .analyze("Both parties agree to deliver the goods on time.", "general")
            .await
            .unwrap();
        assert_eq!(report.risk_score, 20);
        assert_eq!(report.overall_risk, RiskTier::Low);
        assert!(report.issues.is_empty());
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].clause, "General Recommendation");
    }

    #[tokio::test]
    async fn unlimited_liability_adds_exactly_25() {
        let base = analyzer()
            .analyze("Plain delivery terms only.", "general")
            .await
            .unwrap();
        let report = analyzer()
            .analyze(
                "The vendor accepts unlimited liability for all defects.",
                "general",
            )
            .await
            .unwrap();
        assert_eq!(report.risk_score, base.risk_score + 25);
        let high_issues: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.tier == RiskTier::High)
            .collect();
        assert_eq!(high_issues.len(), 1);
        assert!(high_issues[0].description.contains("unlimited liability"));
    }

    #[tokio::test]
    async fn tech_industry_ip_rule_appends_issue() {
        let text = "Standard indemnification applies, a penalty accrues per day, \
                    and all intellectual property vests in the client.";
        let report = analyzer().analyze(text, "tech").await.unwrap();
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.risk_score, 50);
        assert_eq!(report.overall_risk, RiskTier::Medium);
        let ip = report.issues.last().unwrap();
        assert_eq!(ip.kind, "IP Rights");
        assert_eq!(ip.tier, RiskTier::Medium);
    }

    #[tokio::test]
    async fn ip_rule_ignored_outside_tech_industry() {
        let text = "All intellectual property vests in the client.";
        let report = analyzer().analyze(text, "construction").await.unwrap();
        assert!(report.issues.is_empty());
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let report = analyzer()
            .analyze("SUBJECT TO BINDING ARBITRATION.", "general")
            .await
            .unwrap();
        assert_eq!(report.risk_score, 28);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].description.contains("arbitration"));
    }

    #[tokio::test]
    async fn repeated_term_counts_once() {
        let report = analyzer()
            .analyze("penalty penalty penalty", "general")
            .await
            .unwrap();
        assert_eq!(report.risk_score, 35);
        assert_eq!(report.issues.len(), 1);
    }

    #[tokio::test]
    async fn issues_follow_lexicon_order_not_text_order() {
        // Text mentions arbitration before liquidated damages; the lexicon
        // lists liquidated damages first.
        let text = "arbitration comes first here, then liquidated damages.";
        let report = analyzer().analyze(text, "general").await.unwrap();
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues[0].description.contains("liquidated damages"));
        assert!(report.issues[1].description.contains("arbitration"));
    }

    #[tokio::test]
    async fn all_terms_clamp_to_100() {
        let text = "liquidated damages, unlimited liability, indemnification, \
                    non-compete, automatic renewal, penalty, force majeure, arbitration";
        let report = analyzer().analyze(text, "general").await.unwrap();
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.overall_risk, RiskTier::High);
        assert_eq!(report.issues.len(), 8);
        assert_eq!(report.recommendations[0].clause, "Overall Contract");
    }

    #[tokio::test]
    async fn high_score_swaps_recommendation() {
        let text = "unlimited liability and liquidated damages and a penalty";
        let report = analyzer().analyze(text, "general").await.unwrap();
        assert!(report.risk_score > 50);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(
            report.recommendations[0].suggested_text,
            "Consider legal review before signing"
        );
    }

    #[tokio::test]
    async fn analysis_is_idempotent() {
        let text = "indemnification with automatic renewal and arbitration";
        let first = analyzer().analyze(text, "retail").await.unwrap();
        let second = analyzer().analyze(text, "retail").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn summary_interpolates_industry_count_and_tier() {
        let report = analyzer()
            .analyze("contains a penalty clause", "healthcare")
            .await
            .unwrap();
        assert_eq!(
            report.summary,
            "This healthcare contract contains 1 potential issues. \
             The contract appears to be low risk based on the clauses identified. \
             Key areas of concern include liability, payment terms, and termination conditions."
        );
    }

    #[tokio::test]
    async fn empty_lexicon_still_scores_base() {
        let analyzer = HeuristicAnalyzer::new(Lexicon::new(Vec::new()).unwrap()).unwrap();
        let report = analyzer.analyze("penalty", "general").await.unwrap();
        assert_eq!(report.risk_score, 20);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn custom_lexicon_weights_accumulate() {
        let lexicon = Lexicon::new(vec![
            LexiconEntry::new("alpha", RiskTier::Low, 7).unwrap(),
            LexiconEntry::new("beta", RiskTier::High, 30).unwrap(),
        ])
        .unwrap();
        let analyzer = HeuristicAnalyzer::new(lexicon).unwrap();
        let report = analyzer.evaluate("alpha then beta", "general");
        assert_eq!(report.risk_score, 57);
        assert_eq!(report.overall_risk, RiskTier::Medium);
    }

    proptest! {
        #[test]
        fn score_stays_within_bounds(text in ".{0,400}", industry in "[a-z]{0,16}") {
            let report = analyzer().evaluate(&text, &industry);
            prop_assert!(report.risk_score >= 20);
            prop_assert!(report.risk_score <= 100);
            prop_assert_eq!(report.overall_risk, RiskTier::from_score(report.risk_score));
            prop_assert_eq!(report.recommendations.len(), 1);
        }
    }
}
