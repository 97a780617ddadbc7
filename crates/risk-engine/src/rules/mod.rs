//! Local rule engine
//!
//! Scores a clause from 0.0 to 1.0 by summing weighted flags:
//! 1. Risk vocabulary (per language)
//! 2. Foreign jurisdiction
//! 3. One-sided and ambiguous drafting
//! 4. Short deadlines
//!
//! Indemnity and liability clauses are weighted up by 30%. The score maps
//! to a label through [`RiskThresholds`].

pub mod deadlines;
pub mod drafting;
pub mod jurisdiction;
pub mod keywords;

use async_trait::async_trait;
use serde::Serialize;
use shared_types::{Clause, ClauseType, Language, RiskLabel};

use crate::config::RiskThresholds;
use crate::delegate::{
    Classification, ClassificationDelegate, ClassificationRequest, DelegateError,
};
use crate::patterns::identify_clause_type;

const HIGH_RISK_TYPE_MULTIPLIER: f64 = 1.3;

/// Quick scans report clauses scoring strictly above this
pub const QUICK_SCAN_THRESHOLD: f64 = 0.6;
const QUICK_SCAN_FLAGS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagCategory {
    RiskKeyword,
    ForeignJurisdiction,
    OneSided,
    Ambiguous,
    ShortDeadline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskFlag {
    pub category: FlagCategory,
    pub weight: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleScore {
    /// Within 0.0..=1.0
    pub score: f64,
    pub flags: Vec<RiskFlag>,
    pub clause_type: ClauseType,
}

impl RuleScore {
    pub fn label(&self, thresholds: &RiskThresholds) -> RiskLabel {
        if self.score >= thresholds.high {
            RiskLabel::High
        } else if self.score >= thresholds.medium {
            RiskLabel::Medium
        } else {
            RiskLabel::Low
        }
    }

    /// More independent signals, more confidence; rules never claim certainty
    pub fn confidence(&self) -> f64 {
        (0.5 + 0.1 * self.flags.len() as f64).min(0.9)
    }

    pub fn rationale(&self) -> String {
        if self.flags.is_empty() {
            return "No risk indicators found".to_string();
        }
        self.flags
            .iter()
            .map(|flag| flag.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Run every rule over a clause
pub fn score_clause(text: &str, language: Language) -> RuleScore {
    let text_lower = text.to_lowercase();

    let mut flags = Vec::new();
    flags.extend(keywords::check_risk_keywords(&text_lower, language));
    flags.extend(jurisdiction::check_foreign_jurisdiction(&text_lower));
    flags.extend(drafting::check_one_sided_language(&text_lower));
    flags.extend(drafting::check_ambiguous_terms(&text_lower));
    flags.extend(deadlines::check_short_deadlines(text));

    let clause_type = identify_clause_type(text);

    let mut score: f64 = flags.iter().map(|flag| flag.weight).sum();
    if matches!(clause_type, ClauseType::Indemnity | ClauseType::Liability) {
        score *= HIGH_RISK_TYPE_MULTIPLIER;
    }

    RuleScore {
        score: score.min(1.0),
        flags,
        clause_type,
    }
}

/// A clause the quick scan considers high risk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanHit {
    pub ordinal: usize,
    pub heading: Option<String>,
    pub clause_type: ClauseType,
    pub score: f64,
    /// Strongest flags first, at most two
    pub flags: Vec<String>,
}

/// Rule-only pass over already segmented clauses, no delegate involved
pub fn quick_scan(clauses: &[Clause], language: Language) -> Vec<ScanHit> {
    clauses
        .iter()
        .filter_map(|clause| {
            let mut result = score_clause(&clause.text, language);
            if result.score <= QUICK_SCAN_THRESHOLD {
                return None;
            }
            result
                .flags
                .sort_by(|a, b| b.weight.total_cmp(&a.weight));
            Some(ScanHit {
                ordinal: clause.ordinal,
                heading: clause.heading.clone(),
                clause_type: result.clause_type,
                score: result.score,
                flags: result
                    .flags
                    .into_iter()
                    .take(QUICK_SCAN_FLAGS)
                    .map(|flag| flag.message)
                    .collect(),
            })
        })
        .collect()
}

/// Classification delegate backed by [`score_clause`]
#[derive(Debug, Clone, Default)]
pub struct RuleDelegate {
    thresholds: RiskThresholds,
}

impl RuleDelegate {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }
}

#[async_trait]
impl ClassificationDelegate for RuleDelegate {
    fn name(&self) -> &str {
        "rules"
    }

    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, DelegateError> {
        let result = score_clause(&request.text, request.language);
        let risks = result.flags.iter().map(|flag| flag.message.clone()).collect();
        Ok(Classification::new(
            result.label(&self.thresholds),
            result.rationale(),
            result.confidence(),
        )
        .with_clause_type(result.clause_type)
        .with_risks(risks))
    }
}
