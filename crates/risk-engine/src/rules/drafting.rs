//! Drafting patterns that favour the other side or leave obligations vague

use lazy_static::lazy_static;
use regex::Regex;

use super::{FlagCategory, RiskFlag};
use crate::patterns::{matching_keywords, AMBIGUOUS_TERMS};

const ONE_SIDED_WEIGHT: f64 = 0.15;
const AMBIGUOUS_WEIGHT: f64 = 0.08;

lazy_static! {
    static ref ONE_SIDED_PATTERNS: Vec<Regex> = [
        r"sole\s+discretion",
        r"exclusive\s+right",
        r"unilateral\s+(?:right|termination|amendment)",
        r"at its\s+(?:option|discretion)",
        r"may in its discretion",
    ]
    .iter()
    .map(|pattern| Regex::new(&format!("(?i){}", pattern)).unwrap())
    .collect();
}

/// One flag per one-sided pattern present
pub fn check_one_sided_language(text_lower: &str) -> Vec<RiskFlag> {
    ONE_SIDED_PATTERNS
        .iter()
        .filter_map(|re| re.find(text_lower))
        .map(|m| RiskFlag {
            category: FlagCategory::OneSided,
            weight: ONE_SIDED_WEIGHT,
            message: format!("One-sided language: '{}'", m.as_str()),
        })
        .collect()
}

/// A single flag weighted by how many vague terms appear
pub fn check_ambiguous_terms(text_lower: &str) -> Vec<RiskFlag> {
    let found = matching_keywords(text_lower, AMBIGUOUS_TERMS);
    if found.is_empty() {
        return Vec::new();
    }

    vec![RiskFlag {
        category: FlagCategory::Ambiguous,
        weight: AMBIGUOUS_WEIGHT * found.len() as f64,
        message: format!(
            "Contains {} ambiguous term(s): {}",
            found.len(),
            found.join(", ")
        ),
    }]
}
