use shared_types::Language;

use super::{FlagCategory, RiskFlag};
use crate::patterns::{
    matching_keywords, HIGH_RISK_KEYWORDS, HINDI_HIGH_RISK_KEYWORDS, HINDI_MEDIUM_RISK_KEYWORDS,
    LOW_RISK_KEYWORDS, MEDIUM_RISK_KEYWORDS,
};

const ENGLISH_WEIGHTS: [(&str, f64); 3] = [("high", 0.12), ("medium", 0.06), ("low", 0.02)];
const HINDI_WEIGHTS: [(&str, f64); 2] = [("high", 0.15), ("medium", 0.08)];

/// Weighted risk vocabulary
///
/// Hindi contracts regularly quote English legal terms, so Hindi text is
/// checked against both tables. Text of unknown language is too.
pub fn check_risk_keywords(text_lower: &str, language: Language) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    if language != Language::English {
        let tables = [HINDI_HIGH_RISK_KEYWORDS, HINDI_MEDIUM_RISK_KEYWORDS];
        for ((level, weight), keywords) in HINDI_WEIGHTS.iter().zip(tables) {
            flags.extend(keyword_flags(text_lower, keywords, level, *weight));
        }
    }

    let tables = [HIGH_RISK_KEYWORDS, MEDIUM_RISK_KEYWORDS, LOW_RISK_KEYWORDS];
    for ((level, weight), keywords) in ENGLISH_WEIGHTS.iter().zip(tables) {
        flags.extend(keyword_flags(text_lower, keywords, level, *weight));
    }

    flags
}

fn keyword_flags(text_lower: &str, keywords: &[&str], level: &str, weight: f64) -> Vec<RiskFlag> {
    matching_keywords(text_lower, keywords)
        .into_iter()
        .map(|keyword| RiskFlag {
            category: FlagCategory::RiskKeyword,
            weight,
            message: format!("{}-risk term '{}'", level, keyword),
        })
        .collect()
}
