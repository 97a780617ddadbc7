use super::{FlagCategory, RiskFlag};
use crate::patterns::{matching_keywords, FOREIGN_JURISDICTION_TERMS};

const FOREIGN_JURISDICTION_WEIGHT: f64 = 0.25;

/// Disputes or payments routed outside India are costly for an Indian SME to pursue
pub fn check_foreign_jurisdiction(text_lower: &str) -> Vec<RiskFlag> {
    matching_keywords(text_lower, FOREIGN_JURISDICTION_TERMS)
        .into_iter()
        .map(|term| RiskFlag {
            category: FlagCategory::ForeignJurisdiction,
            weight: FOREIGN_JURISDICTION_WEIGHT,
            message: format!("Indian jurisdiction risk: '{}'", term),
        })
        .collect()
}
