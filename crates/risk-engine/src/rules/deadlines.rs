use super::{FlagCategory, RiskFlag};
use crate::extractors::extract_deadlines;

const SHORT_DEADLINE_WEIGHT: f64 = 0.1;
/// Deadlines under a week leave an SME little time to respond
const SHORT_DEADLINE_DAYS: u32 = 7;

pub fn check_short_deadlines(text: &str) -> Vec<RiskFlag> {
    extract_deadlines(text)
        .into_iter()
        .filter(|deadline| deadline.is_shorter_than_days(SHORT_DEADLINE_DAYS))
        .map(|deadline| RiskFlag {
            category: FlagCategory::ShortDeadline,
            weight: SHORT_DEADLINE_WEIGHT,
            message: format!("Very short deadline: {}", deadline),
        })
        .collect()
}
