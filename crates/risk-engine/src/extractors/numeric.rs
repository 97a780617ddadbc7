// Deadline extraction for time-pressure checks
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WITHIN_PERIOD: Regex =
        Regex::new(r"(?i)within\s+(\d+)\s+(hour|day)s?\b").unwrap();
    static ref PERIOD_NOTICE: Regex =
        Regex::new(r"(?i)(\d+)\s+(hour|day)s?\s+notice").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineUnit {
    Hours,
    Days,
}

/// A time limit such as "within 3 days" or "48 hours notice"
#[derive(Debug, Clone, PartialEq)]
pub struct Deadline {
    pub amount: u32,
    pub unit: DeadlineUnit,
    /// Byte offset of the amount in the source text
    pub offset: usize,
}

impl Deadline {
    pub fn in_days(&self) -> f64 {
        match self.unit {
            DeadlineUnit::Days => self.amount as f64,
            DeadlineUnit::Hours => self.amount as f64 / 24.0,
        }
    }

    pub fn is_shorter_than_days(&self, days: u32) -> bool {
        self.in_days() < days as f64
    }
}

impl std::fmt::Display for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = match (self.unit, self.amount) {
            (DeadlineUnit::Hours, 1) => "hour",
            (DeadlineUnit::Hours, _) => "hours",
            (DeadlineUnit::Days, 1) => "day",
            (DeadlineUnit::Days, _) => "days",
        };
        write!(f, "{} {}", self.amount, unit)
    }
}

/// Extracts every deadline in `text`, in order of appearance
///
/// A phrase matched by both patterns ("within 2 days notice") is reported once.
pub fn extract_deadlines(text: &str) -> Vec<Deadline> {
    let mut deadlines: Vec<Deadline> = Vec::new();

    for re in [&*WITHIN_PERIOD, &*PERIOD_NOTICE] {
        for caps in re.captures_iter(text) {
            let (Some(amount), Some(unit)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            // Amounts too large for u32 are not short deadlines anyway
            let Ok(value) = amount.as_str().parse::<u32>() else {
                continue;
            };
            if deadlines.iter().any(|d| d.offset == amount.start()) {
                continue;
            }
            let unit = if unit.as_str().eq_ignore_ascii_case("hour") {
                DeadlineUnit::Hours
            } else {
                DeadlineUnit::Days
            };
            deadlines.push(Deadline {
                amount: value,
                unit,
                offset: amount.start(),
            });
        }
    }

    deadlines.sort_by_key(|d| d.offset);
    deadlines
}
