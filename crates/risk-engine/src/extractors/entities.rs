//! Dates, monetary amounts and party names
//!
//! Regex-only so it behaves the same for English and Hindi documents.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::Entities;

lazy_static! {
    static ref DATE: Regex = Regex::new(
        r"(?i)\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b|\b\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+\d{4}\b"
    )
    .unwrap();
    static ref MONEY: Regex = Regex::new(
        r"₹\s*\d+(?:,\d+)*(?:\.\d+)?|\$\s*\d+(?:,\d+)*(?:\.\d+)?|INR\s*\d+(?:,\d+)*(?:\.\d+)?|रुपये\s*\d+(?:,\d+)*(?:\.\d+)?|\d+(?:,\d+)*(?:\.\d+)?\s*(?:रुपये|रु\.?)"
    )
    .unwrap();
    static ref BETWEEN_PARTIES: Regex =
        Regex::new(r"(?i)between\s+([^,\n]+?)\s+and\s+([^,.\n]+)").unwrap();
    static ref HINDI_PARTY: Regex = Regex::new(r"पक्ष\s*[0-9०-९]*\s*[:：]\s*([^\n]+)").unwrap();
    static ref HINDI_NUMBERED_PARTY: Regex =
        Regex::new(r"पार्टी\s+[0-9०-९]+[\s:]+([^\n]+)").unwrap();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Deduplicated, sorted entities found anywhere in `text`
    pub fn extract(&self, text: &str) -> Entities {
        let dates = collect(DATE.find_iter(text).map(|m| m.as_str()));
        let money = collect(MONEY.find_iter(text).map(|m| m.as_str()));

        let mut parties = BTreeSet::new();
        for caps in BETWEEN_PARTIES.captures_iter(text) {
            parties.extend(caps.iter().skip(1).flatten().map(|m| m.as_str().trim().to_string()));
        }
        for re in [&*HINDI_PARTY, &*HINDI_NUMBERED_PARTY] {
            for caps in re.captures_iter(text) {
                if let Some(party) = caps.get(1) {
                    parties.insert(party.as_str().trim().to_string());
                }
            }
        }
        parties.retain(|p| !p.is_empty());

        Entities {
            dates,
            money,
            parties: parties.into_iter().collect(),
        }
    }
}

fn collect<'a>(matches: impl Iterator<Item = &'a str>) -> Vec<String> {
    matches
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
