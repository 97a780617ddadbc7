//! Plain-text consultation brief rendered from a report

use std::fmt::{self, Write};

use crate::types::{Report, RiskLabel};

const MAX_BRIEF_CLAUSES: usize = 5;
const MAX_SUMMARY_CHARS: usize = 500;
const TIPS_PER_CLAUSE: usize = 2;

const RECOMMENDED_ACTIONS: &[&str] = &[
    "Review all flagged clauses with legal counsel",
    "Negotiate changes to high-risk terms",
    "Ensure jurisdiction is set to India",
    "Clarify ambiguous terms",
    "Document all agreed changes",
];

const DISCLAIMER: &str = "DISCLAIMER: This analysis is for guidance only. Consult a qualified lawyer.";

impl Report {
    /// Summary of the high-risk findings to bring to a lawyer
    pub fn consultation_brief(&self) -> String {
        let mut brief = String::new();
        // Writing into a String never fails
        let _ = self.write_brief(&mut brief);
        brief
    }

    /// HIGH with any High finding, MEDIUM with any Medium, LOW otherwise
    pub fn urgency(&self) -> &'static str {
        match self.flagged(RiskLabel::Medium).map(|f| f.label).max() {
            Some(RiskLabel::High) => "HIGH",
            Some(_) => "MEDIUM",
            None => "LOW",
        }
    }

    fn write_brief(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "LEGAL CONSULTATION BRIEF")?;
        writeln!(out, "Generated: {}", self.generated_at.format("%d %B %Y, %H:%M UTC"))?;
        writeln!(out, "Document: {}", self.filename)?;
        writeln!(out, "Hash: {}", self.content_hash.get(..12).unwrap_or(&self.content_hash))?;

        heading(out, "CONTRACT OVERVIEW")?;
        let counts = &self.summary.counts;
        writeln!(out, "Format: {}", self.format.tag())?;
        writeln!(out, "Overall Risk: {}", self.aggregate)?;
        writeln!(out, "Language: {}", self.language)?;
        writeln!(out, "Clauses Analyzed: {}", counts.total())?;
        writeln!(
            out,
            "High: {}, Medium: {}, Low: {}, Unclassified: {}",
            counts.high, counts.medium, counts.low, counts.unknown
        )?;

        heading(out, "HIGH-RISK CLAUSES IDENTIFIED")?;
        let mut listed = 0;
        for finding in self.flagged(RiskLabel::High).take(MAX_BRIEF_CLAUSES) {
            listed += 1;
            writeln!(
                out,
                "{}. Clause {} - {}",
                listed,
                finding.clause.ordinal + 1,
                finding.clause_type
            )?;
            writeln!(out, "   Confidence: {:.2}", finding.confidence)?;
            writeln!(out, "   Key Issues: {}", finding.rationale)?;
            for tip in finding.negotiation_tips.iter().take(TIPS_PER_CLAUSE) {
                writeln!(out, "   Tip: {}", tip)?;
            }
        }
        if listed == 0 {
            writeln!(out, "No high-risk clauses identified.")?;
        }

        heading(out, "EXECUTIVE SUMMARY")?;
        let mut excerpt: String = self.summary.text.chars().take(MAX_SUMMARY_CHARS).collect();
        if excerpt.len() < self.summary.text.len() {
            excerpt.push_str("...");
        }
        writeln!(out, "{}", excerpt)?;

        heading(out, "RECOMMENDED ACTIONS")?;
        for (i, action) in RECOMMENDED_ACTIONS.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, action)?;
        }

        writeln!(out)?;
        writeln!(out, "URGENCY LEVEL: {}", self.urgency())?;
        writeln!(out)?;
        writeln!(out, "{}", DISCLAIMER)
    }
}

fn heading(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "═".repeat(title.chars().count()))
}
