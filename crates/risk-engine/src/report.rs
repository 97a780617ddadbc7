//! Report assembly
//!
//! Pure function of its inputs: the same document, clauses, findings and
//! timestamp always produce the same report.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use shared_types::{
    aggregate_label, Clause, Document, DocumentId, LabelCounts, Report, ReportSummary,
    RiskFinding, RiskLabel,
};
use thiserror::Error;

use crate::extractors::EntityExtractor;

/// Concerns listed in the executive summary
const MAX_KEY_CONCERNS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Expected one finding per clause ({clauses} clauses), got {findings} findings")]
    MismatchedFindings { clauses: usize, findings: usize },

    #[error("Clause {ordinal} belongs to document {found}, not {expected}")]
    ForeignClause {
        ordinal: usize,
        expected: DocumentId,
        found: DocumentId,
    },

    #[error("Position {position}: expected clause {expected}, found clause {found}")]
    OutOfOrder {
        position: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler {
    entities: EntityExtractor,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assemble(
        &self,
        document: &Document,
        clauses: &[Clause],
        findings: Vec<RiskFinding>,
        generated_at: DateTime<Utc>,
    ) -> Result<Report, AssemblyError> {
        validate(document, clauses, &findings)?;

        let aggregate = aggregate_label(findings.iter().map(|f| f.label));
        let counts = LabelCounts::from_findings(&findings);
        let text = summary_text(aggregate, &counts, clauses, &findings);

        Ok(Report {
            document_id: document.id.clone(),
            filename: document.filename.clone(),
            format: document.format,
            language: document.language,
            content_hash: document.content_hash.clone(),
            findings,
            aggregate,
            generated_at,
            summary: ReportSummary { counts, text },
            entities: self.entities.extract(&document.text),
        })
    }
}

/// Findings must pair up with the document's clauses one-to-one, in order
fn validate(
    document: &Document,
    clauses: &[Clause],
    findings: &[RiskFinding],
) -> Result<(), AssemblyError> {
    if clauses.len() != findings.len() {
        return Err(AssemblyError::MismatchedFindings {
            clauses: clauses.len(),
            findings: findings.len(),
        });
    }

    for (position, (clause, finding)) in clauses.iter().zip(findings).enumerate() {
        for owner in [&clause.document_id, &finding.clause.document_id] {
            if *owner != document.id {
                return Err(AssemblyError::ForeignClause {
                    ordinal: clause.ordinal,
                    expected: document.id.clone(),
                    found: owner.clone(),
                });
            }
        }
        if clause.ordinal != position {
            return Err(AssemblyError::OutOfOrder {
                position,
                expected: position,
                found: clause.ordinal,
            });
        }
        if finding.clause.ordinal != clause.ordinal {
            return Err(AssemblyError::OutOfOrder {
                position,
                expected: clause.ordinal,
                found: finding.clause.ordinal,
            });
        }
    }

    Ok(())
}

fn clause_name(clause: &Clause) -> String {
    clause
        .heading
        .clone()
        .unwrap_or_else(|| format!("Clause {}", clause.ordinal + 1))
}

fn summary_text(
    aggregate: RiskLabel,
    counts: &LabelCounts,
    clauses: &[Clause],
    findings: &[RiskFinding],
) -> String {
    let mut text = String::new();

    if counts.total() == 0 {
        text.push_str("Overall risk: Unknown\nNo clauses were analysed.\n");
        return text;
    }

    let _ = writeln!(text, "Overall risk: {}", aggregate);
    let _ = writeln!(
        text,
        "{} clause(s) reviewed: {} high, {} medium, {} low, {} unknown.",
        counts.total(),
        counts.high,
        counts.medium,
        counts.low,
        counts.unknown
    );

    let concerns: Vec<(&Clause, &RiskFinding)> = [RiskLabel::High, RiskLabel::Medium]
        .iter()
        .flat_map(|label| {
            clauses
                .iter()
                .zip(findings)
                .filter(move |(_, finding)| finding.label == *label)
        })
        .take(MAX_KEY_CONCERNS)
        .collect();

    if !concerns.is_empty() {
        text.push_str("\nKey concerns:\n");
        for (i, (clause, finding)) in concerns.iter().enumerate() {
            let _ = writeln!(
                text,
                "{}. {} ({}, {}): {}",
                i + 1,
                clause_name(clause),
                finding.clause_type,
                finding.label,
                finding.rationale
            );
        }
    }

    if counts.unknown > 0 {
        let _ = writeln!(
            text,
            "\n{} clause(s) could not be classified and need manual review.",
            counts.unknown
        );
    }

    text.push_str("\nNext steps:\n");
    if counts.high + counts.medium > 0 {
        text.push_str("1. Discuss the flagged clauses with legal counsel\n");
        text.push_str("2. Negotiate fair terms before signing\n");
        text.push_str("3. Document all agreed changes\n");
    } else {
        text.push_str("1. Confirm the terms match the commercial agreement\n");
        text.push_str("2. Keep a signed copy on record\n");
    }

    let urgency = if counts.high > 0 {
        RiskLabel::High
    } else if counts.medium > 0 || counts.unknown > 0 {
        RiskLabel::Medium
    } else {
        RiskLabel::Low
    };
    let _ = write!(text, "\nUrgency: {}", urgency);

    text
}
