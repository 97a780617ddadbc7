use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared format of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 4] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Doc,
        DocumentFormat::Txt,
    ];

    /// Canonical upper-case tag ("PDF", "DOCX", ...)
    pub fn tag(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Doc => "DOC",
            DocumentFormat::Txt => "TXT",
        }
    }

    /// Parse a declared format tag. Case-insensitive, a leading dot is allowed.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let tag = tag.strip_prefix('.').unwrap_or(tag);
        match tag.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::Doc),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    /// Infer the format from a filename extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_tag(ext)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Language of a document's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Hindi,
    Unknown,
}

impl Language {
    /// ISO 639-1 code, "und" for unknown
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Unknown => "und",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "hi" | "hindi" => Some(Language::Hindi),
            "und" | "unknown" => Some(Language::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Risk label of a clause.
///
/// Variants are declared in ascending severity so the derived ordering
/// is the severity ordering: High > Medium > Low > Unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    Unknown,
    Low,
    Medium,
    High,
}

impl RiskLabel {
    /// Medium or High; the labels worth negotiating over
    pub fn is_risky(&self) -> bool {
        matches!(self, RiskLabel::High | RiskLabel::Medium)
    }

    /// Lenient parse of a label as produced by an LLM ("high", "High 🔴", "MEDIUM risk")
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let first = value
            .trim()
            .split(|c: char| !c.is_alphabetic())
            .find(|w| !w.is_empty())?;
        match first.to_lowercase().as_str() {
            "high" | "critical" | "severe" => Some(RiskLabel::High),
            "medium" | "moderate" => Some(RiskLabel::Medium),
            "low" | "minor" => Some(RiskLabel::Low),
            "unknown" => Some(RiskLabel::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLabel::Unknown => "Unknown",
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
        };
        f.write_str(name)
    }
}

/// Highest-severity label among `labels`.
///
/// Unknown only wins when every label is Unknown (or there are none),
/// which falls out of Unknown being the lowest severity.
pub fn aggregate_label<I>(labels: I) -> RiskLabel
where
    I: IntoIterator<Item = RiskLabel>,
{
    labels.into_iter().max().unwrap_or(RiskLabel::Unknown)
}

/// An uploaded document after successful extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub format: DocumentFormat,
    pub text: String,
    pub language: Language,
    /// SHA-256 hex digest of the uploaded bytes
    pub content_hash: String,
}

/// Back-reference from a finding to the clause it classifies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClauseRef {
    pub document_id: DocumentId,
    pub ordinal: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub document_id: DocumentId,
    pub ordinal: usize,
    /// Byte offset of the clause start in the document text
    pub start: usize,
    /// Byte offset one past the clause end
    pub end: usize,
    pub text: String,
    pub heading: Option<String>,
}

impl Clause {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn clause_ref(&self) -> ClauseRef {
        ClauseRef {
            document_id: self.document_id.clone(),
            ordinal: self.ordinal,
        }
    }
}

/// Kind of contractual clause, used for explanations and alternatives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseType {
    Indemnity,
    Termination,
    Jurisdiction,
    Arbitration,
    Confidentiality,
    Payment,
    IpRights,
    Warranty,
    Liability,
    ForceMajeure,
    General,
}

impl ClauseType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ClauseType::Indemnity => "Indemnity Clause",
            ClauseType::Termination => "Termination Clause",
            ClauseType::Jurisdiction => "Jurisdiction Clause",
            ClauseType::Arbitration => "Arbitration Clause",
            ClauseType::Confidentiality => "Confidentiality Clause",
            ClauseType::Payment => "Payment Clause",
            ClauseType::IpRights => "IP Rights Clause",
            ClauseType::Warranty => "Warranty Clause",
            ClauseType::Liability => "Liability Clause",
            ClauseType::ForceMajeure => "Force Majeure Clause",
            ClauseType::General => "General Clause",
        }
    }

    /// Parse either the snake_case tag or the display name
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value
            .trim()
            .to_lowercase()
            .trim_end_matches(" clause")
            .replace([' ', '-'], "_");
        match normalized.as_str() {
            "indemnity" => Some(ClauseType::Indemnity),
            "termination" => Some(ClauseType::Termination),
            "jurisdiction" | "governing_law" => Some(ClauseType::Jurisdiction),
            "arbitration" | "dispute_resolution" => Some(ClauseType::Arbitration),
            "confidentiality" => Some(ClauseType::Confidentiality),
            "payment" => Some(ClauseType::Payment),
            "ip_rights" | "intellectual_property" => Some(ClauseType::IpRights),
            "warranty" => Some(ClauseType::Warranty),
            "liability" => Some(ClauseType::Liability),
            "force_majeure" => Some(ClauseType::ForceMajeure),
            "general" => Some(ClauseType::General),
            _ => None,
        }
    }
}

impl fmt::Display for ClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Risk classification of a single clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub clause: ClauseRef,
    pub label: RiskLabel,
    pub rationale: String,
    /// Always within 0.0..=1.0
    pub confidence: f64,
    pub clause_type: ClauseType,
    pub suggested_alternative: Option<String>,
    #[serde(default)]
    pub potential_risks: Vec<String>,
    #[serde(default)]
    pub negotiation_tips: Vec<String>,
    /// Name of the delegate that produced the classification
    pub source: String,
}

impl RiskFinding {
    pub const UNAVAILABLE_RATIONALE: &'static str = "classification unavailable";

    pub fn new(
        clause: ClauseRef,
        label: RiskLabel,
        rationale: impl Into<String>,
        confidence: f64,
        clause_type: ClauseType,
        source: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            clause,
            label,
            rationale: rationale.into(),
            confidence,
            clause_type,
            suggested_alternative: None,
            potential_risks: Vec::new(),
            negotiation_tips: Vec::new(),
            source: source.into(),
        }
    }

    /// Degraded finding used when the delegate could not classify the clause
    pub fn unavailable(clause: ClauseRef, clause_type: ClauseType, source: impl Into<String>) -> Self {
        Self::new(
            clause,
            RiskLabel::Unknown,
            Self::UNAVAILABLE_RATIONALE,
            0.0,
            clause_type,
            source,
        )
    }

    pub fn with_alternative(mut self, alternative: Option<String>) -> Self {
        self.suggested_alternative = alternative;
        self
    }

    pub fn with_guidance(mut self, potential_risks: Vec<String>, negotiation_tips: Vec<String>) -> Self {
        self.potential_risks = potential_risks;
        self.negotiation_tips = negotiation_tips;
        self
    }

    pub fn is_unavailable(&self) -> bool {
        self.label == RiskLabel::Unknown && self.rationale == Self::UNAVAILABLE_RATIONALE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

impl LabelCounts {
    pub fn from_findings(findings: &[RiskFinding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.label {
                RiskLabel::High => counts.high += 1,
                RiskLabel::Medium => counts.medium += 1,
                RiskLabel::Low => counts.low += 1,
                RiskLabel::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.unknown
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub counts: LabelCounts,
    pub text: String,
}

/// Named entities found in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub dates: Vec<String>,
    pub money: Vec<String>,
    pub parties: Vec<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.money.is_empty() && self.parties.is_empty()
    }
}

/// Document-level risk report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub document_id: DocumentId,
    pub filename: String,
    pub format: DocumentFormat,
    pub language: Language,
    pub content_hash: String,
    pub findings: Vec<RiskFinding>,
    pub aggregate: RiskLabel,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub entities: Entities,
}

impl Report {
    /// Findings at or above `label`, in document order
    pub fn flagged(&self, label: RiskLabel) -> impl Iterator<Item = &RiskFinding> {
        self.findings
            .iter()
            .filter(move |f| f.label != RiskLabel::Unknown && f.label >= label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(RiskLabel::High > RiskLabel::Medium);
        assert!(RiskLabel::Medium > RiskLabel::Low);
        assert!(RiskLabel::Low > RiskLabel::Unknown);
    }

    #[test]
    fn test_aggregate_ignores_unknown() {
        let labels = [RiskLabel::Unknown, RiskLabel::Low, RiskLabel::Unknown];
        assert_eq!(aggregate_label(labels), RiskLabel::Low);
    }

    #[test]
    fn test_aggregate_all_unknown() {
        let labels = [RiskLabel::Unknown, RiskLabel::Unknown];
        assert_eq!(aggregate_label(labels), RiskLabel::Unknown);
        assert_eq!(aggregate_label(Vec::new()), RiskLabel::Unknown);
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(DocumentFormat::from_tag("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_tag(".DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_tag(" Txt "), Some(DocumentFormat::Txt));
        assert_eq!(DocumentFormat::from_tag("rtf"), None);
        assert_eq!(
            DocumentFormat::from_filename("lease.final.doc"),
            Some(DocumentFormat::Doc)
        );
        assert_eq!(DocumentFormat::from_filename("README"), None);
    }

    #[test]
    fn test_lenient_label_parse() {
        assert_eq!(RiskLabel::parse_lenient("High 🔴"), Some(RiskLabel::High));
        assert_eq!(RiskLabel::parse_lenient(" medium risk"), Some(RiskLabel::Medium));
        assert_eq!(RiskLabel::parse_lenient("LOW"), Some(RiskLabel::Low));
        assert_eq!(RiskLabel::parse_lenient("n/a"), None);
    }

    #[test]
    fn test_clause_type_parse() {
        assert_eq!(ClauseType::parse("Indemnity Clause"), Some(ClauseType::Indemnity));
        assert_eq!(ClauseType::parse("force_majeure"), Some(ClauseType::ForceMajeure));
        assert_eq!(ClauseType::parse("IP Rights Clause"), Some(ClauseType::IpRights));
        assert_eq!(ClauseType::parse("something else"), None);
    }

    #[test]
    fn test_finding_confidence_clamped() {
        let clause = ClauseRef {
            document_id: DocumentId::from("doc"),
            ordinal: 0,
        };
        let high = RiskFinding::new(clause.clone(), RiskLabel::Low, "x", 1.7, ClauseType::General, "t");
        let nan = RiskFinding::new(clause, RiskLabel::Low, "x", f64::NAN, ClauseType::General, "t");
        assert_eq!(high.confidence, 1.0);
        assert_eq!(nan.confidence, 0.0);
    }

    #[test]
    fn test_label_counts() {
        let clause = |ordinal| ClauseRef {
            document_id: DocumentId::from("doc"),
            ordinal,
        };
        let findings = vec![
            RiskFinding::new(clause(0), RiskLabel::High, "a", 0.9, ClauseType::General, "t"),
            RiskFinding::new(clause(1), RiskLabel::High, "b", 0.9, ClauseType::General, "t"),
            RiskFinding::unavailable(clause(2), ClauseType::General, "t"),
        ];
        let counts = LabelCounts::from_findings(&findings);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.unknown, 1);
        assert_eq!(counts.total(), 3);
        assert!(findings[2].is_unavailable());
    }
}
