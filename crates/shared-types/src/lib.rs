pub mod audit;
pub mod brief;
pub mod types;

pub use types::{
    aggregate_label, Clause, ClauseRef, ClauseType, Document, DocumentFormat, DocumentId,
    Entities, LabelCounts, Language, Report, ReportSummary, RiskFinding, RiskLabel,
};
