//! Contract risk analysis
//!
//! Turns extracted contract text into a risk [`Report`](shared_types::Report):
//!
//! 1. [`LanguageDetector`] decides English, Hindi or Unknown
//! 2. [`ClauseSegmenter`] splits the text into ordered clauses
//! 3. [`RiskClassifier`] labels each clause through a [`ClassificationDelegate`]
//! 4. [`ReportAssembler`] builds the report with an aggregate label
//!
//! [`Analyzer`] runs the whole pipeline, including extraction, for one
//! upload or a batch of uploads.

pub mod alternatives;
pub mod classifier;
pub mod config;
pub mod delegate;
pub mod extractors;
pub mod language;
#[cfg(feature = "llm")]
pub mod llm;
pub mod patterns;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod segmenter;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::RiskClassifier;
pub use config::{AnalyzerConfig, ConfigError, RetryPolicy, RiskThresholds};
pub use delegate::{Classification, ClassificationDelegate, ClassificationRequest, DelegateError};
pub use extractors::EntityExtractor;
pub use language::LanguageDetector;
#[cfg(feature = "llm")]
pub use llm::{LlmConfig, LlmDelegate};
pub use pipeline::{AnalysisError, Analyzer, Upload};
pub use report::{AssemblyError, ReportAssembler};
pub use rules::{RuleDelegate, ScanHit, QUICK_SCAN_THRESHOLD};
pub use segmenter::{ClauseSegmenter, SegmentError};
