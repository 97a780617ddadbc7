//! End-to-end analysis: extract, detect, segment, classify, assemble
//!
//! Stages run in order for one document. Clause classification is the only
//! suspending stage; up to `max_concurrent_classifications` delegate calls
//! are in flight at once and results are collected in clause order before
//! the report is assembled. Separate documents share nothing mutable and
//! run as independent tasks in [`Analyzer::analyze_batch`].

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use doc_extract::{ExtractionError, TextExtractor};
use futures::stream::{self, StreamExt};
use shared_types::audit::hash_document;
use shared_types::{Clause, Document, DocumentFormat, DocumentId, Language, Report, RiskFinding};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::classifier::RiskClassifier;
use crate::config::AnalyzerConfig;
use crate::delegate::ClassificationDelegate;
use crate::language::LanguageDetector;
use crate::report::{AssemblyError, ReportAssembler};
use crate::rules::{self, RuleDelegate, ScanHit};
use crate::segmenter::ClauseSegmenter;

/// A document as received at the upload boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Declared format tag; empty means infer from the filename or content
    pub format: String,
    /// Overrides language detection when set
    pub language_hint: Option<Language>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            format: format.into(),
            language_hint: None,
        }
    }

    pub fn with_language_hint(mut self, language: Language) -> Self {
        self.language_hint = Some(language);
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}

struct AnalyzerInner {
    extractor: TextExtractor,
    detector: LanguageDetector,
    segmenter: ClauseSegmenter,
    classifier: RiskClassifier,
    assembler: ReportAssembler,
    config: AnalyzerConfig,
}

/// Cheap to clone; clones share the same delegate
#[derive(Clone)]
pub struct Analyzer {
    inner: Arc<AnalyzerInner>,
}

impl Analyzer {
    pub fn new(delegate: Arc<dyn ClassificationDelegate>, config: AnalyzerConfig) -> Self {
        Self {
            inner: Arc::new(AnalyzerInner {
                extractor: TextExtractor::new(),
                detector: LanguageDetector::new(config.language_threshold),
                segmenter: ClauseSegmenter::new(),
                classifier: RiskClassifier::new(delegate, config.retry),
                assembler: ReportAssembler::new(),
                config,
            }),
        }
    }

    /// Analyzer backed by the local rule engine
    pub fn with_rules(config: AnalyzerConfig) -> Self {
        let delegate = Arc::new(RuleDelegate::new(config.thresholds));
        Self::new(delegate, config)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.inner.config
    }

    pub fn delegate_name(&self) -> &str {
        self.inner.classifier.delegate_name()
    }

    /// Extract text and build the Document; blocking, CPU-bound
    pub fn ingest(&self, upload: &Upload) -> Result<Document, ExtractionError> {
        let format = resolve_format(&self.inner.extractor, upload)?;
        let text = self.inner.extractor.extract(&upload.bytes, format)?;

        let (detected, ratio) = self.inner.detector.detect_with_confidence(&text);
        let language = match upload.language_hint {
            Some(hint) => {
                if hint != detected {
                    debug!(hint = hint.code(), detected = detected.code(), "language hint overrides detection");
                }
                hint
            }
            None => detected,
        };

        let document = Document {
            id: DocumentId::new(),
            filename: upload.filename.clone(),
            format,
            text,
            language,
            content_hash: hash_document(&upload.bytes),
        };

        info!(
            document = %document.id,
            format = format.tag(),
            language = language.code(),
            script_ratio = ratio,
            characters = document.text.chars().count(),
            "document ingested"
        );
        Ok(document)
    }

    pub fn segment(&self, document: &Document) -> Vec<Clause> {
        self.inner
            .segmenter
            .segment_or_whole(&document.id, &document.text, document.language)
    }

    /// Rule-only scan for high-risk clauses; never calls the delegate
    pub fn quick_scan(&self, document: &Document) -> Vec<ScanHit> {
        rules::quick_scan(&self.segment(document), document.language)
    }

    /// Classify every clause, preserving clause order
    pub async fn classify_all(&self, document: &Document, clauses: &[Clause]) -> Vec<RiskFinding> {
        let language = document.language;
        let classifier = &self.inner.classifier;
        let limit = self.inner.config.max_concurrent_classifications.max(1);

        // Collected up front; a lazy `map` over borrowed clauses is not Send inside spawned tasks
        let pending: Vec<_> = clauses
            .iter()
            .map(|clause| classifier.classify(clause, language))
            .collect();

        stream::iter(pending).buffered(limit).collect().await
    }

    pub async fn analyze(&self, upload: Upload) -> Result<Report, AnalysisError> {
        let analyzer = self.clone();
        let document = tokio::task::spawn_blocking(move || analyzer.ingest(&upload))
            .await
            .map_err(|e| AnalysisError::TaskFailed(e.to_string()))??;

        let clauses = self.segment(&document);
        info!(document = %document.id, clauses = clauses.len(), "document segmented");

        let findings = self.classify_all(&document, &clauses).await;

        let report = self
            .inner
            .assembler
            .assemble(&document, &clauses, findings, Utc::now())?;

        info!(
            document = %report.document_id,
            aggregate = %report.aggregate,
            findings = report.findings.len(),
            unavailable = report.findings.iter().filter(|f| f.is_unavailable()).count(),
            "report assembled"
        );
        Ok(report)
    }

    /// Races the analysis against `cancel`; a cancelled analysis produces no report
    pub async fn analyze_until<F>(&self, upload: Upload, cancel: F) -> Result<Report, AnalysisError>
    where
        F: Future<Output = ()>,
    {
        let filename = upload.filename.clone();
        tokio::select! {
            biased;
            _ = cancel => {
                info!(filename = %filename, "analysis cancelled");
                Err(AnalysisError::Cancelled)
            }
            result = self.analyze(upload) => result,
        }
    }

    /// Analyze documents in parallel, one task each; results keep input order
    pub async fn analyze_batch(&self, uploads: Vec<Upload>) -> Vec<Result<Report, AnalysisError>> {
        let count = uploads.len();
        let mut tasks = JoinSet::new();

        for (index, upload) in uploads.into_iter().enumerate() {
            let analyzer = self.clone();
            tasks.spawn(async move { (index, analyzer.analyze(upload).await) });
        }

        let mut results: Vec<Option<Result<Report, AnalysisError>>> =
            (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!(error = %e, "batch analysis task failed"),
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(AnalysisError::TaskFailed(
                        "analysis task did not complete".to_string(),
                    ))
                })
            })
            .collect()
    }
}

/// Declared tag, else filename extension, else content signature
fn resolve_format(
    extractor: &TextExtractor,
    upload: &Upload,
) -> Result<DocumentFormat, ExtractionError> {
    if upload.format.trim().is_empty() {
        return DocumentFormat::from_filename(&upload.filename)
            .or_else(|| extractor.sniff(&upload.bytes))
            .ok_or_else(|| ExtractionError::UnsupportedFormat(upload.filename.clone()));
    }
    DocumentFormat::from_tag(&upload.format)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(upload.format.clone()))
}
