//! API handlers for the contract server
//!
//! Provides REST endpoints for:
//! - Text and entity extraction
//! - Rule-only quick scan for high-risk clauses
//! - Full risk analysis and the consultation brief
//! - Audit trail lookup

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use risk_engine::{EntityExtractor, ScanHit, Upload, QUICK_SCAN_THRESHOLD};
use serde::{Deserialize, Serialize};
use shared_types::audit::{hash_document, AuditAction, AuditChain};
use shared_types::{Document, DocumentFormat, Entities, Language, Report};
use tracing::{info, warn};

use crate::audit::is_valid_hash;
use crate::error::ServerError;
use crate::AppState;

const ACTOR: &str = "contract-server";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub delegate: String,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contract-server",
        version: env!("CARGO_PKG_VERSION"),
        delegate: state.analyzer.delegate_name().to_string(),
    })
}

#[derive(Serialize)]
pub struct FormatsResponse {
    pub success: bool,
    pub formats: Vec<&'static str>,
    pub languages: Vec<&'static str>,
}

/// Handler: GET /api/formats
pub async fn handle_list_formats() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        success: true,
        formats: DocumentFormat::ALL.iter().map(|f| f.tag()).collect(),
        languages: vec![Language::English.code(), Language::Hindi.code()],
    })
}

/// Upload request body shared by extract and analyze
#[derive(Deserialize)]
pub struct UploadRequest {
    pub filename: String,

    /// "PDF", "DOCX", "DOC" or "TXT"; inferred from the filename when empty
    #[serde(default)]
    pub format: String,

    pub content_base64: String,

    /// Optional language hint: "en" or "hi"
    #[serde(default)]
    pub language: Option<String>,
}

impl UploadRequest {
    pub(crate) fn into_upload(self) -> Result<Upload, ServerError> {
        if self.filename.trim().is_empty() {
            return Err(ServerError::InvalidRequest("filename is required".into()));
        }
        let bytes = STANDARD
            .decode(self.content_base64.trim())
            .map_err(|e| ServerError::InvalidRequest(format!("content_base64: {}", e)))?;

        let mut upload = Upload::new(self.filename, bytes, self.format);
        if let Some(code) = self.language.as_deref().filter(|c| !c.trim().is_empty()) {
            let language = Language::from_code(code).ok_or_else(|| {
                ServerError::InvalidRequest(format!(
                    "Invalid language '{}'. Must be 'en' or 'hi'",
                    code
                ))
            })?;
            upload = upload.with_language_hint(language);
        }
        Ok(upload)
    }
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub document_id: String,
    pub filename: String,
    pub format: DocumentFormat,
    pub language: Language,
    pub content_hash: String,
    pub characters: usize,
    pub text: String,
    pub entities: Entities,
}

/// Handler: POST /api/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<ExtractResponse>, ServerError> {
    let upload = req.into_upload()?;
    info!("Extract request: filename={}, format={}", upload.filename, upload.format);

    let document = ingest(&state, upload).await?;
    let entities = EntityExtractor::new().extract(&document.text);
    Ok(Json(ExtractResponse {
        success: true,
        document_id: document.id.to_string(),
        filename: document.filename,
        format: document.format,
        language: document.language,
        content_hash: document.content_hash,
        characters: document.text.chars().count(),
        text: document.text,
        entities,
    }))
}

#[derive(Serialize)]
pub struct QuickScanResponse {
    pub success: bool,
    pub filename: String,
    pub language: Language,
    pub content_hash: String,
    pub threshold: f64,
    pub high_risk: Vec<ScanHit>,
}

/// Handler: POST /api/quick-scan
pub async fn handle_quick_scan(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<QuickScanResponse>, ServerError> {
    let upload = req.into_upload()?;
    info!("Quick scan request: filename={}, format={}", upload.filename, upload.format);

    let document = ingest(&state, upload).await?;
    let high_risk = state.analyzer.quick_scan(&document);
    info!(document = %document.id, high_risk = high_risk.len(), "quick scan finished");

    Ok(Json(QuickScanResponse {
        success: true,
        filename: document.filename,
        language: document.language,
        content_hash: document.content_hash,
        threshold: QUICK_SCAN_THRESHOLD,
        high_risk,
    }))
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub report: Report,
}

/// Handler: POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let upload = req.into_upload()?;
    info!("Analyze request: filename={}, format={}", upload.filename, upload.format);

    let report = analyze(&state, upload).await?;
    Ok(Json(AnalyzeResponse {
        success: true,
        report,
    }))
}

/// Handler: POST /api/brief
///
/// Runs a full analysis and returns the consultation brief as a text download.
pub async fn handle_brief(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let upload = req.into_upload()?;
    info!("Brief request: filename={}", upload.filename);

    let report = analyze(&state, upload).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"legal_consultation_brief.txt\"",
            ),
        ],
        report.consultation_brief(),
    ))
}

/// Extract off the async runtime and audit the upload
async fn ingest(state: &AppState, upload: Upload) -> Result<Document, ServerError> {
    let analyzer = state.analyzer.clone();
    let ingest_upload = upload.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.ingest(&ingest_upload))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let document = match result {
        Ok(document) => document,
        Err(e) => {
            record_failure(state, &upload, e.to_string()).await;
            return Err(e.into());
        }
    };

    state
        .audit
        .record(
            &document.content_hash,
            ACTOR,
            vec![
                (
                    AuditAction::Upload {
                        filename: document.filename.clone(),
                        format: document.format,
                    },
                    None,
                ),
                (
                    AuditAction::Extracted {
                        language: document.language,
                        characters: document.text.chars().count(),
                    },
                    None,
                ),
            ],
        )
        .await?;
    Ok(document)
}

async fn analyze(state: &AppState, upload: Upload) -> Result<Report, ServerError> {
    let report = match state.analyzer.analyze(upload.clone()).await {
        Ok(report) => report,
        Err(e) => {
            record_failure(state, &upload, e.to_string()).await;
            return Err(e.into());
        }
    };

    state
        .audit
        .record(
            &report.content_hash,
            ACTOR,
            vec![
                (
                    AuditAction::Upload {
                        filename: report.filename.clone(),
                        format: report.format,
                    },
                    None,
                ),
                (
                    AuditAction::Analyzed {
                        clauses: report.findings.len(),
                        aggregate: report.aggregate,
                        unavailable: report.findings.iter().filter(|f| f.is_unavailable()).count(),
                    },
                    Some(format!("delegate={}", state.analyzer.delegate_name())),
                ),
            ],
        )
        .await?;
    Ok(report)
}

#[derive(Serialize)]
pub struct AuditResponse {
    pub success: bool,
    pub verified: bool,
    pub summary: Vec<String>,
    pub chain: AuditChain,
}

/// Handler: GET /api/audit/:hash
pub async fn handle_audit(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<AuditResponse>, ServerError> {
    let hash = hash.to_ascii_lowercase();
    if !is_valid_hash(&hash) {
        return Err(ServerError::InvalidRequest(
            "hash must be a 64-character SHA-256 hex digest".into(),
        ));
    }

    let chain = state
        .audit
        .get(&hash)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("No audit trail for {}", hash)))?;

    Ok(Json(AuditResponse {
        success: true,
        verified: chain.verify().is_ok(),
        summary: chain.summary(),
        chain,
    }))
}

/// Failures are audited too; a failed audit write must not mask the original error
async fn record_failure(state: &AppState, upload: &Upload, reason: String) {
    let hash = hash_document(&upload.bytes);
    if let Err(e) = state
        .audit
        .record(&hash, ACTOR, vec![(AuditAction::Failed { reason }, None)])
        .await
    {
        warn!(error = %e, "could not record failed analysis");
    }
}
