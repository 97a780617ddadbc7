use shared_types::DocumentFormat;
use thiserror::Error;

/// Extraction errors. All of them are fatal for the document being processed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Unsupported format '{0}'. Must be PDF, DOCX, DOC or TXT")]
    UnsupportedFormat(String),

    #[error("Corrupt {format} input: {reason}")]
    CorruptInput {
        format: DocumentFormat,
        reason: String,
    },

    #[error("{0} document contains no extractable text")]
    EmptyResult(DocumentFormat),
}

impl ExtractionError {
    pub(crate) fn corrupt(format: DocumentFormat, reason: impl Into<String>) -> Self {
        ExtractionError::CorruptInput {
            format,
            reason: reason.into(),
        }
    }
}
