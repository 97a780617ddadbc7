//! Per-format extraction backends

pub mod doc;
pub mod docx;
pub mod pdf;
pub mod txt;

use crate::error::ExtractionError;

/// Trait for format-specific extraction backends
pub trait FormatBackend: Send + Sync {
    /// Backend identifier
    fn name(&self) -> &'static str;

    /// Quick byte check (no parse) whether the data looks like this format
    fn can_handle(&self, data: &[u8]) -> bool;

    /// Extract plain text. Emptiness is checked by the caller.
    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError>;
}

/// Zip local file header, shared by DOCX and mislabelled DOC uploads
pub(crate) const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
