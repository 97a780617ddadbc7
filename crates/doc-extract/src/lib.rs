//! Plain-text extraction for uploaded contracts
//!
//! This crate turns the raw bytes of an upload into text the risk engine
//! can segment. Each supported format has its own backend:
//!
//! - PDF via `pdf-extract`
//! - DOCX by reading `word/document.xml` out of the zip container
//! - DOC (legacy Word) by scanning the compound file for text runs
//! - TXT as strict UTF-8
//!
//! # Example
//! ```no_run
//! use doc_extract::{ExtractionError, TextExtractor};
//!
//! fn read_contract(bytes: &[u8]) -> Result<(), ExtractionError> {
//!     let text = TextExtractor::new().extract_tagged(bytes, "pdf")?;
//!     println!("Extracted {} characters", text.chars().count());
//!     Ok(())
//! }
//! ```

pub mod backends;
pub mod error;

use shared_types::DocumentFormat;
use tracing::debug;

pub use backends::FormatBackend;
pub use error::ExtractionError;

use backends::{doc::DocBackend, docx::DocxBackend, pdf::PdfBackend, txt::TxtBackend};

/// Format-dispatching text extractor
pub struct TextExtractor {
    pdf: PdfBackend,
    docx: DocxBackend,
    doc: DocBackend,
    txt: TxtBackend,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self {
            pdf: PdfBackend::new(),
            docx: DocxBackend::new(),
            doc: DocBackend::new(),
            txt: TxtBackend::new(),
        }
    }

    /// Extract text from bytes declared with a format tag ("pdf", "DOCX", ".txt", ...)
    ///
    /// # Errors
    /// - `ExtractionError::UnsupportedFormat` - the tag is not PDF, DOCX, DOC or TXT
    /// - `ExtractionError::CorruptInput` - the bytes cannot be parsed as that format
    /// - `ExtractionError::EmptyResult` - the document contains no visible text
    pub fn extract_tagged(&self, data: &[u8], tag: &str) -> Result<String, ExtractionError> {
        let format = DocumentFormat::from_tag(tag)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(tag.to_string()))?;
        self.extract(data, format)
    }

    /// Extract text from bytes of a known format
    pub fn extract(&self, data: &[u8], format: DocumentFormat) -> Result<String, ExtractionError> {
        let backend = self.backend(format);
        debug!(
            backend = backend.name(),
            bytes = data.len(),
            "extracting document text"
        );

        let text = backend.extract(data)?;

        if text.chars().all(char::is_whitespace) {
            return Err(ExtractionError::EmptyResult(format));
        }

        debug!(
            backend = backend.name(),
            characters = text.chars().count(),
            "extraction complete"
        );
        Ok(text)
    }

    /// Guess the format from the leading bytes
    ///
    /// Checked in `DocumentFormat::ALL` order, so a zip container is DOCX and
    /// anything that is valid UTF-8 without another signature is TXT.
    pub fn sniff(&self, data: &[u8]) -> Option<DocumentFormat> {
        DocumentFormat::ALL
            .into_iter()
            .find(|format| self.backend(*format).can_handle(data))
    }

    fn backend(&self, format: DocumentFormat) -> &dyn FormatBackend {
        match format {
            DocumentFormat::Pdf => &self.pdf,
            DocumentFormat::Docx => &self.docx,
            DocumentFormat::Doc => &self.doc,
            DocumentFormat::Txt => &self.txt,
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}
