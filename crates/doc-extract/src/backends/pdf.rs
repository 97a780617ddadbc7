//! PDF backend using pdf-extract

use std::panic::{self, AssertUnwindSafe};

use shared_types::DocumentFormat;
use tracing::warn;

use super::FormatBackend;
use crate::error::ExtractionError;

pub struct PdfBackend;

impl PdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatBackend for PdfBackend {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        data.len() > 4 && &data[0..4] == b"%PDF"
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        if !self.can_handle(data) {
            return Err(ExtractionError::corrupt(
                DocumentFormat::Pdf,
                "missing %PDF header",
            ));
        }

        // pdf-extract panics on some malformed content streams
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(data)
        }));

        match outcome {
            Ok(Ok(text)) => Ok(normalize_page_breaks(&text)),
            Ok(Err(e)) => {
                let error_msg = e.to_string();
                if error_msg.to_lowercase().contains("encrypt") {
                    return Err(ExtractionError::corrupt(
                        DocumentFormat::Pdf,
                        "password-protected PDF",
                    ));
                }
                Err(ExtractionError::corrupt(DocumentFormat::Pdf, error_msg))
            }
            Err(_) => {
                warn!("pdf-extract panicked while parsing upload");
                Err(ExtractionError::corrupt(
                    DocumentFormat::Pdf,
                    "PDF structure could not be parsed",
                ))
            }
        }
    }
}

/// Form feeds separate pages in pdf-extract output; turn them into blank lines
fn normalize_page_breaks(text: &str) -> String {
    text.replace('\x0C', "\n\n")
}
