//! Legacy Word (.doc) backend
//!
//! Full Word 97 binary parsing is out of reach here, so text is recovered
//! heuristically from the OLE2 compound file: printable UTF-16LE runs
//! (complex/Unicode text) and printable 8-bit runs (compressed text).
//! Whichever yields more letters wins. Uploads tagged DOC that are really
//! zip containers are read as DOCX.

use shared_types::DocumentFormat;
use tracing::debug;

use super::docx::DocxBackend;
use super::{FormatBackend, ZIP_MAGIC};
use crate::error::ExtractionError;

const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Shortest run of printable characters kept as text
const MIN_RUN: usize = 6;

/// Directory entry and stream names of the compound file itself
const CONTAINER_NAMES: &[&str] = &[
    "Root Entry",
    "WordDocument",
    "SummaryInformation",
    "DocumentSummaryInformation",
    "CompObj",
    "1Table",
    "0Table",
    "Data",
    "ObjectPool",
];

pub struct DocBackend {
    docx: DocxBackend,
}

impl DocBackend {
    pub fn new() -> Self {
        Self {
            docx: DocxBackend::new(),
        }
    }
}

impl Default for DocBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatBackend for DocBackend {
    fn name(&self) -> &'static str {
        "doc"
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        data.starts_with(OLE_MAGIC) || data.starts_with(ZIP_MAGIC)
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        if data.starts_with(ZIP_MAGIC) {
            debug!("DOC upload is a zip container, reading as DOCX");
            return self.docx.extract_as(data, DocumentFormat::Doc);
        }
        if !data.starts_with(OLE_MAGIC) {
            return Err(ExtractionError::corrupt(
                DocumentFormat::Doc,
                "not an OLE2 compound file",
            ));
        }

        let body = &data[OLE_MAGIC.len()..];
        let wide = utf16_runs(body);
        let narrow = ascii_runs(body);

        let text = if letter_count(&wide) >= letter_count(&narrow) {
            wide
        } else {
            narrow
        };
        Ok(text)
    }
}

fn is_text_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (!c.is_control() && c != '\u{FFFD}')
}

fn letter_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Collect a run into `out` when it is long enough and not a container name
fn flush_run(run: &mut String, out: &mut Vec<String>) {
    let candidate = run.replace('\r', "\n");
    let trimmed = candidate.trim();
    if trimmed.chars().count() >= MIN_RUN && !CONTAINER_NAMES.contains(&trimmed) {
        out.push(candidate);
    }
    run.clear();
}

fn utf16_runs(data: &[u8]) -> String {
    let mut runs = Vec::new();
    let mut run = String::new();

    for pair in data.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        match char::from_u32(unit as u32).filter(|c| is_text_char(*c)) {
            // Plain Latin-1 bytes read as UTF-16 land in CJK; only keep
            // Latin, Devanagari and general punctuation ranges
            Some(c) if (unit < 0x0250) || (0x0900..=0x097F).contains(&unit) || (0x2000..=0x20CF).contains(&unit) => {
                run.push(c)
            }
            _ => flush_run(&mut run, &mut runs),
        }
    }
    flush_run(&mut run, &mut runs);

    runs.join("\n")
}

fn ascii_runs(data: &[u8]) -> String {
    let mut runs = Vec::new();
    let mut run = String::new();

    for &byte in data {
        let c = byte as char;
        if byte.is_ascii() && is_text_char(c) {
            run.push(c);
        } else {
            flush_run(&mut run, &mut runs);
        }
    }
    flush_run(&mut run, &mut runs);

    runs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_doc(text: &str, wide: bool) -> Vec<u8> {
        let mut data = OLE_MAGIC.to_vec();
        data.extend_from_slice(&[0u8; 24]);
        for name in ["Root Entry", "WordDocument"] {
            for unit in name.encode_utf16() {
                data.extend_from_slice(&unit.to_le_bytes());
            }
            data.extend_from_slice(&[0u8; 6]);
        }
        if wide {
            for unit in text.encode_utf16() {
                data.extend_from_slice(&unit.to_le_bytes());
            }
        } else {
            data.extend_from_slice(text.as_bytes());
        }
        data.extend_from_slice(&[0u8; 32]);
        data
    }

    #[test]
    fn test_recovers_unicode_text() {
        let doc = create_test_doc("खंड 1: भुगतान 30 दिनों में होगा।\rClause 2: Liability is capped.\r", true);
        let text = DocBackend::new().extract(&doc).unwrap();

        assert!(text.contains("खंड 1"), "got: {:?}", text);
        assert!(text.contains("Liability is capped."), "got: {:?}", text);
        assert!(!text.contains("WordDocument"));
    }

    #[test]
    fn test_recovers_8bit_text() {
        let doc = create_test_doc("Clause 1: The Supplier shall deliver goods.\rClause 2: Payment in INR.\r", false);
        let text = DocBackend::new().extract(&doc).unwrap();

        assert!(text.contains("The Supplier shall deliver goods."), "got: {:?}", text);
        assert!(text.contains("Payment in INR."));
    }

    #[test]
    fn test_mislabelled_docx_is_read() {
        let docx = super::super::docx::tests::create_test_docx(&["Section 1. Confidentiality."]);
        let text = DocBackend::new().extract(&docx).unwrap();
        assert_eq!(text, "Section 1. Confidentiality.\n");
    }

    #[test]
    fn test_unknown_container_is_corrupt() {
        let result = DocBackend::new().extract(b"{\\rtf1\\ansi hello}");
        assert!(matches!(
            result,
            Err(ExtractionError::CorruptInput {
                format: DocumentFormat::Doc,
                ..
            })
        ));
    }
}
