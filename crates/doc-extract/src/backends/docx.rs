//! DOCX backend
//!
//! A DOCX file is a zip container; the body text lives in
//! `word/document.xml` as WordprocessingML. Each paragraph (`w:p`)
//! becomes one line, `w:tab` a tab and `w:br`/`w:cr` a line break.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use shared_types::DocumentFormat;

use super::{FormatBackend, ZIP_MAGIC};
use crate::error::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Largest decompressed `word/document.xml` accepted
pub const MAX_DOCUMENT_PART_BYTES: u64 = 32 * 1024 * 1024;

pub struct DocxBackend {
    max_part_bytes: u64,
}

impl DocxBackend {
    pub fn new() -> Self {
        Self::with_limit(MAX_DOCUMENT_PART_BYTES)
    }

    pub fn with_limit(max_part_bytes: u64) -> Self {
        Self { max_part_bytes }
    }

    /// Shared with the DOC backend for mislabelled uploads
    pub(crate) fn extract_as(
        &self,
        data: &[u8],
        format: DocumentFormat,
    ) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| ExtractionError::corrupt(format, format!("invalid zip container: {}", e)))?;

        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractionError::corrupt(format, format!("{} missing: {}", DOCUMENT_PART, e)))?;

        // The declared size can lie, so the read is capped as well
        let too_large = || {
            ExtractionError::corrupt(
                format,
                format!("{} exceeds {} bytes uncompressed", DOCUMENT_PART, self.max_part_bytes),
            )
        };
        if part.size() > self.max_part_bytes {
            return Err(too_large());
        }

        let mut xml = String::new();
        part.take(self.max_part_bytes + 1)
            .read_to_string(&mut xml)
            .map_err(|e| ExtractionError::corrupt(format, format!("unreadable {}: {}", DOCUMENT_PART, e)))?;
        if xml.len() as u64 > self.max_part_bytes {
            return Err(too_large());
        }

        paragraphs_from_xml(&xml).map_err(|reason| ExtractionError::corrupt(format, reason))
    }
}

impl Default for DocxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatBackend for DocxBackend {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        data.starts_with(ZIP_MAGIC)
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        self.extract_as(data, DocumentFormat::Docx)
    }
}

/// Walk WordprocessingML and collect visible text
fn paragraphs_from_xml(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    // w:tab also appears inside paragraph properties as a tab stop definition
    let mut in_properties = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:pPr" => in_properties = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:pPr" => in_properties = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" if !in_properties => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("bad text at {}: {}", reader.buffer_position(), e))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed XML at {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build a minimal DOCX whose body has one paragraph per entry
    pub(crate) fn create_test_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut body = String::new();
        for p in paragraphs {
            body.push_str(&format!(
                "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
                 <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
                p
            ));
        }
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}</w:body></w:document>",
            body
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extracts_paragraphs() {
        let docx = create_test_docx(&[
            "1. The Vendor shall indemnify the Buyer.",
            "2. Payment within 30 days.",
        ]);
        let text = DocxBackend::new().extract(&docx).unwrap();
        assert_eq!(
            text,
            "1. The Vendor shall indemnify the Buyer.\n2. Payment within 30 days.\n"
        );
    }

    #[test]
    fn test_runs_tabs_and_breaks() {
        let xml = "<w:document><w:body>\
                   <w:p><w:r><w:t>Clause</w:t></w:r><w:r><w:tab/><w:t>1</w:t><w:br/><w:t>A &amp; B</w:t></w:r></w:p>\
                   <w:p/>\
                   </w:body></w:document>";
        assert_eq!(paragraphs_from_xml(xml).unwrap(), "Clause\t1\nA & B\n\n");
    }

    #[test]
    fn test_not_a_zip_is_corrupt() {
        let result = DocxBackend::new().extract(b"plain text pretending to be docx");
        assert!(matches!(
            result,
            Err(ExtractionError::CorruptInput {
                format: DocumentFormat::Docx,
                ..
            })
        ));
    }

    #[test]
    fn test_zip_without_document_part_is_corrupt() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("hello.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        let data = writer.finish().unwrap().into_inner();

        let result = DocxBackend::new().extract(&data);
        assert!(matches!(result, Err(ExtractionError::CorruptInput { .. })));
    }

    #[test]
    fn test_oversized_document_part_is_rejected() {
        let paragraph = "x".repeat(4096);
        let docx = create_test_docx(&[paragraph.as_str(); 4]);
        assert!(docx.len() < 4096);

        let result = DocxBackend::with_limit(8 * 1024).extract(&docx);
        match result {
            Err(ExtractionError::CorruptInput { format, reason }) => {
                assert_eq!(format, DocumentFormat::Docx);
                assert!(reason.contains("exceeds 8192 bytes"), "{}", reason);
            }
            other => panic!("expected size rejection, got {:?}", other),
        }

        let text = DocxBackend::with_limit(64 * 1024).extract(&docx).unwrap();
        assert_eq!(text.len(), 4 * 4097);
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(DocxBackend::new().max_part_bytes, MAX_DOCUMENT_PART_BYTES);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(paragraphs_from_xml("<w:p><w:t>unterminated</w:p>").is_err());
    }
}
