use shared_types::DocumentFormat;

use super::FormatBackend;
use crate::error::ExtractionError;

/// Plain text backend. The extracted text is the raw content, byte for byte.
pub struct TxtBackend;

impl TxtBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TxtBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatBackend for TxtBackend {
    fn name(&self) -> &'static str {
        "txt"
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        std::str::from_utf8(data).is_ok()
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        std::str::from_utf8(data)
            .map(str::to_string)
            .map_err(|e| ExtractionError::corrupt(DocumentFormat::Txt, format!("invalid UTF-8: {}", e)))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any valid UTF-8 string comes back unchanged
        #[test]
        fn txt_extraction_is_identity(raw in "\\PC*") {
            let text = TxtBackend::new().extract(raw.as_bytes()).unwrap();
            prop_assert_eq!(text, raw);
        }
    }
}
