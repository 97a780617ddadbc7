//! Script-ratio language detection

use shared_types::Language;

const DEVANAGARI: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Classifies text as English or Hindi by the share of Devanagari letters
/// among all alphabetic characters
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    threshold: f64,
}

impl LanguageDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn detect(&self, text: &str) -> Language {
        self.detect_with_confidence(text).0
    }

    /// Detected language and the ratio of the winning script
    pub fn detect_with_confidence(&self, text: &str) -> (Language, f64) {
        let (devanagari, latin, letters) = script_counts(text);
        if letters == 0 {
            return (Language::Unknown, 0.0);
        }

        let hindi_ratio = devanagari as f64 / letters as f64;
        let latin_ratio = latin as f64 / letters as f64;

        if hindi_ratio >= self.threshold {
            (Language::Hindi, hindi_ratio)
        } else if latin_ratio >= self.threshold {
            (Language::English, latin_ratio)
        } else {
            (Language::Unknown, hindi_ratio.max(latin_ratio))
        }
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(0.6)
    }
}

/// (devanagari, latin, all alphabetic)
fn script_counts(text: &str) -> (usize, usize, usize) {
    let mut devanagari = 0;
    let mut latin = 0;
    let mut letters = 0;

    for c in text.chars() {
        // Devanagari vowel signs are marks, not alphabetic, but still script
        if DEVANAGARI.contains(&c) {
            if c.is_alphabetic() || is_devanagari_mark(c) {
                devanagari += 1;
                letters += 1;
            }
        } else if c.is_alphabetic() {
            letters += 1;
            if c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c) {
                latin += 1;
            }
        }
    }

    (devanagari, latin, letters)
}

fn is_devanagari_mark(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{0903}' | '\u{093A}'..='\u{094F}' | '\u{0951}'..='\u{0957}' | '\u{0962}'..='\u{0963}')
}
