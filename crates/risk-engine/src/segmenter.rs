//! Clause segmentation
//!
//! Boundaries are always line starts. A line opens a clause when it looks
//! like a heading (`Clause 4`, `# Payment`, `TERMINATION`), a numbered item
//! (`1.`, `2.3`, `(a)`, `iv.`) or, when the document has too little of
//! either, the first line of a new paragraph. Clause spans tile the text:
//! delimiter whitespace stays with the clause it follows.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Clause, DocumentId, Language};
use thiserror::Error;
use tracing::debug;

lazy_static! {
    static ref KEYWORD_HEADING: Regex =
        Regex::new(r"(?i)^(clause|section|article|schedule|annex(?:ure)?)\s+([0-9]+(?:\.[0-9]+)*)").unwrap();
    static ref HINDI_KEYWORD_HEADING: Regex =
        Regex::new(r"^(खंड|अनुच्छेद|धारा|प्रावधान)\s*([0-9०-९]+(?:\.[0-9०-९]+)*)").unwrap();
    static ref MARKDOWN_HEADING: Regex = Regex::new(r"^#{1,6}\s+(\S.*)$").unwrap();
    static ref CAPS_HEADING: Regex = Regex::new(
        r"^(?:(?:[0-9]+(?:\.[0-9]+)*|[IVXLC]+)[.)]\s+)?([A-Z][A-Z0-9 &,/'()-]{2,59})[:.]?$"
    )
    .unwrap();
    static ref NUMBERING: Regex = Regex::new(
        r"^([0-9]+(?:\.[0-9]+)+\.?|[0-9]{1,3}[.)]|\((?:[A-Za-z]{1,3}|[0-9]{1,3})\)|[a-z][.)]|(?i:[ivxlc]{1,5})[.)])(?:\s|$)"
    )
    .unwrap();
    static ref DEVANAGARI_NUMBERING: Regex = Regex::new(r"^([०-९]+[.)])(?:\s|$)").unwrap();
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("No clause structure found ({candidates} candidate boundaries)")]
    NoStructureFound { candidates: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryKind {
    Heading,
    Numbered,
    BlankLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Boundary {
    offset: usize,
    kind: BoundaryKind,
    label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseSegmenter;

impl ClauseSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into ordered clauses covering every byte exactly once
    pub fn segment(
        &self,
        document_id: &DocumentId,
        text: &str,
        language: Language,
    ) -> Result<Vec<Clause>, SegmentError> {
        let (structural, blank) = find_boundaries(text, language);

        let boundaries = if structural.len() >= 2 {
            structural
        } else {
            merge_boundaries(structural, blank)
        };

        if boundaries.len() < 2 {
            return Err(SegmentError::NoStructureFound {
                candidates: boundaries.len(),
            });
        }

        debug!(
            boundaries = boundaries.len(),
            kind = ?boundaries[0].kind,
            "segmented document"
        );
        Ok(build_clauses(document_id, text, &boundaries))
    }

    /// Like [`segment`](Self::segment) but falls back to one clause holding
    /// the whole text
    pub fn segment_or_whole(
        &self,
        document_id: &DocumentId,
        text: &str,
        language: Language,
    ) -> Vec<Clause> {
        match self.segment(document_id, text, language) {
            Ok(clauses) => clauses,
            Err(e) => {
                debug!("{}; treating document as a single clause", e);
                vec![Clause {
                    document_id: document_id.clone(),
                    ordinal: 0,
                    start: 0,
                    end: text.len(),
                    text: text.to_string(),
                    heading: None,
                }]
            }
        }
    }
}

/// Heading and numbering boundaries, and blank-line boundaries, in offset order
fn find_boundaries(text: &str, language: Language) -> (Vec<Boundary>, Vec<Boundary>) {
    let hindi_patterns = language != Language::English;
    let mut structural = Vec::new();
    let mut blank = Vec::new();

    let mut offset = 0;
    let mut seen_content = false;
    let mut after_blank = false;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let content = line.trim();
        if content.is_empty() {
            after_blank = true;
            continue;
        }

        if let Some(label) = heading_label(content, hindi_patterns) {
            structural.push(Boundary {
                offset: line_start,
                kind: BoundaryKind::Heading,
                label: Some(label),
            });
        } else if let Some(marker) = numbering_marker(content, hindi_patterns) {
            structural.push(Boundary {
                offset: line_start,
                kind: BoundaryKind::Numbered,
                label: Some(marker),
            });
        }

        if after_blank && seen_content {
            blank.push(Boundary {
                offset: line_start,
                kind: BoundaryKind::BlankLine,
                label: None,
            });
        }

        seen_content = true;
        after_blank = false;
    }

    (structural, blank)
}

fn heading_label(line: &str, hindi_patterns: bool) -> Option<String> {
    if let Some(caps) = KEYWORD_HEADING.captures(line) {
        return Some(format!("{} {}", &caps[1], &caps[2]));
    }
    if hindi_patterns {
        if let Some(caps) = HINDI_KEYWORD_HEADING.captures(line) {
            return Some(format!("{} {}", &caps[1], &caps[2]));
        }
    }
    if let Some(caps) = MARKDOWN_HEADING.captures(line) {
        return Some(caps[1].trim().to_string());
    }
    if let Some(caps) = CAPS_HEADING.captures(line) {
        let title = caps[1].trim();
        if title.chars().filter(|c| c.is_ascii_uppercase()).count() >= 3 {
            return Some(title.to_string());
        }
    }
    None
}

fn numbering_marker(line: &str, hindi_patterns: bool) -> Option<String> {
    if let Some(caps) = NUMBERING.captures(line) {
        return Some(caps[1].to_string());
    }
    if hindi_patterns {
        if let Some(caps) = DEVANAGARI_NUMBERING.captures(line) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Union by offset; a structural boundary wins over a blank-line one at the same line
fn merge_boundaries(structural: Vec<Boundary>, blank: Vec<Boundary>) -> Vec<Boundary> {
    let mut merged = structural;
    for boundary in blank {
        if !merged.iter().any(|b| b.offset == boundary.offset) {
            merged.push(boundary);
        }
    }
    merged.sort_by_key(|b| b.offset);
    merged
}

fn build_clauses(document_id: &DocumentId, text: &str, boundaries: &[Boundary]) -> Vec<Clause> {
    let mut spans: Vec<(usize, Option<String>)> = Vec::with_capacity(boundaries.len() + 1);

    let first = boundaries[0].offset;
    if first > 0 && !text[..first].trim().is_empty() {
        spans.push((0, None));
        spans.extend(boundaries.iter().map(|b| (b.offset, b.label.clone())));
    } else {
        spans.push((0, boundaries[0].label.clone()));
        spans.extend(boundaries[1..].iter().map(|b| (b.offset, b.label.clone())));
    }

    spans
        .iter()
        .enumerate()
        .map(|(ordinal, (start, heading))| {
            let end = spans
                .get(ordinal + 1)
                .map(|(next, _)| *next)
                .unwrap_or(text.len());
            Clause {
                document_id: document_id.clone(),
                ordinal,
                start: *start,
                end,
                text: text[*start..end].to_string(),
                heading: heading.clone(),
            }
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn contract_text() -> impl Strategy<Value = String> {
        let piece = prop_oneof![
            Just("Clause 1: ".to_string()),
            Just("Section 2.1 ".to_string()),
            Just("1. ".to_string()),
            Just("(a) ".to_string()),
            Just("TERMINATION\n".to_string()),
            Just("खंड ३ ".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            Just("\r\n".to_string()),
            "[a-zA-Z0-9 .,;:]{0,30}",
            "[अ-ह ।]{0,10}",
        ];
        proptest::collection::vec(piece, 0..24).prop_map(|pieces| pieces.concat())
    }

    fn language() -> impl Strategy<Value = Language> {
        prop_oneof![
            Just(Language::English),
            Just(Language::Hindi),
            Just(Language::Unknown)
        ]
    }

    proptest! {
        #[test]
        fn clauses_tile_the_text(text in contract_text(), language in language()) {
            let id = DocumentId::from("doc");
            let clauses = ClauseSegmenter::new().segment_or_whole(&id, &text, language);

            prop_assert!(!clauses.is_empty());
            prop_assert_eq!(clauses[0].start, 0);
            prop_assert_eq!(clauses[clauses.len() - 1].end, text.len());

            for (i, clause) in clauses.iter().enumerate() {
                prop_assert_eq!(clause.ordinal, i);
                prop_assert_eq!(&clause.text, &text[clause.span()]);
                if i > 0 {
                    prop_assert_eq!(clauses[i - 1].end, clause.start);
                    prop_assert!(clause.start < clause.end);
                }
            }

            let joined: String = clauses.iter().map(|c| c.text.as_str()).collect();
            prop_assert_eq!(joined, text);
        }
    }
}
