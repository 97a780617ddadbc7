//! Keyword tables and matching helpers shared by the rule set

use shared_types::ClauseType;

/// English terms that usually shift significant risk onto one party
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    "indemnify",
    "hold harmless",
    "unlimited liability",
    "penalty",
    "liquidated damages",
    "irrevocable",
    "non-compete",
    "non-solicit",
    "assignment without consent",
    "sole discretion",
    "unilateral",
    "automatic renewal",
    "confidential information forever",
    "proprietary information",
    "joint and several liability",
    "consequential damages",
    "punitive damages",
    "waiver of rights",
];

pub const MEDIUM_RISK_KEYWORDS: &[&str] = &[
    "termination for convenience",
    "governing law",
    "jurisdiction",
    "arbitration",
    "force majeure",
    "limitation of liability",
    "warranty",
    "representation",
    "insurance",
    "subcontract",
    "change of control",
    "intellectual property rights",
    "survival",
];

pub const LOW_RISK_KEYWORDS: &[&str] = &[
    "notice",
    "amendment",
    "severability",
    "entire agreement",
    "counterparts",
    "headings",
    "relationship of parties",
    "publicity",
    "assignment",
];

pub const HINDI_HIGH_RISK_KEYWORDS: &[&str] = &[
    "क्षतिपूर्ति",
    "असीमित दायित्व",
    "जुर्माना",
    "अपरिवर्तनीय",
    "गैर-प्रतिस्पर्धा",
    "एकतरफा",
    "स्वचालित नवीनीकरण",
    "संयुक्त दायित्व",
];

pub const HINDI_MEDIUM_RISK_KEYWORDS: &[&str] = &[
    "समाप्ति",
    "क्षेत्राधिकार",
    "मध्यस्थता",
    "अप्रत्याशित घटना",
    "दायित्व सीमा",
    "वारंटी",
];

/// Forums and laws that move disputes away from Indian courts
pub const FOREIGN_JURISDICTION_TERMS: &[&str] = &[
    "foreign jurisdiction",
    "foreign law",
    "overseas jurisdiction",
    "dispute resolution outside india",
    "non-indian arbitration",
    "payment in foreign currency",
    "offshore account",
    "lcia",
    "siac",
    "hkiac",
    "icc arbitration",
    "new york law",
    "english law",
    "singapore law",
];

pub const AMBIGUOUS_TERMS: &[&str] = &[
    "reasonable",
    "best efforts",
    "as soon as practicable",
    "commercially reasonable",
    "substantially",
];

/// Clause type keywords, checked in order; the first type with a hit wins
pub const CLAUSE_TYPE_KEYWORDS: &[(ClauseType, &[&str])] = &[
    (
        ClauseType::Indemnity,
        &["indemnif", "hold harmless", "defend", "क्षतिपूर्ति", "protect from loss", "make whole"],
    ),
    (
        ClauseType::Termination,
        &["terminat", "expir", "end of agreement", "समाप्ति", "cancellation", "wind up"],
    ),
    (
        ClauseType::Jurisdiction,
        &["jurisdiction", "governing law", "venue", "क्षेत्राधिकार", "applicable law", "न्यायालय"],
    ),
    (
        ClauseType::Arbitration,
        &["arbitration", "dispute resolution", "मध्यस्थता", "mediation", "conciliation"],
    ),
    (
        ClauseType::Confidentiality,
        &["confidential", "nda", "non-disclosure", "गोपनीयता", "proprietary information", "trade secret"],
    ),
    (
        ClauseType::Payment,
        &["payment", "fee", "fees", "price", "consideration", "भुगतान", "compensation", "remuneration"],
    ),
    (
        ClauseType::IpRights,
        &["intellectual property", "copyright", "patent", "बौद्धिक संपदा", "trademark", "invention"],
    ),
    (
        ClauseType::Warranty,
        &["warrant", "represent", "guarantee", "वारंटी", "assure", "certify"],
    ),
    (
        ClauseType::Liability,
        &["liability", "damage", "दायित्व", "loss", "claim"],
    ),
    (
        ClauseType::ForceMajeure,
        &["force majeure", "act of god", "अप्रत्याशित घटना", "unforeseen circumstances"],
    ),
];

/// Keywords this short must match a whole word ("fee" never matches "coffee" or "feel")
const WHOLE_WORD_MAX_CHARS: usize = 3;

/// Whether `keyword` occurs in `text_lower` starting at a word boundary
///
/// Longer keywords act as stems ("terminat" matches "termination"); short
/// ones must also end at a word boundary.
pub fn has_keyword(text_lower: &str, keyword: &str) -> bool {
    let whole_word = keyword.chars().count() <= WHOLE_WORD_MAX_CHARS;
    text_lower.match_indices(keyword).any(|(start, _)| {
        let end = start + keyword.len();
        let starts_word = !text_lower[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        let ends_word = !text_lower[end..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        starts_word && (ends_word || !whole_word)
    })
}

/// Keywords from `keywords` that occur in `text_lower`
pub fn matching_keywords<'a>(text_lower: &str, keywords: &[&'a str]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|keyword| has_keyword(text_lower, keyword))
        .copied()
        .collect()
}

pub fn contains_any(text_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| has_keyword(text_lower, keyword))
}

/// Keyword-based clause type; `General` when nothing matches
pub fn identify_clause_type(text: &str) -> ClauseType {
    let text_lower = text.to_lowercase();
    CLAUSE_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&text_lower, keywords))
        .map(|(clause_type, _)| *clause_type)
        .unwrap_or(ClauseType::General)
}

/// First `max_chars` characters of `text`, never splitting a char
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_clause_type() {
        assert_eq!(
            identify_clause_type("The Vendor shall indemnify and hold harmless the Buyer."),
            ClauseType::Indemnity
        );
        assert_eq!(
            identify_clause_type("Either party may terminate with 30 days notice."),
            ClauseType::Termination
        );
        assert_eq!(
            identify_clause_type("This agreement is governed by the laws of India."),
            ClauseType::General
        );
        assert_eq!(
            identify_clause_type("Governing law shall be Indian law."),
            ClauseType::Jurisdiction
        );
        assert_eq!(
            identify_clause_type("भुगतान 30 दिनों में किया जाएगा।"),
            ClauseType::Payment
        );
    }

    #[test]
    fn test_order_decides_ties() {
        // Mentions both payment and termination; termination is checked first
        assert_eq!(
            identify_clause_type("Termination does not affect payment already due."),
            ClauseType::Termination
        );
    }

    #[test]
    fn test_bare_ip_does_not_match_words() {
        assert_eq!(
            identify_clause_type("The recipient shall ship goods."),
            ClauseType::General
        );
    }

    #[test]
    fn test_short_keywords_need_whole_words() {
        for text in [
            "Goods shall meet the standard specification.",
            "Inspection is mandatory before dispatch.",
            "Delivery within ten calendar days.",
        ] {
            assert_eq!(identify_clause_type(text), ClauseType::General, "{}", text);
        }
        for text in ["Coffee is served at the venue.", "Staff may feel free to leave."] {
            assert_ne!(identify_clause_type(text), ClauseType::Payment, "{}", text);
        }

        assert_eq!(
            identify_clause_type("The parties signed an NDA."),
            ClauseType::Confidentiality
        );
        assert_eq!(
            identify_clause_type("Fees are due monthly."),
            ClauseType::Payment
        );
    }

    #[test]
    fn test_keywords_match_at_word_start() {
        assert!(has_keyword("the agreement terminates on expiry", "terminat"));
        assert!(has_keyword("(siac) rules apply", "siac"));
        assert!(!has_keyword("a misrepresentation", "represent"));
        assert!(has_keyword("क्षतिपूर्ति देय होगी", "क्षतिपूर्ति"));
    }

    #[test]
    fn test_matching_keywords() {
        let text = "liquidated damages and a penalty apply at its sole discretion";
        assert_eq!(
            matching_keywords(text, HIGH_RISK_KEYWORDS),
            vec!["penalty", "liquidated damages", "sole discretion"]
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("खंड 1", 3), "खंड");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
