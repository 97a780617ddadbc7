//! SME-friendly replacement wording per clause type

use shared_types::{ClauseType, RiskLabel};

const INDEMNITY: &str = "Each party shall indemnify the other only for direct losses caused by \
their gross negligence or willful misconduct. The total indemnity shall not exceed 1.5 times the \
contract value or ₹5,00,000, whichever is lower. This clause survives termination for 2 years.";

const TERMINATION: &str = "Either party may terminate this agreement with 30 days written notice. \
For material breach, 15 days notice to cure is required. Upon termination, each party shall return \
all confidential information. Payments due for services already rendered shall be made within 15 days.";

const JURISDICTION: &str = "This agreement shall be governed by Indian laws. Any disputes shall be \
subject to the exclusive jurisdiction of courts in [City, State], India. Arbitration, if any, shall \
be conducted in India under the Arbitration and Conciliation Act, 1996.";

const CONFIDENTIALITY: &str = "Confidential Information means information marked as confidential. \
The Receiving Party shall protect it using reasonable care for 3 years after termination. \
Information that becomes public through no fault of Receiver is not confidential.";

const PAYMENT: &str = "Payment of ₹[Amount] shall be made within 30 days of receiving a proper \
invoice. Late payments incur interest at 1.5% per month. All disputes regarding invoices must be \
raised within 15 days.";

/// Suggested wording for `clause_type`, if one exists
pub fn sme_alternative(clause_type: ClauseType) -> Option<&'static str> {
    match clause_type {
        ClauseType::Indemnity => Some(INDEMNITY),
        ClauseType::Termination => Some(TERMINATION),
        ClauseType::Jurisdiction => Some(JURISDICTION),
        ClauseType::Confidentiality => Some(CONFIDENTIALITY),
        ClauseType::Payment => Some(PAYMENT),
        _ => None,
    }
}

/// Alternatives are only worth showing for clauses that carry real risk
pub fn alternative_for(clause_type: ClauseType, label: RiskLabel) -> Option<&'static str> {
    if label.is_risky() {
        sme_alternative(clause_type)
    } else {
        None
    }
}
