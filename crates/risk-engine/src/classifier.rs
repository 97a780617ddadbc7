//! Per-clause risk classification with retry and graceful degradation

use std::sync::Arc;

use shared_types::{Clause, Language, RiskFinding};
use tracing::{debug, warn};

use crate::alternatives::alternative_for;
use crate::config::RetryPolicy;
use crate::delegate::{
    Classification, ClassificationDelegate, ClassificationRequest, DelegateError,
};
use crate::patterns::identify_clause_type;

#[derive(Clone)]
pub struct RiskClassifier {
    delegate: Arc<dyn ClassificationDelegate>,
    retry: RetryPolicy,
}

impl RiskClassifier {
    pub fn new(delegate: Arc<dyn ClassificationDelegate>, retry: RetryPolicy) -> Self {
        Self { delegate, retry }
    }

    pub fn delegate_name(&self) -> &str {
        self.delegate.name()
    }

    /// Classify one clause; never fails
    ///
    /// A delegate that keeps failing (or fails permanently) yields an
    /// Unknown finding with rationale "classification unavailable".
    pub async fn classify(&self, clause: &Clause, language: Language) -> RiskFinding {
        let request = ClassificationRequest {
            text: clause.text.clone(),
            language,
        };

        match self.classify_with_retry(&request).await {
            Ok(classification) => self.finding_from(clause, classification),
            Err(e) => {
                warn!(
                    document = %clause.document_id,
                    clause = clause.ordinal,
                    delegate = self.delegate.name(),
                    error = %e,
                    "classification unavailable, degrading to Unknown"
                );
                RiskFinding::unavailable(
                    clause.clause_ref(),
                    identify_clause_type(&clause.text),
                    self.delegate.name(),
                )
            }
        }
    }

    async fn classify_with_retry(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, DelegateError> {
        let mut retries = 0;
        loop {
            match self.delegate.classify(request).await {
                Ok(classification) => return Ok(classification),
                Err(e) if e.is_transient() && retries < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retries);
                    retries += 1;
                    warn!(
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient classification failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn finding_from(&self, clause: &Clause, classification: Classification) -> RiskFinding {
        let clause_type = classification
            .clause_type
            .unwrap_or_else(|| identify_clause_type(&clause.text));

        // Delegate wording wins; the built-in template covers the rest
        let alternative = if classification.label.is_risky() {
            classification
                .suggested_alternative
                .clone()
                .or_else(|| alternative_for(clause_type, classification.label).map(str::to_string))
        } else {
            None
        };

        debug!(
            clause = clause.ordinal,
            label = %classification.label,
            clause_type = %clause_type,
            "classified clause"
        );

        RiskFinding::new(
            clause.clause_ref(),
            classification.label,
            classification.rationale,
            classification.confidence,
            clause_type,
            self.delegate.name(),
        )
        .with_alternative(alternative)
        .with_guidance(classification.potential_risks, classification.negotiation_tips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedDelegate;
    use shared_types::{ClauseType, DocumentId, RiskLabel};
    use std::time::Duration;

    fn clause(text: &str) -> Clause {
        Clause {
            document_id: DocumentId::from("doc-1"),
            ordinal: 3,
            start: 0,
            end: text.len(),
            text: text.to_string(),
            heading: None,
        }
    }

    fn transient() -> DelegateError {
        DelegateError::Transient("503 from upstream".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_degrade_to_unknown() {
        let delegate = Arc::new(ScriptedDelegate::new().always_failing(transient()));
        let classifier = RiskClassifier::new(delegate.clone(), RetryPolicy::default());

        let finding = classifier
            .classify(&clause("The Buyer may terminate at any time."), Language::English)
            .await;

        assert_eq!(finding.label, RiskLabel::Unknown);
        assert_eq!(finding.rationale, "classification unavailable");
        assert!(finding.is_unavailable());
        assert_eq!(finding.clause.ordinal, 3);
        assert_eq!(finding.clause_type, ClauseType::Termination);
        assert_eq!(finding.source, "scripted");

        assert_eq!(delegate.calls(), 3);
        let times = delegate.call_times();
        let first_wait = times[1] - times[0];
        let second_wait = times[2] - times[1];
        assert!(first_wait >= Duration::from_millis(500) && first_wait < Duration::from_millis(600));
        assert!(second_wait >= Duration::from_millis(1000) && second_wait < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let delegate = Arc::new(
            ScriptedDelegate::new()
                .failing_first(vec![transient(), transient()])
                .answering("Payment", Classification::new(RiskLabel::Low, "standard term", 0.9)),
        );
        let classifier = RiskClassifier::new(delegate.clone(), RetryPolicy::default());

        let finding = classifier
            .classify(&clause("Payment due in 30 days."), Language::English)
            .await;

        assert_eq!(delegate.calls(), 3);
        assert_eq!(finding.label, RiskLabel::Low);
        assert_eq!(finding.rationale, "standard term");
        assert_eq!(finding.confidence, 0.9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let delegate = Arc::new(
            ScriptedDelegate::new()
                .always_failing(DelegateError::Permanent("invalid api key".to_string())),
        );
        let classifier = RiskClassifier::new(delegate.clone(), RetryPolicy::default());

        let finding = classifier
            .classify(&clause("Anything."), Language::English)
            .await;

        assert_eq!(delegate.calls(), 1);
        assert!(finding.is_unavailable());
    }

    #[tokio::test]
    async fn test_clause_type_and_alternative_enrichment() {
        let delegate = Arc::new(
            ScriptedDelegate::new()
                .answering(
                    "indemnify",
                    Classification::new(RiskLabel::High, "uncapped indemnity", 0.8),
                )
                .answering(
                    "terminate",
                    Classification::new(RiskLabel::Medium, "short notice", 0.7)
                        .with_clause_type(ClauseType::Termination)
                        .with_alternative("Thirty days notice for both parties."),
                )
                .answering(
                    "confidential",
                    Classification::new(RiskLabel::Low, "mutual", 0.9),
                ),
        );
        let classifier = RiskClassifier::new(delegate, RetryPolicy::default());

        let high = classifier
            .classify(&clause("The Supplier shall indemnify the Buyer."), Language::English)
            .await;
        assert_eq!(high.clause_type, ClauseType::Indemnity);
        assert!(high.suggested_alternative.is_some());

        let medium = classifier
            .classify(&clause("Either party may terminate."), Language::English)
            .await;
        assert_eq!(
            medium.suggested_alternative.as_deref(),
            Some("Thirty days notice for both parties.")
        );

        let low = classifier
            .classify(&clause("Both parties keep confidential data safe."), Language::English)
            .await;
        assert_eq!(low.clause_type, ClauseType::Confidentiality);
        assert_eq!(low.suggested_alternative, None);
    }

    #[tokio::test]
    async fn test_delegate_alternative_kept_without_template() {
        let delegate = Arc::new(
            ScriptedDelegate::new()
                .answering(
                    "warrants",
                    Classification::new(RiskLabel::High, "unlimited warranty", 0.8)
                        .with_clause_type(ClauseType::Warranty)
                        .with_alternative("Warranty limited to 12 months from delivery."),
                )
                .answering(
                    "colour",
                    Classification::new(RiskLabel::Low, "cosmetic", 0.9)
                        .with_clause_type(ClauseType::General)
                        .with_alternative("Any colour is fine."),
                ),
        );
        let classifier = RiskClassifier::new(delegate, RetryPolicy::default());

        let risky = classifier
            .classify(&clause("The Supplier warrants the goods forever."), Language::English)
            .await;
        assert_eq!(risky.clause_type, ClauseType::Warranty);
        assert_eq!(
            risky.suggested_alternative.as_deref(),
            Some("Warranty limited to 12 months from delivery.")
        );

        let benign = classifier
            .classify(&clause("The colour of the packaging is blue."), Language::English)
            .await;
        assert_eq!(benign.suggested_alternative, None);
    }

    #[tokio::test]
    async fn test_guidance_carried_onto_finding() {
        let delegate = Arc::new(ScriptedDelegate::new().answering(
            "penalty",
            Classification::new(RiskLabel::High, "uncapped penalty", 0.8)
                .with_risks(vec!["Penalty exceeds contract value".to_string()])
                .with_tips(vec!["Cap penalties at 10% of fees".to_string()]),
        ));
        let classifier = RiskClassifier::new(delegate, RetryPolicy::default());

        let finding = classifier
            .classify(&clause("A penalty of INR 1,00,000 per day applies."), Language::English)
            .await;
        assert_eq!(finding.potential_risks, vec!["Penalty exceeds contract value"]);
        assert_eq!(finding.negotiation_tips, vec!["Cap penalties at 10% of fees"]);
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_clamped() {
        let delegate = Arc::new(
            ScriptedDelegate::new()
                .answering("x", Classification::new(RiskLabel::High, "overconfident", 7.5)),
        );
        let classifier = RiskClassifier::new(delegate, RetryPolicy::default());

        let finding = classifier.classify(&clause("x"), Language::English).await;
        assert_eq!(finding.confidence, 1.0);
    }
}
