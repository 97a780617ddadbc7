//! The classification capability the risk classifier delegates to

use async_trait::async_trait;
use shared_types::{ClauseType, Language, RiskLabel};
use thiserror::Error;

/// Errors a delegate may report for a single classification call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DelegateError {
    /// Worth retrying: timeouts, rate limits, upstream 5xx
    #[error("Transient delegate failure: {0}")]
    Transient(String),

    /// Retrying will not help: bad credentials, unparseable replies
    #[error("Permanent delegate failure: {0}")]
    Permanent(String),
}

impl DelegateError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DelegateError::Transient(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub text: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: RiskLabel,
    pub rationale: String,
    pub confidence: f64,
    /// Clause type if the delegate recognised one
    pub clause_type: Option<ClauseType>,
    pub suggested_alternative: Option<String>,
    /// Concrete ways the clause could hurt the SME
    pub potential_risks: Vec<String>,
    /// Points to raise with the counterparty
    pub negotiation_tips: Vec<String>,
}

impl Classification {
    pub fn new(label: RiskLabel, rationale: impl Into<String>, confidence: f64) -> Self {
        Self {
            label,
            rationale: rationale.into(),
            confidence,
            clause_type: None,
            suggested_alternative: None,
            potential_risks: Vec::new(),
            negotiation_tips: Vec::new(),
        }
    }

    pub fn with_clause_type(mut self, clause_type: ClauseType) -> Self {
        self.clause_type = Some(clause_type);
        self
    }

    pub fn with_alternative(mut self, alternative: impl Into<String>) -> Self {
        self.suggested_alternative = Some(alternative.into());
        self
    }

    pub fn with_risks(mut self, risks: Vec<String>) -> Self {
        self.potential_risks = risks;
        self
    }

    pub fn with_tips(mut self, tips: Vec<String>) -> Self {
        self.negotiation_tips = tips;
        self
    }
}

/// Maps clause text to a risk label
///
/// Implementations: [`crate::rules::RuleDelegate`] (local, never fails) and,
/// with the `llm` feature, [`crate::llm::LlmDelegate`].
#[async_trait]
pub trait ClassificationDelegate: Send + Sync {
    /// Name recorded on every finding this delegate produces
    fn name(&self) -> &str;

    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, DelegateError>;
}
