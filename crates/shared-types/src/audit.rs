//! Tamper-evident audit trail for contract analyses

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{DocumentFormat, Language, RiskLabel};

/// Types of auditable events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Upload {
        filename: String,
        format: DocumentFormat,
    },
    Extracted {
        language: Language,
        characters: usize,
    },
    Analyzed {
        clauses: usize,
        aggregate: RiskLabel,
        unavailable: usize,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Chain broken at event {index}: expected prev {expected:?}, got {found:?}")]
    ChainBroken {
        index: usize,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Audit chain serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: String,
    pub action: AuditAction,
    pub actor: String,
    pub document_hash: String,
    pub previous_hash: Option<String>,
    pub details: Option<String>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        actor: &str,
        document_hash: &str,
        previous_hash: Option<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            action,
            actor: actor.to_string(),
            document_hash: document_hash.to_string(),
            previous_hash,
            details,
        }
    }

    /// Compute the hash of this event (for chain linking)
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.event_id.as_bytes());
        hasher.update(self.timestamp.as_bytes());
        hasher.update(format!("{:?}", self.action).as_bytes());
        hasher.update(self.actor.as_bytes());
        hasher.update(self.document_hash.as_bytes());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        if let Some(ref details) = self.details {
            hasher.update(details.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Hash-linked chain of events for one document hash
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditChain {
    pub events: Vec<AuditEvent>,
    pub document_hash: String,
    pub created_at: String,
}

impl AuditChain {
    pub fn new(document_hash: &str) -> Self {
        Self {
            events: Vec::new(),
            document_hash: document_hash.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn last_hash(&self) -> Option<String> {
        self.events.last().map(|e| e.compute_hash())
    }

    /// Append an event, linking it to the previous one
    pub fn append(&mut self, action: AuditAction, actor: &str, details: Option<String>) -> &AuditEvent {
        let previous_hash = self.last_hash();
        let event = AuditEvent::new(action, actor, &self.document_hash, previous_hash, details);
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn verify(&self) -> Result<(), AuditError> {
        let mut expected_prev: Option<String> = None;

        for (index, event) in self.events.iter().enumerate() {
            if event.previous_hash != expected_prev {
                return Err(AuditError::ChainBroken {
                    index,
                    expected: expected_prev,
                    found: event.previous_hash.clone(),
                });
            }
            expected_prev = Some(event.compute_hash());
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        Ok(serde_json::from_str(json)?)
    }

    /// One line per event for display
    pub fn summary(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| {
                format!(
                    "[{}] {} - {:?}",
                    e.timestamp.split('T').next().unwrap_or(&e.timestamp),
                    e.actor,
                    e.action
                )
            })
            .collect()
    }
}

/// SHA-256 hex digest of document bytes
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> AuditAction {
        AuditAction::Upload {
            filename: "vendor_agreement.pdf".to_string(),
            format: DocumentFormat::Pdf,
        }
    }

    #[test]
    fn test_chain_integrity() {
        let mut chain = AuditChain::new("hash1");

        chain.append(upload(), "contract-server", None);
        chain.append(
            AuditAction::Extracted {
                language: Language::English,
                characters: 4200,
            },
            "contract-server",
            None,
        );
        chain.append(
            AuditAction::Analyzed {
                clauses: 12,
                aggregate: RiskLabel::High,
                unavailable: 0,
            },
            "contract-server",
            Some("3 high-risk clauses".to_string()),
        );

        assert!(chain.verify().is_ok());
        assert_eq!(chain.events.len(), 3);
        assert!(chain.events.iter().all(|e| e.document_hash == "hash1"));
    }

    #[test]
    fn test_chain_tamper_detection() {
        let mut chain = AuditChain::new("hash1");

        chain.append(upload(), "alice", None);
        chain.append(AuditAction::Failed { reason: "corrupt".into() }, "alice", None);

        chain.events[0].actor = "mallory".to_string();

        assert!(matches!(
            chain.verify(),
            Err(AuditError::ChainBroken { index: 1, .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_links() {
        let mut chain = AuditChain::new("hash1");
        chain.append(upload(), "alice", None);
        chain.append(AuditAction::Failed { reason: "empty".into() }, "alice", None);

        let restored = AuditChain::from_json(&chain.to_json().unwrap()).unwrap();
        assert_eq!(restored.events.len(), 2);
        assert!(restored.verify().is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any sequence of appends keeps the chain verifiable
        #[test]
        fn append_preserves_integrity(
            doc_hash in "[0-9a-f]{64}",
            count in 1usize..20,
        ) {
            let mut chain = AuditChain::new(&doc_hash);

            for i in 0..count {
                chain.append(
                    AuditAction::Extracted { language: Language::Hindi, characters: i },
                    &format!("worker{}", i),
                    None,
                );
            }

            prop_assert!(chain.verify().is_ok());
            prop_assert_eq!(chain.events.len(), count);
            prop_assert!(chain.events[0].previous_hash.is_none());
        }

        /// Tampering with a non-final event breaks verification
        #[test]
        fn tampering_detected(tamper_index in 0usize..5) {
            let mut chain = AuditChain::new("doc");
            for i in 0..6 {
                chain.append(
                    AuditAction::Failed { reason: format!("attempt {}", i) },
                    "worker",
                    None,
                );
            }

            chain.events[tamper_index].details = Some("rewritten".to_string());
            prop_assert!(chain.verify().is_err());
        }

        #[test]
        fn hash_document_deterministic(data in prop::collection::vec(any::<u8>(), 0..1024)) {
            let hash1 = hash_document(&data);
            let hash2 = hash_document(&data);
            prop_assert_eq!(&hash1, &hash2);
            prop_assert_eq!(hash1.len(), 64);
        }
    }
}
