//! Audit trail storage, one hash-linked chain per document hash
//!
//! With an audit directory configured, disk is the only copy: each chain
//! lives in `<dir>/<hash>.json` and is replaced atomically on every record.
//! Without one, chains live in a bounded in-memory map that drops the
//! oldest document once full.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use shared_types::audit::{AuditAction, AuditChain};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::ServerError;

/// Documents kept by an in-memory store before the oldest is dropped
pub const DEFAULT_MAX_CHAINS: usize = 10_000;

pub struct AuditStore {
    dir: Option<PathBuf>,
    /// Also serializes writers in persistent mode, where it stays empty
    memory: Mutex<MemoryChains>,
}

struct MemoryChains {
    chains: HashMap<String, AuditChain>,
    order: VecDeque<String>,
    capacity: usize,
}

impl MemoryChains {
    fn new(capacity: usize) -> Self {
        Self {
            chains: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, document_hash: String, chain: AuditChain) {
        if !self.chains.contains_key(&document_hash) {
            self.order.push_back(document_hash.clone());
            while self.order.len() > self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    debug!(document_hash = %evicted, "audit chain evicted");
                    self.chains.remove(&evicted);
                }
            }
        }
        self.chains.insert(document_hash, chain);
    }
}

impl AuditStore {
    pub fn in_memory() -> Self {
        Self::in_memory_with_capacity(DEFAULT_MAX_CHAINS)
    }

    pub fn in_memory_with_capacity(max_chains: usize) -> Self {
        Self {
            dir: None,
            memory: Mutex::new(MemoryChains::new(max_chains)),
        }
    }

    pub async fn persistent(dir: PathBuf) -> Result<Self, ServerError> {
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ServerError::Internal(format!("cannot create audit dir {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir: Some(dir),
            memory: Mutex::new(MemoryChains::new(1)),
        })
    }

    /// Append events to the chain for `document_hash`, creating it if needed
    ///
    /// The stored chain only changes once the new version has been written;
    /// a failed write leaves it exactly as it was.
    pub async fn record(
        &self,
        document_hash: &str,
        actor: &str,
        actions: Vec<(AuditAction, Option<String>)>,
    ) -> Result<(), ServerError> {
        let mut memory = self.memory.lock().await;

        let stored = match self.path_for(document_hash) {
            Some(_) => self.load(document_hash).await?,
            None => memory.chains.get(document_hash).cloned(),
        };
        let mut chain = stored.unwrap_or_else(|| AuditChain::new(document_hash));
        for (action, details) in actions {
            chain.append(action, actor, details);
        }

        match self.path_for(document_hash) {
            Some(path) => write_replacing(&path, &chain.to_json()?).await?,
            None => memory.insert(document_hash.to_string(), chain.clone()),
        }
        debug!(document_hash, events = chain.events.len(), "audit chain updated");
        Ok(())
    }

    pub async fn get(&self, document_hash: &str) -> Result<Option<AuditChain>, ServerError> {
        if self.dir.is_some() {
            return self.load(document_hash).await;
        }
        Ok(self.memory.lock().await.chains.get(document_hash).cloned())
    }

    async fn load(&self, document_hash: &str) -> Result<Option<AuditChain>, ServerError> {
        let Some(path) = self.path_for(document_hash) else {
            return Ok(None);
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => {
                let chain = AuditChain::from_json(&json)?;
                if let Err(e) = chain.verify() {
                    warn!(document_hash, error = %e, "stored audit chain failed verification");
                }
                Ok(Some(chain))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServerError::Internal(format!(
                "cannot read audit file: {}",
                e
            ))),
        }
    }

    fn path_for(&self, document_hash: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", document_hash)))
    }
}

/// Write to a sibling temp file, then rename over `path`
async fn write_replacing(path: &Path, json: &str) -> Result<(), ServerError> {
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, json)
        .await
        .map_err(|e| ServerError::Internal(format!("cannot write audit file: {}", e)))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|e| ServerError::Internal(format!("cannot replace audit file: {}", e)))
}

/// Document hashes are lower-case SHA-256 hex digests
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == 64 && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
