//! Test delegates shared by the classifier and pipeline tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use shared_types::RiskLabel;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::delegate::{
    Classification, ClassificationDelegate, ClassificationRequest, DelegateError,
};

/// Answers by clause substring, after first replaying queued failures
pub(crate) struct ScriptedDelegate {
    answers: Vec<(String, Classification)>,
    queued_failures: Mutex<VecDeque<DelegateError>>,
    always_fail: Option<DelegateError>,
    calls: AtomicUsize,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedDelegate {
    pub(crate) fn new() -> Self {
        Self {
            answers: Vec::new(),
            queued_failures: Mutex::new(VecDeque::new()),
            always_fail: None,
            calls: AtomicUsize::new(0),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn answering(mut self, substring: &str, classification: Classification) -> Self {
        self.answers.push((substring.to_string(), classification));
        self
    }

    pub(crate) fn failing_first(self, failures: Vec<DelegateError>) -> Self {
        *self.queued_failures.lock().unwrap() = failures.into();
        self
    }

    pub(crate) fn always_failing(mut self, error: DelegateError) -> Self {
        self.always_fail = Some(error);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassificationDelegate for ScriptedDelegate {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, DelegateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());

        if let Some(error) = self.queued_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        if let Some(error) = &self.always_fail {
            return Err(error.clone());
        }

        Ok(self
            .answers
            .iter()
            .find(|(substring, _)| request.text.contains(substring.as_str()))
            .map(|(_, classification)| classification.clone())
            .unwrap_or_else(|| Classification::new(RiskLabel::Low, "no concerns", 0.5)))
    }
}

/// Holds every call until the test releases it; tracks how many overlap
///
/// Each answer echoes the clause text as its rationale so callers can check
/// that findings line up with clauses.
pub(crate) struct GatedDelegate {
    gate: Semaphore,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl GatedDelegate {
    pub(crate) fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yield until `count` calls are parked at the gate
    pub(crate) async fn wait_for_in_flight(&self, count: usize) {
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while self.in_flight() < count {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("delegate calls never reached the gate");
    }
}

#[async_trait]
impl ClassificationDelegate for GatedDelegate {
    fn name(&self) -> &str {
        "gated"
    }

    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, DelegateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let permit = self.gate.acquire().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        permit
            .map_err(|e| DelegateError::Permanent(e.to_string()))?
            .forget();

        Ok(Classification::new(
            RiskLabel::Low,
            request.text.trim(),
            0.5,
        ))
    }
}
