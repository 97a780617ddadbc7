//! Configuration for the analysis pipeline
//!
//! Every knob has a default that matches the documented behavior; the
//! environment can override them for deployments.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Retry schedule for transient delegate failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry
    pub base_delay: Duration,
    /// Multiplier applied to the wait for each later retry
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (0-based): base * factor^retry
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(retry);
        self.base_delay.saturating_mul(multiplier)
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Score cut-offs used by the rule delegate to turn a score into a label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub retry: RetryPolicy,
    /// Classification calls in flight per document
    pub max_concurrent_classifications: usize,
    /// Minimum script ratio before a language is reported
    pub language_threshold: f64,
    pub thresholds: RiskThresholds,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_concurrent_classifications: 4,
            language_threshold: 0.6,
            thresholds: RiskThresholds::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables (all optional):
    /// - CONTRACT_MAX_RETRIES: retries after the first delegate call
    /// - CONTRACT_RETRY_BASE_MS: first backoff wait in milliseconds
    /// - CONTRACT_MAX_CONCURRENCY: classification calls in flight per document
    /// - CONTRACT_LANGUAGE_THRESHOLD: script ratio in (0, 1]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("CONTRACT_MAX_RETRIES") {
            config.retry.max_retries = parse_var("CONTRACT_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("CONTRACT_RETRY_BASE_MS") {
            let ms: u64 = parse_var("CONTRACT_RETRY_BASE_MS", &value)?;
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(value) = lookup("CONTRACT_MAX_CONCURRENCY") {
            let n: usize = parse_var("CONTRACT_MAX_CONCURRENCY", &value)?;
            if n == 0 {
                return Err(invalid("CONTRACT_MAX_CONCURRENCY", &value, "must be at least 1"));
            }
            config.max_concurrent_classifications = n;
        }
        if let Some(value) = lookup("CONTRACT_LANGUAGE_THRESHOLD") {
            let threshold: f64 = parse_var("CONTRACT_LANGUAGE_THRESHOLD", &value)?;
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(invalid(
                    "CONTRACT_LANGUAGE_THRESHOLD",
                    &value,
                    "must be in (0, 1]",
                ));
            }
            config.language_threshold = threshold;
        }

        Ok(config)
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(var, value, &e.to_string()))
}
