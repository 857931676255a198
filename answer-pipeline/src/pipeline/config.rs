use std::time::Duration;

use common::utils::config::AppConfig;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct AnswerTuning {
    pub chunk_parts: usize,
    pub retry_max_attempts: usize,
    pub retry_base_units: u64,
    pub retry_unit: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for AnswerTuning {
    fn default() -> Self {
        Self {
            chunk_parts: 8,
            retry_max_attempts: 5,
            retry_base_units: 2,
            retry_unit: Duration::from_secs(1),
            request_timeout: None,
        }
    }
}

impl AnswerTuning {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_units: self.retry_base_units,
            unit: self.retry_unit,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnswerConfig {
    pub tuning: AnswerTuning,
    /// Apply the rate-limit retry policy to the synthesis call as well.
    pub retry_synthesis: bool,
}

impl AnswerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            tuning: AnswerTuning {
                chunk_parts: config.chunk_parts,
                retry_max_attempts: config.retry_max_attempts,
                retry_base_units: config.retry_base_units,
                retry_unit: Duration::from_millis(config.retry_unit_ms),
                request_timeout: config.request_timeout_secs.map(Duration::from_secs),
            },
            retry_synthesis: config.retry_synthesis,
        }
    }

    pub(crate) fn synthesis_retry(&self) -> Option<RetryPolicy> {
        self.retry_synthesis.then(|| self.tuning.retry_policy())
    }
}
