use serde::{Deserialize, Serialize};

fn default_retry_limit() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    250
}

/// Retry policy for provider requests. Only transient failures and
/// timeouts are retried; the backoff grows linearly per attempt.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DispatchConfig {
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            retry_limit: default_retry_limit(),
            backoff_ms: default_backoff_ms(),
        }
    }
}
