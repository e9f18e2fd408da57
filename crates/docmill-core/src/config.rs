//! Pipeline runtime configuration.

use std::time::Duration;

/// Default ceiling for one backend extraction call.
const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 120;

/// Runtime configuration for pipeline runs.
///
/// Read-only once constructed; concurrent runs share it freely.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ceiling for a single backend extraction call. Loader adapters may
    /// block on network or CPU-bound extraction; past this the run fails
    /// with a timeout error instead of blocking indefinitely.
    pub load_timeout: Duration,
}

impl PipelineConfig {
    /// Build configuration from environment variables and defaults.
    ///
    /// `DOCMILL_LOAD_TIMEOUT_SECS` overrides the extraction ceiling.
    pub fn from_env() -> Self {
        let load_timeout_secs = std::env::var("DOCMILL_LOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOAD_TIMEOUT_SECS);

        Self {
            load_timeout: Duration::from_secs(load_timeout_secs),
        }
    }

    pub fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS),
        }
    }
}
