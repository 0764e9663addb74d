use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GatewayError;

/// Configuration for the validation gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// How long a completed batch session stays queryable, in milliseconds (Default: 2000)
    pub cleanup_grace_period_ms: u64,

    /// Maximum number of batch sessions held at once (Default: 10000)
    ///
    /// Only expired sessions are reclaimed when the limit is hit. Without
    /// `idle_timeout_ms`, a session that is started and never completed holds
    /// its slot for the life of the process, so enough abandoned batches make
    /// every later `start_session` fail with `CapacityExceeded`.
    pub max_active_sessions: usize,

    /// Reclaim active sessions untouched for this long, in milliseconds (Default: disabled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_ms: Option<u64>,

    /// Maximum model type name length (Default: 256)
    pub max_model_name_length: usize,

    /// Maximum caller-supplied batch id length (Default: 128)
    pub max_batch_id_length: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cleanup_grace_period_ms: 2_000,
            max_active_sessions: 10_000,
            idle_timeout_ms: None,
            max_model_name_length: 256,
            max_batch_id_length: 128,
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration with all default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with a short cleanup window, for tests
    pub fn testing() -> Self {
        Self {
            cleanup_grace_period_ms: 50,
            max_active_sessions: 1_000,
            ..Self::default()
        }
    }

    /// Configuration for gateways fronting many concurrent batches
    pub fn high_throughput() -> Self {
        Self {
            cleanup_grace_period_ms: 30_000,
            max_active_sessions: 100_000,
            ..Self::default()
        }
    }

    pub fn with_cleanup_grace_period(mut self, grace: Duration) -> Self {
        self.cleanup_grace_period_ms = grace.as_millis() as u64;
        self
    }

    pub fn with_max_active_sessions(mut self, max: usize) -> Self {
        self.max_active_sessions = max;
        self
    }

    /// Let active sessions expire after `idle` without accumulate or record calls
    pub fn with_idle_timeout(mut self, idle: Duration) -> Self {
        self.idle_timeout_ms = Some(idle.as_millis() as u64);
        self
    }

    pub fn cleanup_grace_period(&self) -> Duration {
        Duration::from_millis(self.cleanup_grace_period_ms)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }

    /// Parse a configuration from JSON, filling unspecified fields with defaults
    pub fn from_json(json_str: &str) -> Result<Self, GatewayError> {
        let config: GatewayConfig = serde_json::from_str(json_str)
            .map_err(|e| GatewayError::Configuration(format!("invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.max_active_sessions == 0 {
            return Err(GatewayError::Configuration(
                "max_active_sessions must be greater than 0".to_string(),
            ));
        }

        if self.max_model_name_length == 0 {
            return Err(GatewayError::Configuration(
                "max_model_name_length must be greater than 0".to_string(),
            ));
        }

        if self.idle_timeout_ms == Some(0) {
            return Err(GatewayError::Configuration(
                "idle_timeout_ms must be greater than 0 when set".to_string(),
            ));
        }

        if self.max_batch_id_length == 0 {
            return Err(GatewayError::Configuration(
                "max_batch_id_length must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.cleanup_grace_period(), Duration::from_secs(2));
        assert_eq!(config.max_active_sessions, 10_000);
        assert_eq!(config.idle_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = GatewayConfig::from_json(r#"{"cleanup_grace_period_ms": 500}"#).unwrap();
        assert_eq!(config.cleanup_grace_period(), Duration::from_millis(500));
        assert_eq!(config.max_batch_id_length, 128);
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let config = GatewayConfig::default().with_max_active_sessions(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_active_sessions"));

        assert!(GatewayConfig::from_json(r#"{"max_model_name_length": 0}"#).is_err());
        assert!(GatewayConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_zero_grace_period_is_allowed() {
        let config = GatewayConfig::testing().with_cleanup_grace_period(Duration::ZERO);
        assert!(config.validate().is_ok());
        assert_eq!(config.cleanup_grace_period(), Duration::ZERO);
    }

    #[test]
    fn test_idle_timeout() {
        let config = GatewayConfig::from_json(r#"{"idle_timeout_ms": 60000}"#).unwrap();
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(60)));

        assert!(GatewayConfig::from_json(r#"{"idle_timeout_ms": 0}"#).is_err());
        let config = GatewayConfig::default().with_idle_timeout(Duration::from_millis(250));
        assert_eq!(config.idle_timeout_ms, Some(250));
    }
}
