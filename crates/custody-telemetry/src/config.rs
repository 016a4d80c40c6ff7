//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or a full
    /// `EnvFilter` directive)
    pub log_level: String,

    /// Whether to write logs to the console at all
    pub console_output: bool,

    /// Whether to format logs as JSON instead of human-readable text
    pub json_logs: bool,

    /// Deployment identifier (devnet, testnet, production)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "custody-chain".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CC_SERVICE_NAME`: Service name (default: custody-chain)
    /// - `CC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CC_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `CC_NETWORK`: Deployment name (default: devnet)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same rules as [`from_env`](Self::from_env), reading from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("CC_SERVICE_NAME").unwrap_or_else(|| "custody-chain".to_string()),

            log_level: lookup("CC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("CC_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("CC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            network: lookup("CC_NETWORK").unwrap_or_else(|| "devnet".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "custody-chain");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_empty_environment_matches_default() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.service_name, "custody-chain");
        assert!(config.console_output);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_overrides() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("CC_SERVICE_NAME", "ledger-east"),
            ("RUST_LOG", "debug"),
            ("CC_CONSOLE_OUTPUT", "0"),
            ("CC_JSON_LOGS", "TRUE"),
            ("CC_NETWORK", "production"),
        ]));

        assert_eq!(config.service_name, "ledger-east");
        assert_eq!(config.log_level, "debug");
        assert!(!config.console_output);
        assert!(config.json_logs);
        assert_eq!(config.network, "production");
    }

    #[test]
    fn test_cc_log_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("CC_LOG_LEVEL", "warn"),
            ("RUST_LOG", "trace"),
        ]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_containers_default_to_json() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[("DOCKER_CONTAINER", "1")]));
        assert!(config.json_logs);
    }
}
