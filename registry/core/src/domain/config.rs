// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Registry Configuration
//
// Defines the settings for a registry process:
// - Listener address and the public host used in callback URLs
// - The single liveness window every online/offline decision consults
// - WebSocket heartbeat cadence
// - Optional reclamation of long-dead agents
// - Shutdown grace period and metrics exporter port
//
// Sources, lowest precedence first: built-in defaults, a YAML file, then
// environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "BOTCALL_CONFIG_PATH";
pub const DEFAULT_CONFIG_FILE: &str = "./botcall-config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Bind address
    pub host: String,

    /// Bind port (`PORT` overrides)
    pub port: u16,

    /// Host used for callback URLs when a request carries no Host header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_host: Option<String>,

    /// Maximum age of `last_seen` for an agent to be reported online
    #[serde(with = "humantime_serde")]
    pub liveness_window: Duration,

    /// Interval between server-sent WebSocket pings
    #[serde(with = "humantime_serde")]
    pub heartbeat_interval: Duration,

    /// How long in-flight requests get to finish after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,

    /// Prometheus exporter port; no exporter when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,

    pub reaper: ReaperConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_host: None,
            liveness_window: Duration::from_secs(5 * 60),
            heartbeat_interval: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(5),
            metrics_port: None,
            reaper: ReaperConfig::default(),
        }
    }
}

/// Background removal of agents that have been silent far longer than the
/// liveness window. Off unless enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaperConfig {
    pub enabled: bool,

    /// How often to sweep
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Records silent for at least this long are removed
    #[serde(with = "humantime_serde")]
    pub retention: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(10 * 60),
            retention: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover a configuration file:
    /// 1. BOTCALL_CONFIG_PATH environment variable
    /// 2. ./botcall-config.yaml (working directory)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from(DEFAULT_CONFIG_FILE);
        if cwd.exists() {
            return Some(cwd);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must load
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::debug!("No configuration file found. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply process environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Invalid values are logged and ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: PORT={}", port);
                    self.port = port;
                }
                Err(_) => tracing::warn!("Invalid value for PORT: '{}'. Ignoring.", val),
            }
        }

        if let Some(val) = lookup("BOTCALL_HOST") {
            if !val.is_empty() {
                self.host = val;
            }
        }

        if let Some(val) = lookup("BOTCALL_PUBLIC_HOST") {
            if !val.is_empty() {
                self.public_host = Some(val);
            }
        }

        if let Some(window) = parse_duration_var("BOTCALL_LIVENESS_WINDOW", lookup("BOTCALL_LIVENESS_WINDOW")) {
            self.liveness_window = window;
        }

        if let Some(interval) = parse_duration_var("BOTCALL_HEARTBEAT_INTERVAL", lookup("BOTCALL_HEARTBEAT_INTERVAL")) {
            self.heartbeat_interval = interval;
        }

        if let Some(retention) = parse_duration_var("BOTCALL_REAPER_RETENTION", lookup("BOTCALL_REAPER_RETENTION")) {
            self.reaper.retention = retention;
        }

        if let Some(val) = lookup("BOTCALL_REAPER_ENABLED") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => self.reaper.enabled = true,
                "false" | "0" | "no" | "off" => self.reaper.enabled = false,
                _ => tracing::warn!(
                    "Invalid value for BOTCALL_REAPER_ENABLED: '{}'. Expected true/false. Ignoring.",
                    val
                ),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.liveness_window.is_zero() {
            anyhow::bail!("liveness_window must be greater than zero");
        }

        if self.heartbeat_interval.is_zero() {
            anyhow::bail!("heartbeat_interval must be greater than zero");
        }

        if self.heartbeat_interval >= self.liveness_window {
            tracing::warn!(
                heartbeat_interval = ?self.heartbeat_interval,
                liveness_window = ?self.liveness_window,
                "Heartbeat interval is not shorter than the liveness window; connected agents will flap offline"
            );
        }

        if self.reaper.enabled {
            if self.reaper.interval.is_zero() {
                anyhow::bail!("reaper.interval must be greater than zero");
            }
            if self.reaper.retention <= self.liveness_window {
                anyhow::bail!(
                    "reaper.retention ({:?}) must exceed liveness_window ({:?})",
                    self.reaper.retention,
                    self.liveness_window
                );
            }
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_duration_var(key: &str, value: Option<String>) -> Option<Duration> {
    let value = value?;
    match humantime_serde::re::humantime::parse_duration(&value) {
        Ok(d) => {
            tracing::info!("Environment override: {}={}", key, value);
            Some(d)
        }
        Err(e) => {
            tracing::warn!("Invalid value for {}: '{}' ({}). Ignoring.", key, value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.liveness_window, Duration::from_secs(300));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert!(!config.reaper.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
port: 9090
liveness_window: 6m
reaper:
  enabled: true
  retention: 2h
"#;
        let config = RegistryConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.liveness_window, Duration::from_secs(360));
        assert!(config.reaper.enabled);
        assert_eq!(config.reaper.retention, Duration::from_secs(7200));
        assert_eq!(config.reaper.interval, Duration::from_secs(600));
    }

    #[test]
    fn test_yaml_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("botcall-config.yaml");
        std::fs::write(&path, "heartbeat_interval: 10s\npublic_host: registry.example.com\n").unwrap();

        let config = RegistryConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(config.public_host.as_deref(), Some("registry.example.com"));
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(RegistryConfig::load_or_default(Some(missing)).is_err());
    }

    #[test]
    fn test_overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "7000"),
            ("BOTCALL_LIVENESS_WINDOW", "90s"),
            ("BOTCALL_HEARTBEAT_INTERVAL", "soon"),
            ("BOTCALL_REAPER_ENABLED", "yes"),
        ]);
        let mut config = RegistryConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.port, 7000);
        assert_eq!(config.liveness_window, Duration::from_secs(90));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert!(config.reaper.enabled);
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut config = RegistryConfig::default();
        config.apply_overrides_from(|k| (k == "PORT").then(|| "eighty".to_string()));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_validation_rejects_bad_windows() {
        let mut config = RegistryConfig::default();
        config.liveness_window = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = RegistryConfig::default();
        config.reaper.enabled = true;
        config.reaper.retention = config.liveness_window;
        assert!(config.validate().is_err());

        // Disabled reaper is not checked
        let mut config = RegistryConfig::default();
        config.reaper.retention = Duration::from_secs(1);
        assert!(config.validate().is_ok());
    }
}
