//! Service configuration
//!
//! Loaded from a TOML or YAML file (chosen by extension), then overridden by
//! environment variables. Built once at startup and never re-read.

use court_hearing_core::{parse_court_codes, AllowList};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_REQUIRED_ROLE: &str = "ROLE_COURT_HEARING_EVENT_WRITE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Court allow-list
    pub relay: RelayConfig,
    /// Downstream SNS topic
    pub publisher: PublisherConfig,
    /// Telemetry queue and collector
    pub telemetry: TelemetryConfig,
    /// Bearer token checks
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default `0.0.0.0`)
    pub host: String,
    /// Listen port (default 8080, env `PORT`)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Court allow-list settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Five-character court codes to relay (env `INCLUDED_COURT_CODES`, comma separated)
    pub included_court_codes: Vec<String>,
    /// When false every court is relayed (env `USE_INCLUDED_COURTS_LIST`)
    pub use_included_courts_list: bool,
}

impl RelayConfig {
    pub fn allow_list(&self) -> AllowList {
        AllowList::new(&self.included_court_codes, self.use_included_courts_list)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Topic receiving relayed events; required (env `TOPIC_ARN`)
    pub topic_arn: String,
    /// AWS region; falls back to the SDK's provider chain (env `AWS_REGION`)
    pub region: Option<String>,
    /// Override for local stacks such as localstack
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// HTTP collector receiving telemetry events; log-only when unset
    pub endpoint: Option<String>,
    /// Bearer key for the collector
    pub api_key: Option<String>,
    /// Events buffered before new ones are dropped
    pub queue_size: usize,
    /// Collector request timeout
    pub timeout_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            queue_size: 1000,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret; required (env `JWT_SECRET`)
    pub jwt_secret: String,
    /// Expected `iss` claim, unchecked when unset
    pub issuer: Option<String>,
    /// Role needed for the hearing routes
    pub required_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: None,
            required_role: DEFAULT_REQUIRED_ROLE.to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a config file; `.yaml`/`.yml` are read as YAML, anything else as TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Load from an optional file, apply process environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(codes) = lookup("INCLUDED_COURT_CODES") {
            self.relay.included_court_codes = parse_court_codes(&codes);
        }
        if let Some(flag) = lookup("USE_INCLUDED_COURTS_LIST") {
            self.relay.use_included_courts_list =
                parse_value("USE_INCLUDED_COURTS_LIST", &flag)?;
        }
        if let Some(topic) = lookup("TOPIC_ARN") {
            self.publisher.topic_arn = topic;
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.publisher.region = Some(region);
        }
        if let Some(endpoint) = lookup("AWS_ENDPOINT_URL") {
            self.publisher.endpoint_url = Some(endpoint);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(issuer) = lookup("JWT_ISSUER") {
            self.auth.issuer = Some(issuer);
        }
        if let Some(endpoint) = lookup("TELEMETRY_ENDPOINT") {
            self.telemetry.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup("TELEMETRY_API_KEY") {
            self.telemetry.api_key = Some(key);
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_value("PORT", &port)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.publisher.topic_arn.trim().is_empty() {
            return Err(ConfigError::Missing("publisher.topic_arn"));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("auth.jwt_secret"));
        }
        if self.auth.required_role.trim().is_empty() {
            return Err(ConfigError::Missing("auth.required_role"));
        }
        if self.telemetry.queue_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "telemetry.queue_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Copy with secrets masked, for printing
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.auth.jwt_secret.is_empty() {
            config.auth.jwt_secret = "********".to_string();
        }
        if config.telemetry.api_key.is_some() {
            config.telemetry.api_key = Some("********".to_string());
        }
        config
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
