//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub backend: BackendConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Authentication and quota configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Credential table as comma-separated `user:pass` pairs
    #[serde(default)]
    pub users: String,
    #[serde(default = "default_auth_limit")]
    pub daily_auth_limit: u64,
    #[serde(default = "default_request_limit")]
    pub daily_request_limit: u64,
}

fn default_auth_limit() -> u64 {
    100
}

fn default_request_limit() -> u64 {
    500
}

/// Inference backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_probe_timeout() -> u64 {
    5
}

/// Request serialization gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,
}

fn default_queue_capacity() -> usize {
    64
}

fn default_reply_timeout() -> u64 {
    300
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from environment variables (prefix `CHAT_GATEWAY`,
    /// `__` separator, e.g. `CHAT_GATEWAY__SERVER__PORT=9000`)
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("auth.users", "")?
            .set_default("auth.daily_auth_limit", default_auth_limit() as i64)?
            .set_default("auth.daily_request_limit", default_request_limit() as i64)?
            .set_default("backend.base_url", default_base_url())?
            .set_default("backend.timeout_secs", default_timeout() as i64)?
            .set_default("backend.probe_timeout_secs", default_probe_timeout() as i64)?
            .set_default("gateway.queue_capacity", default_queue_capacity() as i64)?
            .set_default("gateway.reply_timeout_secs", default_reply_timeout() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .add_source(
                Environment::with_prefix("CHAT_GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Parse the `user:pass` credential table
    pub fn parsed_users(&self) -> HashMap<String, String> {
        self.auth
            .users
            .split(',')
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, ':');
                match (parts.next(), parts.next()) {
                    (Some(user), Some(pass)) if !user.trim().is_empty() => {
                        Some((user.trim().to_string(), pass.to_string()))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    /// Validate the configuration. Called once at startup; failures are fatal.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.parsed_users().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "No credentials configured: set CHAT_GATEWAY__AUTH__USERS to user:pass pairs"
                    .to_string(),
            )));
        }

        if self.gateway.queue_capacity == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Gateway queue capacity cannot be 0".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            auth: AuthConfig {
                users: String::new(),
                daily_auth_limit: default_auth_limit(),
                daily_request_limit: default_request_limit(),
            },
            backend: BackendConfig {
                base_url: default_base_url(),
                timeout_secs: default_timeout(),
                probe_timeout_secs: default_probe_timeout(),
            },
            gateway: GatewayConfig {
                queue_capacity: default_queue_capacity(),
                reply_timeout_secs: default_reply_timeout(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.backend.base_url, "http://localhost:11434");
        assert_eq!(settings.gateway.queue_capacity, 64);
    }

    #[test]
    fn test_parse_users() {
        let mut settings = Settings::default();
        settings.auth.users = "joe:1234,ann:s3cret".to_string();

        let users = settings.parsed_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users.get("joe"), Some(&"1234".to_string()));
        assert_eq!(users.get("ann"), Some(&"s3cret".to_string()));
    }

    #[test]
    fn test_parse_users_skips_malformed_pairs() {
        let mut settings = Settings::default();
        settings.auth.users = "joe:1234,broken,:nopass".to_string();

        let users = settings.parsed_users();
        assert_eq!(users.len(), 1);
        assert!(users.contains_key("joe"));
    }

    #[test]
    fn test_password_may_contain_colon() {
        let mut settings = Settings::default();
        settings.auth.users = "joe:pa:ss".to_string();

        let users = settings.parsed_users();
        assert_eq!(users.get("joe"), Some(&"pa:ss".to_string()));
    }

    #[test]
    fn test_validation_requires_users() {
        let settings = Settings::default();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.auth.users = "joe:1234".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_port() {
        let mut settings = Settings::default();
        settings.auth.users = "joe:1234".to_string();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }
}
