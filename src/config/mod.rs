//! Configuration module

pub mod settings;

pub use settings::{AuthConfig, BackendConfig, GatewayConfig, LoggingConfig, ServerConfig, Settings};
