//! Ollama Chat Gateway
//!
//! An authenticated web front for a local Ollama-compatible inference
//! runtime. Concurrent chat requests are serialized through a single
//! worker so that at most one generation is ever in flight against the
//! backend; access is gated by cookie-bound session tokens and daily
//! usage ceilings.

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;

pub use error::{AppError, AuthError, Result};

use std::sync::Arc;
use tokio::sync::RwLock;

use auth::AuthManager;
use backend::InferenceBackend;
use gateway::ChatGateway;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<RwLock<config::Settings>>,
    pub adapter: Arc<dyn InferenceBackend>,
    pub auth: Arc<AuthManager>,
    pub gateway: Arc<ChatGateway>,
}
