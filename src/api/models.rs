//! API request/response models

use serde::{Deserialize, Serialize};

use crate::backend::ModelEntry;

/// Chat request body. Fields are optional so that missing keys produce a
/// 400 with a stable error code instead of a deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatApiRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatApiResponse {
    pub response: String,
}

/// Backend reachability probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionResponse {
    pub host: String,
    pub port: u16,
    pub status: String,
}

/// Model listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatsResponse {
    pub available: Vec<ModelEntry>,
    pub active: Vec<ModelEntry>,
}

/// Login form body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
