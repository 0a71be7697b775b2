//! Ollama inference backend adapter
//!
//! Speaks the native Ollama HTTP API: `/api/tags` for available models,
//! `/api/ps` for loaded models and `/api/chat` for generation. Chat
//! responses arrive as streamed JSON lines; the adapter concatenates the
//! `message.content` of every line into one answer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{AppError, Result};

/// A model known to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
struct ModelListBody {
    #[serde(default)]
    models: Vec<ModelListItem>,
}

#[derive(Debug, Deserialize)]
struct ModelListItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatStreamLine {
    #[serde(default)]
    message: Option<ChatStreamMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamMessage {
    #[serde(default)]
    content: String,
}

/// Trait for inference backends consumed by the gateway and the API layer
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// List models available on the backend
    async fn list_models(&self) -> Vec<ModelEntry>;

    /// List models currently loaded into memory
    async fn list_active_models(&self) -> Vec<ModelEntry>;

    /// Run a single-prompt chat generation and return the full answer text
    async fn chat(&self, model: &str, prompt: &str) -> Result<String>;

    /// Probe backend reachability; returns the upstream HTTP status code
    async fn probe(&self) -> Result<u16>;
}

/// HTTP client for an Ollama-compatible server
pub struct OllamaAdapter {
    client: Client,
    probe_client: Client,
    base_url: String,
}

impl OllamaAdapter {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        // Separate short-timeout client so reachability probes fail fast
        let probe_client = Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            probe_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and parse a model listing endpoint. Transport failures are
    /// logged and collapse to an empty list so callers can treat "backend
    /// down" and "no models" uniformly.
    async fn fetch_models(&self, path: &str) -> Vec<ModelEntry> {
        let url = format!("{}{}", self.base_url, path);

        let response = match self.probe_client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %url, error = %e, "Unable to reach backend for model listing");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "Model listing request failed");
            return Vec::new();
        }

        match response.json::<ModelListBody>().await {
            Ok(body) => body
                .models
                .into_iter()
                .map(|m| ModelEntry {
                    name: m.name,
                    model: m.model,
                })
                .collect(),
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to parse model listing");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaAdapter {
    async fn list_models(&self) -> Vec<ModelEntry> {
        self.fetch_models("/api/tags").await
    }

    async fn list_active_models(&self) -> Vec<ModelEntry> {
        self.fetch_models("/api/ps").await
    }

    async fn chat(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequestBody {
            model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %model, prompt_len = prompt.len(), "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::BackendUnavailable(format!(
                "backend returned {}: {}",
                status, text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        // Streamed responses are one JSON object per line
        let mut answer = String::new();
        let mut parsed_any = false;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<ChatStreamLine>(line) {
                Ok(chunk) => {
                    parsed_any = true;
                    if let Some(message) = chunk.message {
                        answer.push_str(&message.content);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse chat stream line");
                }
            }
        }

        if !parsed_any {
            return Err(AppError::MalformedUpstreamResponse(
                "no parsable JSON lines in chat response".to_string(),
            ));
        }

        // An empty concatenation means the upstream produced no message
        // content at all, which callers must see as a failure rather than
        // a legitimately empty answer.
        if answer.is_empty() {
            return Err(AppError::MalformedUpstreamResponse(
                "chat response carried no message content".to_string(),
            ));
        }

        debug!(model = %model, answer_len = answer.len(), "Chat request completed");
        Ok(answer)
    }

    async fn probe(&self) -> Result<u16> {
        let response = self
            .probe_client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        Ok(response.status().as_u16())
    }
}
