//! Backend module - inference backend trait and the Ollama HTTP adapter

pub mod ollama;

pub use ollama::{InferenceBackend, ModelEntry, OllamaAdapter};
