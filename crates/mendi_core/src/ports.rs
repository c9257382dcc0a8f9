//! crates/mendi_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the companion's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like storage or LLM APIs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::RemoteEmotion;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., files, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("The remote call timed out after {0} seconds")]
    Timeout(u64),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Chat Request Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Everything a remote chat endpoint needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Key-value persistence keyed by fixed identifiers (`user`, `conversations`).
/// Values are JSON documents; the core never manages the storage medium itself.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> PortResult<()>;
    async fn delete(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait EmotionAnalysisService: Send + Sync {
    /// Asks a remote analyst for the emotional reading of a message.
    async fn analyze_emotion(&self, text: &str) -> PortResult<RemoteEmotion>;
}

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Returns the free-form reply text of a single chat completion.
    async fn complete(&self, request: ChatRequest) -> PortResult<String>;
}

#[async_trait]
pub trait SpeechToTextService: Send + Sync {
    /// Transcribes a slice of audio data into text.
    async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    /// Generates audio data from a string of text.
    async fn generate_audio(&self, text: &str) -> PortResult<Vec<u8>>;
}
