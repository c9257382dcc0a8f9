//! services/companion/src/adapters/tts.rs
//!
//! This module contains the adapter for OpenAI's Text-to-Speech (TTS) service.
//! It implements the `TextToSpeechService` port from the `core` crate.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::audio::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use mendi_core::ports::{PortError, PortResult, TextToSpeechService};

use super::with_timeout;
use crate::config::ConfigError;

/// Maps the configured voice name onto the API's voice.
pub fn parse_voice(name: &str) -> Result<Voice, ConfigError> {
    let voice = match name.trim().to_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "ash" => Voice::Ash,
        "ballad" => Voice::Ballad,
        "coral" => Voice::Coral,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "sage" => Voice::Sage,
        "shimmer" => Voice::Shimmer,
        "verse" => Voice::Verse,
        _ => {
            return Err(ConfigError::InvalidValue(
                "TTS_VOICE".to_string(),
                format!("'{}' is not a known voice", name),
            ))
        }
    };
    Ok(voice)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TextToSpeechService` port using the OpenAI TTS API.
#[derive(Clone)]
pub struct OpenAiTtsAdapter {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
    timeout: Duration,
}

impl OpenAiTtsAdapter {
    /// Creates a new `OpenAiTtsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: SpeechModel, voice: Voice, timeout: Duration) -> Self {
        Self {
            client,
            model,
            voice,
            timeout,
        }
    }
}

//=========================================================================================
// `TextToSpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextToSpeechService for OpenAiTtsAdapter {
    /// Generates encoded audio from the given text.
    async fn generate_audio(&self, text: &str) -> PortResult<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(PortError::InvalidInput("Nothing to speak".to_string()));
        }

        let request = CreateSpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: self.voice.clone(),
            ..Default::default()
        };

        let response = with_timeout(self.timeout, async {
            self.client
                .audio()
                .speech()
                .create(request)
                .await
                .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))
        })
        .await?;

        Ok(response.bytes.to_vec())
    }
}
