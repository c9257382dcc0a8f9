//! services/companion/src/adapters/emotion_llm.rs
//!
//! This module contains the adapter for remote emotion analysis.
//! It implements the `EmotionAnalysisService` port from the `core` crate.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use mendi_core::domain::RemoteEmotion;
use mendi_core::ports::{EmotionAnalysisService, PortError, PortResult};

use super::chat_llm::first_choice_text;
use super::with_timeout;

const ANALYST_INSTRUCTION: &str = r#"You are an expert emotional analyst. Analyze the emotional content of messages and return a JSON response with this exact structure:
{
  "primary": {
    "name": "emotion_name",
    "category": "joy|sadness|anger|fear|surprise|disgust|neutral",
    "intensity": 0.0-1.0,
    "description": "brief description"
  },
  "secondary": {
    "name": "emotion_name",
    "category": "joy|sadness|anger|fear|surprise|disgust|neutral",
    "intensity": 0.0-1.0,
    "description": "brief description"
  },
  "intensity": 0.0-1.0,
  "confidence": 0.0-1.0,
  "context": "contextual analysis"
}"#;

const ANALYSIS_TEMPERATURE: f32 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 300;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct OpenAiEmotionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiEmotionAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self { client, model, timeout }
    }
}

/// Parses the analyst's reply, tolerating a surrounding Markdown code fence.
pub(crate) fn parse_reading(content: &str) -> PortResult<RemoteEmotion> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim())
        .map_err(|e| PortError::Unexpected(format!("Emotion analysis was not valid JSON: {}", e)))
}

//=========================================================================================
// `EmotionAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmotionAnalysisService for OpenAiEmotionAdapter {
    async fn analyze_emotion(&self, text: &str) -> PortResult<RemoteEmotion> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(ANALYST_INSTRUCTION)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(ANALYSIS_TEMPERATURE)
            .max_tokens(ANALYSIS_MAX_TOKENS)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = with_timeout(self.timeout, async {
            self.client
                .chat()
                .create(request)
                .await
                .map_err(|e: OpenAIError| PortError::Unexpected(format!("OpenAI API error: {}", e)))
        })
        .await?;

        parse_reading(&first_choice_text(response, "Emotion analysis")?)
    }
}
