//! services/companion/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the companion's conversational LLM.
//! It implements the `ChatCompletionService` port from the `core` crate.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use mendi_core::ports::{ChatCompletionService, ChatRequest, ChatRole, ChatTurn, PortError, PortResult};
use tracing::debug;

use super::with_timeout;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatCompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAiChatAdapter {
    pub fn new(client: Client<OpenAIConfig>, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

/// Converts one conversation turn into the wire message type.
pub(crate) fn to_request_message(turn: &ChatTurn) -> PortResult<ChatCompletionRequestMessage> {
    let map = |e: OpenAIError| PortError::Unexpected(e.to_string());
    let message = match turn.role {
        ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(turn.content.as_str())
            .build()
            .map_err(map)?
            .into(),
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content.as_str())
            .build()
            .map_err(map)?
            .into(),
        ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content.as_str())
            .build()
            .map_err(map)?
            .into(),
    };
    Ok(message)
}

/// The text content of the first choice, or an error naming what was missing.
pub(crate) fn first_choice_text(response: CreateChatCompletionResponse, what: &str) -> PortResult<String> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        PortError::Unexpected(format!("{} LLM returned no choices in its response.", what))
    })?;
    choice.message.content.ok_or_else(|| {
        PortError::Unexpected(format!("{} LLM response contained no text content.", what))
    })
}

//=========================================================================================
// `ChatCompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatCompletionService for OpenAiChatAdapter {
    async fn complete(&self, request: ChatRequest) -> PortResult<String> {
        let messages = request
            .messages
            .iter()
            .map(to_request_message)
            .collect::<PortResult<Vec<_>>>()?;

        #[allow(deprecated)]
        let api_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .presence_penalty(request.presence_penalty)
            .frequency_penalty(request.frequency_penalty)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(model = %request.model, turns = request.messages.len(), "Requesting chat completion");

        // Call the API and manually map the error, which respects the orphan rule.
        let response = with_timeout(self.timeout, async {
            self.client
                .chat()
                .create(api_request)
                .await
                .map_err(|e: OpenAIError| PortError::Unexpected(format!("OpenAI API error: {}", e)))
        })
        .await?;

        first_choice_text(response, "Chat")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_converts() {
        for role in [ChatRole::System, ChatRole::User, ChatRole::Assistant] {
            let turn = ChatTurn { role, content: "hello".into() };
            let message = to_request_message(&turn).unwrap();
            let json = serde_json::to_value(&message).unwrap();
            let expected = match role {
                ChatRole::System => "system",
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            assert_eq!(json["role"], expected);
            assert_eq!(json["content"], "hello");
        }
    }
}
