//! crates/mendi_core/src/pipeline.rs
//!
//! One conversational turn: crisis scan, emotion analysis, then the reply.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use crate::crisis::{should_show_emergency_banner, CrisisDetector};
use crate::domain::{CrisisCheck, CrisisSeverity, EmergencyResource, Message, Sender, User};
use crate::emotion::EmotionAnalyzer;
use crate::ports::{PortError, PortResult};
use crate::responder::Companion;

/// Everything a turn produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub user_message: Message,
    pub reply: Message,
    /// The history including both new messages.
    pub messages: Vec<Message>,
    pub crisis: CrisisCheck,
    pub show_emergency_banner: bool,
    /// Non-empty only when a crisis above low severity was detected.
    pub resources: Vec<EmergencyResource>,
}

#[derive(Clone)]
pub struct ChatPipeline {
    detector: CrisisDetector,
    analyzer: EmotionAnalyzer,
    companion: Companion,
}

impl ChatPipeline {
    pub fn new(detector: CrisisDetector, analyzer: EmotionAnalyzer, companion: Companion) -> Self {
        Self {
            detector,
            analyzer,
            companion,
        }
    }

    pub fn detector(&self) -> &CrisisDetector {
        &self.detector
    }

    /// Runs one turn over `history`.
    ///
    /// Blank content is rejected before anything runs. The crisis check always
    /// completes before the reply is generated, and the reply step never fails.
    #[instrument(skip_all, fields(history_len = history.len()))]
    pub async fn handle_turn(
        &self,
        history: &[Message],
        content: &str,
        user: Option<&User>,
    ) -> PortResult<TurnOutcome> {
        let content = content.trim();
        if content.is_empty() {
            return Err(PortError::InvalidInput("Message content is empty".to_string()));
        }

        let crisis = self.detector.detect(content);
        let analysis = self.analyzer.analyze(content).await;

        let mut user_message = Message::new(content, Sender::User, Utc::now());
        user_message.attach_emotions(analysis);

        let mut messages = history.to_vec();
        messages.push(user_message.clone());

        let reply_text = self.companion.generate_response(&messages, user, &crisis).await;
        let reply = Message::new(reply_text, Sender::Ai, Utc::now());
        messages.push(reply.clone());

        let show_emergency_banner = should_show_emergency_banner(crisis.severity);
        let resources = match crisis.severity {
            Some(severity) if crisis.detected && severity > CrisisSeverity::Low => {
                self.detector.emergency_resources(crisis.category)
            }
            _ => Vec::new(),
        };

        info!(
            crisis = crisis.detected,
            emotion = user_message.emotions.as_ref().map(|e| e.primary.name.as_str()).unwrap_or("none"),
            "Turn completed"
        );

        Ok(TurnOutcome {
            user_message,
            reply,
            messages,
            crisis,
            show_emergency_banner,
            resources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::{FixedPicker, RotationPicker};
    use crate::responder::ResponseSelector;
    use std::sync::Arc;

    fn pipeline() -> ChatPipeline {
        let selector = ResponseSelector::new(Arc::new(FixedPicker(0)), Arc::new(RotationPicker));
        ChatPipeline::new(CrisisDetector::default(), EmotionAnalyzer::local(), Companion::local(selector))
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let err = pipeline().handle_turn(&[], "   \n", None).await.unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn ordinary_turn_appends_two_messages() {
        let outcome = pipeline().handle_turn(&[], "I am so happy today", None).await.unwrap();
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.messages[0], outcome.user_message);
        assert_eq!(outcome.user_message.emotions.as_ref().unwrap().primary.name, "joy");
        assert_eq!(outcome.reply.sender, Sender::Ai);
        assert!(!outcome.crisis.detected);
        assert!(!outcome.show_emergency_banner);
        assert!(outcome.resources.is_empty());
    }

    #[tokio::test]
    async fn critical_crisis_shows_banner_and_resources() {
        let outcome = pipeline().handle_turn(&[], "I want to kill myself", None).await.unwrap();
        assert_eq!(outcome.crisis.severity, Some(CrisisSeverity::Critical));
        assert!(outcome.show_emergency_banner);
        assert_eq!(outcome.resources.len(), 3);
        assert!(outcome.reply.content.contains("\"I want to kill myself\""));
    }

    #[tokio::test]
    async fn medium_crisis_lists_resources_without_banner() {
        let outcome = pipeline().handle_turn(&[], "I feel worthless", None).await.unwrap();
        assert_eq!(outcome.crisis.severity, Some(CrisisSeverity::Medium));
        assert!(!outcome.show_emergency_banner);
        assert_eq!(outcome.resources.len(), 3);
    }

    #[tokio::test]
    async fn first_greeting_uses_name() {
        let user = User::new("Ana", Utc::now());
        let outcome = pipeline().handle_turn(&[], "hi", Some(&user)).await.unwrap();
        assert!(outcome.reply.content.starts_with("Hello Ana!"));
    }
}
