//! crates/mendi_core/src/domain.rs
//!
//! Defines the pure, core data structures for the companion.
//! Field names serialize in camelCase so the persisted JSON keeps the shape the
//! browser client reads and writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Crisis Reference Data
//=========================================================================================

/// Ordinal risk rating attached to a crisis keyword.
///
/// The derived `Ord` follows declaration order, giving low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CrisisSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrisisSeverity::Low => "low",
            CrisisSeverity::Medium => "medium",
            CrisisSeverity::High => "high",
            CrisisSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrisisCategory {
    SelfHarm,
    Suicide,
    Violence,
    Substance,
    MentalHealth,
}

impl CrisisCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrisisCategory::SelfHarm => "self-harm",
            CrisisCategory::Suicide => "suicide",
            CrisisCategory::Violence => "violence",
            CrisisCategory::Substance => "substance",
            CrisisCategory::MentalHealth => "mental-health",
        }
    }
}

impl std::str::FromStr for CrisisCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self-harm" => Ok(CrisisCategory::SelfHarm),
            "suicide" => Ok(CrisisCategory::Suicide),
            "violence" => Ok(CrisisCategory::Violence),
            "substance" => Ok(CrisisCategory::Substance),
            "mental-health" => Ok(CrisisCategory::MentalHealth),
            other => Err(format!("unknown crisis category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrisisKeyword {
    pub keyword: &'static str,
    pub severity: CrisisSeverity,
    pub category: CrisisCategory,
}

/// A helpline or service shown alongside the emergency banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyResource {
    pub name: String,
    pub phone: Option<String>,
    pub text: Option<String>,
    pub website: String,
    pub description: String,
    #[serde(rename = "available24x7")]
    pub available_24x7: bool,
    pub country: String,
}

/// Result of scanning one piece of text against the crisis lexicon.
///
/// `severity` and `category` are `None` exactly when nothing was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisCheck {
    pub detected: bool,
    pub severity: Option<CrisisSeverity>,
    pub keywords: Vec<String>,
    pub category: Option<CrisisCategory>,
}

impl CrisisCheck {
    pub fn none() -> Self {
        Self::default()
    }
}

//=========================================================================================
// Emotions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Neutral,
}

impl EmotionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Joy => "joy",
            EmotionCategory::Sadness => "sadness",
            EmotionCategory::Anger => "anger",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Surprise => "surprise",
            EmotionCategory::Disgust => "disgust",
            EmotionCategory::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emotion {
    pub name: String,
    pub category: EmotionCategory,
    pub intensity: f32,
    pub description: String,
}

/// The emotional reading of one message. Immutable once attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalAnalysis {
    pub primary: Emotion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Emotion>,
    pub intensity: f32,
    pub confidence: f32,
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

/// The shape a remote analyst returns: an analysis without its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEmotion {
    pub primary: Emotion,
    #[serde(default)]
    pub secondary: Option<Emotion>,
    pub intensity: f32,
    pub confidence: f32,
    #[serde(default)]
    pub context: String,
}

impl RemoteEmotion {
    /// Stamps the remote reading, clamping every score into `[0, 1]`.
    pub fn into_analysis(self, timestamp: DateTime<Utc>) -> EmotionalAnalysis {
        let clamp_emotion = |mut e: Emotion| {
            e.intensity = e.intensity.clamp(0.0, 1.0);
            e
        };
        EmotionalAnalysis {
            primary: clamp_emotion(self.primary),
            secondary: self.secondary.map(clamp_emotion),
            intensity: self.intensity.clamp(0.0, 1.0),
            confidence: self.confidence.clamp(0.0, 1.0),
            context: self.context,
            timestamp,
        }
    }
}

//=========================================================================================
// Messages and Conversations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotions: Option<EmotionalAnalysis>,
}

impl Message {
    pub fn new(content: impl Into<String>, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            timestamp,
            emotions: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User, Utc::now())
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Ai, Utc::now())
    }

    /// Attaches an analysis; the only mutation a message ever receives.
    pub fn attach_emotions(&mut self, analysis: EmotionalAnalysis) {
        self.emotions = Some(analysis);
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub messages: Vec<Message>,
    pub summary: String,
    pub tags: Vec<String>,
    pub mood: String,
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub starred: bool,
    pub archived: bool,
}

impl Conversation {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            messages: Vec::new(),
            summary: String::new(),
            tags: Vec::new(),
            mood: "neutral".to_string(),
            topics: Vec::new(),
            created_at: now,
            updated_at: now,
            starred: false,
            archived: false,
        }
    }

    pub fn user_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_user())
    }
}

//=========================================================================================
// Users, Preferences and Profiles
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiPersonality {
    #[default]
    Empathetic,
    Professional,
    Casual,
    Analytical,
}

impl AiPersonality {
    /// The base system prompt for this personality.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            AiPersonality::Empathetic => "You are a warm, empathetic AI companion focused on emotional support and understanding.",
            AiPersonality::Professional => "You are a professional therapeutic AI assistant providing structured emotional guidance.",
            AiPersonality::Casual => "You are a friendly, casual AI companion who talks like a supportive friend.",
            AiPersonality::Analytical => "You are an analytical AI companion focused on patterns, insights, and structured thinking.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub theme: Theme,
    pub ai_personality: AiPersonality,
    pub voice_enabled: bool,
    pub notifications: bool,
    pub auto_save: bool,
    pub font_size: FontSize,
    pub color_scheme: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            ai_personality: AiPersonality::Empathetic,
            voice_enabled: true,
            notifications: true,
            auto_save: true,
            font_size: FontSize::Medium,
            color_scheme: "purple".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalPattern {
    pub emotion: String,
    pub frequency: u32,
    pub triggers: Vec<String>,
    pub contexts: Vec<String>,
    pub trends: Vec<TrendPoint>,
}

impl EmotionalPattern {
    pub fn new(emotion: impl Into<String>) -> Self {
        Self {
            emotion: emotion.into(),
            frequency: 0,
            triggers: Vec::new(),
            contexts: Vec::new(),
            trends: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub communication_style: Vec<String>,
    pub emotional_patterns: Vec<EmotionalPattern>,
    pub topics: Vec<String>,
    pub goals: Vec<String>,
    pub triggers: Vec<String>,
    pub preferred_tone: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            communication_style: Vec::new(),
            emotional_patterns: Vec::new(),
            topics: Vec::new(),
            goals: Vec::new(),
            triggers: Vec::new(),
            preferred_tone: "empathetic".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub preferences: UserPreferences,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar: String::new(),
            preferences: UserPreferences::default(),
            profile: UserProfile::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

//=========================================================================================
// AI Settings
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    #[default]
    Mock,
}

/// Explicit settings handed to the response generator at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Mock,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: AiPersonality::Empathetic.system_prompt().to_string(),
        }
    }
}

impl AiSettings {
    /// True when a non-blank credential is present and the provider is not the mock.
    pub fn remote_enabled(&self) -> bool {
        self.provider != Provider::Mock
            && self
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }
}

//=========================================================================================
// Analytics
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTrend {
    pub date: DateTime<Utc>,
    pub mood: String,
    pub intensity: f32,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total: usize,
    pub this_week: usize,
    pub average_length: f32,
    pub top_topics: Vec<TopicCount>,
}
