//! crates/mendi_core/src/memory.rs
//!
//! Conversation and user persistence on top of a `KeyValueStore`, plus the
//! derived data kept alongside: the user profile, conversation summaries,
//! titles and exports.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Conversation, EmotionalAnalysis, EmotionalPattern, Message, Sender, TrendPoint, User, UserProfile};
use crate::ports::{KeyValueStore, PortError, PortResult};

pub const USER_KEY: &str = "user";
pub const CONVERSATIONS_KEY: &str = "conversations";

/// Upper bound on remembered profile topics.
pub const MAX_PROFILE_TOPICS: usize = 20;
pub const DEFAULT_USER_NAME: &str = "You";
pub const UNTITLED: &str = "New Conversation";

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("work", &["work", "job", "career", "boss", "colleague", "office", "meeting"]),
    ("relationships", &["relationship", "partner", "friend", "family", "love", "dating"]),
    ("health", &["health", "doctor", "medicine", "exercise", "diet", "sleep"]),
    ("anxiety", &["anxiety", "anxious", "worry", "stress", "nervous", "panic"]),
    ("depression", &["depression", "depressed", "sad", "down", "hopeless"]),
    ("goals", &["goal", "dream", "ambition", "plan", "future", "achieve"]),
    ("finance", &["money", "budget", "debt", "savings", "financial", "income"]),
];

static EMOTIONAL_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)feel|feeling|emotion|mood|sad|happy|angry|excited").expect("emotional word pattern is valid")
});

//=========================================================================================
// Pure derivations
//=========================================================================================

/// Style labels from message length, question ratio and emotional vocabulary.
pub fn communication_style(user_messages: &[&Message]) -> Vec<String> {
    if user_messages.is_empty() {
        return Vec::new();
    }
    let n = user_messages.len() as f32;
    let total_chars: usize = user_messages.iter().map(|m| m.content.chars().count()).sum();
    let average_length = total_chars as f32 / n;

    let mut styles = Vec::new();
    if average_length > 200.0 {
        styles.push("detailed".to_string());
    } else if average_length < 50.0 {
        styles.push("concise".to_string());
    }

    let questions = user_messages.iter().filter(|m| m.content.contains('?')).count();
    if questions as f32 / n > 0.3 {
        styles.push("inquisitive".to_string());
    }

    let emotional = user_messages.iter().filter(|m| EMOTIONAL_WORDS.is_match(&m.content)).count();
    if emotional as f32 / n > 0.2 {
        styles.push("emotionally-expressive".to_string());
    }
    styles
}

/// Profile topics mentioned in the messages, most frequent first.
///
/// Keyword hits are counted as substrings; equal counts keep table order.
pub fn extract_topics(user_messages: &[&Message]) -> Vec<String> {
    let combined = user_messages
        .iter()
        .map(|m| m.content.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut counts: Vec<(&str, usize)> = TOPIC_KEYWORDS
        .iter()
        .map(|(topic, keywords)| (*topic, keywords.iter().map(|k| combined.matches(k).count()).sum()))
        .filter(|(_, count)| *count > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(topic, _)| topic.to_string()).collect()
}

/// Folds every analyzed user message into `patterns`.
///
/// A message whose timestamp already appears in its emotion's trend was folded
/// by an earlier save and is skipped, so folding the same history twice is a no-op.
pub fn fold_emotional_patterns(patterns: &mut Vec<EmotionalPattern>, user_messages: &[&Message]) {
    for message in user_messages {
        let Some(analysis) = &message.emotions else {
            continue;
        };
        let name = &analysis.primary.name;
        let index = match patterns.iter().position(|p| &p.emotion == name) {
            Some(i) => i,
            None => {
                patterns.push(EmotionalPattern::new(name.clone()));
                patterns.len() - 1
            }
        };
        let pattern = &mut patterns[index];
        if pattern.trends.iter().any(|t| t.date == message.timestamp) {
            continue;
        }
        pattern.frequency += 1;
        pattern.trends.push(TrendPoint {
            date: message.timestamp,
            intensity: analysis.intensity,
        });
    }
}

/// Newest topics first, then the remembered ones, without duplicates.
pub fn merge_topics(fresh: Vec<String>, remembered: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(MAX_PROFILE_TOPICS);
    for topic in fresh.into_iter().chain(remembered.iter().cloned()) {
        if merged.len() == MAX_PROFILE_TOPICS {
            break;
        }
        if !merged.contains(&topic) {
            merged.push(topic);
        }
    }
    merged
}

/// The emotion named most often, earliest first seen on ties; "neutral" when none.
fn dominant_emotion<'a>(analyses: impl Iterator<Item = &'a EmotionalAnalysis>) -> String {
    let mut tallies: Vec<(&str, usize)> = Vec::new();
    for analysis in analyses {
        let name = analysis.primary.name.as_str();
        match tallies.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => tallies.push((name, 1)),
        }
    }
    tallies
        .iter()
        .fold(None, |best: Option<(&str, usize)>, &(name, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((name, count)),
        })
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| "neutral".to_string())
}

pub fn generate_summary(conversation: &Conversation) -> String {
    let user_messages: Vec<&Message> = conversation.user_messages().collect();
    let topics = extract_topics(&user_messages);
    let dominant = dominant_emotion(conversation.messages.iter().filter_map(|m| m.emotions.as_ref()));
    format!(
        "Discussed {} with a predominantly {} mood. {} user messages exchanged.",
        topics.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
        dominant,
        user_messages.len()
    )
}

/// Title from the first user message: its first six words, cut at 30 characters.
pub fn conversation_title(messages: &[Message]) -> String {
    let Some(first) = messages.iter().find(|m| m.is_user()) else {
        return UNTITLED.to_string();
    };
    let words = first.content.split(' ').take(6).collect::<Vec<_>>().join(" ");
    if words.chars().count() > 30 {
        format!("{}...", words.chars().take(30).collect::<String>())
    } else {
        words
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedMessage {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotions: Option<EmotionalAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationExport {
    pub title: String,
    pub date: DateTime<Utc>,
    pub messages: Vec<ExportedMessage>,
}

pub fn export_conversation(conversation: &Conversation) -> ConversationExport {
    ConversationExport {
        title: conversation.title.clone(),
        date: conversation.created_at,
        messages: conversation
            .messages
            .iter()
            .map(|m| ExportedMessage {
                sender: m.sender,
                content: m.content.clone(),
                timestamp: m.timestamp,
                emotions: m.emotions.clone(),
            })
            .collect(),
    }
}

/// File-name-safe form of a title.
pub fn export_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.json", stem)
}

//=========================================================================================
// Store-backed memory
//=========================================================================================

pub struct ConversationMemory<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ConversationMemory<S> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<S: KeyValueStore + ?Sized> ConversationMemory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> PortResult<Option<T>> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| PortError::Unexpected(format!("Corrupt '{}' entry: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PortResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(key, raw).await
    }

    pub async fn save_user(&self, user: &User) -> PortResult<()> {
        self.write(USER_KEY, user).await
    }

    pub async fn user(&self) -> PortResult<Option<User>> {
        self.read(USER_KEY).await
    }

    /// Returns the stored user, creating the default one on first use.
    pub async fn ensure_user(&self, now: DateTime<Utc>) -> PortResult<User> {
        if let Some(user) = self.user().await? {
            return Ok(user);
        }
        let user = User::new(DEFAULT_USER_NAME, now);
        self.save_user(&user).await?;
        info!(user_id = %user.id, "Created default user");
        Ok(user)
    }

    pub async fn conversations(&self) -> PortResult<Vec<Conversation>> {
        Ok(self.read(CONVERSATIONS_KEY).await?.unwrap_or_default())
    }

    pub async fn conversation(&self, id: Uuid) -> PortResult<Option<Conversation>> {
        Ok(self.conversations().await?.into_iter().find(|c| c.id == id))
    }

    /// Replaces the conversation with the same id, or appends it.
    pub async fn save_conversation(&self, conversation: &Conversation) -> PortResult<()> {
        let mut all = self.conversations().await?;
        match all.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation.clone(),
            None => all.push(conversation.clone()),
        }
        self.write(CONVERSATIONS_KEY, &all).await
    }

    /// Returns whether a conversation was removed.
    pub async fn delete_conversation(&self, id: Uuid) -> PortResult<bool> {
        let mut all = self.conversations().await?;
        let before = all.len();
        all.retain(|c| c.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.write(CONVERSATIONS_KEY, &all).await?;
        Ok(true)
    }

    pub async fn set_starred(&self, id: Uuid, starred: bool) -> PortResult<Conversation> {
        let mut conversation = self
            .conversation(id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Conversation {}", id)))?;
        conversation.starred = starred;
        self.save_conversation(&conversation).await?;
        Ok(conversation)
    }

    /// Re-derives the stored user's profile from `messages` and saves it.
    ///
    /// Without a stored user nothing is saved and the default profile is returned.
    pub async fn update_user_profile(&self, messages: &[Message], now: DateTime<Utc>) -> PortResult<UserProfile> {
        let Some(mut user) = self.user().await? else {
            return Ok(UserProfile::default());
        };
        let user_messages: Vec<&Message> = messages.iter().filter(|m| m.is_user()).collect();

        let profile = &mut user.profile;
        profile.communication_style = communication_style(&user_messages);
        fold_emotional_patterns(&mut profile.emotional_patterns, &user_messages);
        profile.topics = merge_topics(extract_topics(&user_messages), &profile.topics);

        user.updated_at = now;
        self.save_user(&user).await?;
        debug!(topics = user.profile.topics.len(), "User profile updated");
        Ok(user.profile)
    }

    /// Persists the running conversation after a turn.
    ///
    /// A conversation is only created once the history holds at least two
    /// messages; until then `None` is returned and nothing is written.
    pub async fn auto_save(
        &self,
        current: Option<Conversation>,
        messages: &[Message],
        now: DateTime<Utc>,
    ) -> PortResult<Option<Conversation>> {
        let mut conversation = match current {
            Some(existing) => existing,
            None if messages.len() < 2 => return Ok(None),
            None => Conversation::new(conversation_title(messages), now),
        };

        let user_messages: Vec<&Message> = messages.iter().filter(|m| m.is_user()).collect();
        conversation.messages = messages.to_vec();
        conversation.summary = generate_summary(&conversation);
        conversation.topics = extract_topics(&user_messages);
        if let Some(analysis) = user_messages.last().and_then(|m| m.emotions.as_ref()) {
            conversation.mood = analysis.primary.name.clone();
        }
        conversation.updated_at = now;

        self.save_conversation(&conversation).await?;
        Ok(Some(conversation))
    }

    /// A short plain-text digest of the user profile and the last five messages.
    pub async fn context_for_response(&self, id: Uuid) -> PortResult<String> {
        let (Some(conversation), Some(user)) = (self.conversation(id).await?, self.user().await?) else {
            return Ok(String::new());
        };
        let start = conversation.messages.len().saturating_sub(5);
        let recent = conversation.messages[start..]
            .iter()
            .map(|m| {
                let sender = match m.sender {
                    Sender::User => "user",
                    Sender::Ai => "ai",
                };
                format!("{}: {}", sender, m.content.chars().take(100).collect::<String>())
            })
            .collect::<Vec<_>>()
            .join(" | ");
        let topics = user.profile.topics.iter().take(5).cloned().collect::<Vec<_>>().join(", ");

        Ok(format!(
            "User Profile: Communication style: {}.\nRecent topics: {}.\nConversation context: {}",
            user.profile.communication_style.join(", "),
            topics,
            recent
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::analyze_locally;
    use crate::store::InMemoryStore;
    use chrono::Duration;

    fn memory() -> ConversationMemory<InMemoryStore> {
        ConversationMemory::new(Arc::new(InMemoryStore::new()))
    }

    fn analyzed(text: &str, at: DateTime<Utc>) -> Message {
        let mut message = Message::new(text, Sender::User, at);
        message.attach_emotions(analyze_locally(text, at));
        message
    }

    #[test]
    fn style_labels() {
        let a = Message::user("Why?");
        let b = Message::user("I feel sad");
        let style = communication_style(&[&a, &b]);
        assert_eq!(style, vec!["concise", "inquisitive", "emotionally-expressive"]);

        let long = Message::user("x".repeat(250));
        assert_eq!(communication_style(&[&long]), vec!["detailed"]);
    }

    #[test]
    fn topics_sorted_by_count() {
        let a = Message::user("money money debt and my job");
        assert_eq!(extract_topics(&[&a]), vec!["finance", "work"]);
    }

    #[test]
    fn merge_puts_fresh_first_and_caps() {
        let remembered: Vec<String> = (0..25).map(|i| format!("t{}", i)).collect();
        let merged = merge_topics(vec!["new".into(), "t3".into()], &remembered);
        assert_eq!(merged.len(), MAX_PROFILE_TOPICS);
        assert_eq!(merged[0], "new");
        assert_eq!(merged[1], "t3");
        assert_eq!(merged[2], "t0");
        assert_eq!(merged.iter().filter(|t| *t == "t3").count(), 1);
    }

    #[test]
    fn folding_same_history_twice_is_a_no_op() {
        let now = Utc::now();
        let a = analyzed("I am happy", now);
        let b = analyzed("so happy again", now + Duration::seconds(1));
        let mut patterns = Vec::new();
        fold_emotional_patterns(&mut patterns, &[&a, &b]);
        fold_emotional_patterns(&mut patterns, &[&a, &b]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].frequency, 2);
        assert_eq!(patterns[0].trends.len(), 2);
    }

    #[test]
    fn summary_is_deterministic() {
        let now = Utc::now();
        let mut conversation = Conversation::new("t", now);
        conversation.messages = vec![
            analyzed("my job makes me sad", now),
            Message::ai("I hear you"),
            analyzed("I am happy at work though", now + Duration::seconds(1)),
        ];
        let summary = generate_summary(&conversation);
        assert_eq!(
            summary,
            "Discussed work, depression with a predominantly sadness mood. 2 user messages exchanged."
        );
        assert_eq!(summary, generate_summary(&conversation));
    }

    #[test]
    fn summary_without_analyses_is_neutral() {
        let mut conversation = Conversation::new("t", Utc::now());
        conversation.messages = vec![Message::user("hello")];
        assert_eq!(
            generate_summary(&conversation),
            "Discussed  with a predominantly neutral mood. 1 user messages exchanged."
        );
    }

    #[test]
    fn titles() {
        assert_eq!(conversation_title(&[]), UNTITLED);
        assert_eq!(conversation_title(&[Message::ai("hi"), Message::user("Rough day")]), "Rough day");
        let title = conversation_title(&[Message::user("Extraordinarily complicated circumstances surrounded everything today")]);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn export_names_are_safe() {
        assert_eq!(export_file_name("Rough day, again!"), "Rough_day__again_.json");
    }

    #[tokio::test]
    async fn save_conversation_upserts() {
        let memory = memory();
        let mut conversation = Conversation::new("first", Utc::now());
        memory.save_conversation(&conversation).await.unwrap();
        conversation.title = "renamed".into();
        memory.save_conversation(&conversation).await.unwrap();

        let all = memory.conversations().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "renamed");
        assert!(memory.delete_conversation(conversation.id).await.unwrap());
        assert!(!memory.delete_conversation(conversation.id).await.unwrap());
        assert!(memory.conversation(conversation.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn starring_missing_conversation_is_not_found() {
        let err = memory().set_starred(Uuid::new_v4(), true).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn auto_save_waits_for_two_messages() {
        let memory = memory();
        let now = Utc::now();
        let one = vec![analyzed("hello", now)];
        assert!(memory.auto_save(None, &one, now).await.unwrap().is_none());

        let two = vec![analyzed("my boss made me angry", now), Message::ai("That sounds hard.")];
        let saved = memory.auto_save(None, &two, now).await.unwrap().unwrap();
        assert_eq!(saved.title, "my boss made me angry");
        assert_eq!(saved.mood, "anger");
        assert_eq!(saved.topics, vec!["work"]);
        assert_eq!(memory.conversations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn auto_save_refreshes_an_existing_conversation() {
        let memory = memory();
        let now = Utc::now();
        let first = vec![analyzed("my boss made me angry", now), Message::ai("That sounds hard.")];
        let saved = memory.auto_save(None, &first, now).await.unwrap().unwrap();

        let mut longer = first.clone();
        longer.push(analyzed("now I am happy, my partner cheered me up", now));
        longer.push(Message::ai("I'm glad to hear that."));
        let later = now + chrono::Duration::minutes(5);
        let updated = memory.auto_save(Some(saved.clone()), &longer, later).await.unwrap().unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.messages.len(), 4);
        assert_eq!(updated.mood, "joy");
        assert_eq!(updated.topics, vec!["work", "relationships"]);
        assert_eq!(updated.updated_at, later);
        let stored = memory.conversations().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], updated);
    }

    #[tokio::test]
    async fn profile_update_accumulates_and_persists() {
        let memory = memory();
        let now = Utc::now();
        memory.ensure_user(now).await.unwrap();

        let history = vec![analyzed("my job is stressful", now)];
        memory.update_user_profile(&history, now).await.unwrap();
        let profile = memory.update_user_profile(&history, now).await.unwrap();

        assert_eq!(profile.topics, vec!["work", "anxiety"]);
        assert_eq!(profile.emotional_patterns.len(), 1);
        assert_eq!(profile.emotional_patterns[0].frequency, 1);
        let stored = memory.user().await.unwrap().unwrap();
        assert_eq!(stored.profile, profile);
    }

    #[tokio::test]
    async fn profile_update_without_user_returns_default() {
        let profile = memory().update_user_profile(&[Message::user("work")], Utc::now()).await.unwrap();
        assert_eq!(profile, UserProfile::default());
    }

    #[tokio::test]
    async fn context_digest() {
        let memory = memory();
        let now = Utc::now();
        memory.ensure_user(now).await.unwrap();
        let saved = memory
            .auto_save(None, &[Message::user("work is hard"), Message::ai("Tell me more.")], now)
            .await
            .unwrap()
            .unwrap();
        let digest = memory.context_for_response(saved.id).await.unwrap();
        assert!(digest.contains("user: work is hard | ai: Tell me more."));
        assert!(memory.context_for_response(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
