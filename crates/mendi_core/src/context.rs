//! crates/mendi_core/src/context.rs
//!
//! Derives a lightweight picture of the conversation so far: topics, the
//! emotional journey, how far the conversation has developed, and the user's habits.

use serde::Serialize;

use crate::domain::Message;

/// How many trailing user messages the context window covers.
pub const CONTEXT_WINDOW: usize = 5;

const TOPIC_MAP: &[(&str, &[&str])] = &[
    ("work-stress", &["work", "job", "boss", "colleague", "office", "deadline", "meeting", "career"]),
    ("relationships", &["relationship", "partner", "boyfriend", "girlfriend", "dating", "love", "breakup"]),
    ("family-dynamics", &["family", "mom", "dad", "parent", "sibling", "brother", "sister", "home"]),
    ("mental-health", &["anxiety", "depression", "stress", "overwhelmed", "panic", "therapy", "counseling"]),
    ("life-changes", &["change", "transition", "moving", "new", "different", "future", "decision"]),
    ("self-doubt", &["doubt", "confidence", "insecure", "uncertain", "confused", "lost", "direction"]),
    ("achievement", &["success", "proud", "accomplished", "goal", "achievement", "progress"]),
    ("social-issues", &["friends", "social", "lonely", "isolated", "connection", "belonging"]),
];

const JOURNEY_MAP: &[(&str, &[&str])] = &[
    ("happy", &["happy", "excited", "great"]),
    ("sad", &["sad", "down", "upset"]),
    ("angry", &["angry", "frustrated", "mad"]),
    ("anxious", &["worried", "anxious", "nervous"]),
    ("confused", &["confused", "uncertain", "lost"]),
];

const REFLECTION_PHRASES: &[&str] = &["i feel", "i think", "i believe", "i noticed", "i realized"];
const HELP_PHRASES: &[&str] = &["help", "advice", "what should i", "how do i", "what do you think"];
const EMOTION_WORDS: &[&str] = &["feel", "feeling", "emotion", "sad", "happy", "angry", "frustrated", "excited"];

/// Coarse maturity bucket derived from the total message count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationPhase {
    Opening,
    Developing,
    Deepening,
    Established,
}

impl ConversationPhase {
    pub fn from_message_count(count: usize) -> Self {
        match count {
            0..=2 => ConversationPhase::Opening,
            3..=6 => ConversationPhase::Developing,
            7..=12 => ConversationPhase::Deepening,
            _ => ConversationPhase::Established,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserPattern {
    Inquisitive,
    Reflective,
    AdviceSeeking,
    EmotionallyExpressive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub recent_topics: Vec<&'static str>,
    pub emotional_journey: Vec<String>,
    pub conversation_flow: ConversationPhase,
    pub user_patterns: Vec<UserPattern>,
}

impl ConversationContext {
    pub fn build(history: &[Message]) -> Self {
        let user_messages: Vec<&Message> = history.iter().filter(|m| m.is_user()).collect();
        let window = &user_messages[user_messages.len().saturating_sub(CONTEXT_WINDOW)..];

        Self {
            recent_topics: extract_topics(window),
            emotional_journey: window.iter().map(|m| journey_step(m)).collect(),
            conversation_flow: ConversationPhase::from_message_count(history.len()),
            user_patterns: identify_patterns(window),
        }
    }
}

/// Presence-only: a topic counts once any of its keywords appears.
fn extract_topics(window: &[&Message]) -> Vec<&'static str> {
    let combined = window
        .iter()
        .map(|m| m.content.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    TOPIC_MAP
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| combined.contains(k)))
        .map(|(topic, _)| *topic)
        .collect()
}

fn journey_step(message: &Message) -> String {
    if let Some(analysis) = &message.emotions {
        return analysis.primary.name.clone();
    }
    let content = message.content.to_lowercase();
    JOURNEY_MAP
        .iter()
        .find(|(_, words)| words.iter().any(|w| content.contains(w)))
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| "neutral".to_string())
}

fn identify_patterns(window: &[&Message]) -> Vec<UserPattern> {
    if window.is_empty() {
        return Vec::new();
    }
    let contents: Vec<String> = window.iter().map(|m| m.content.to_lowercase()).collect();
    let ratio = |phrases: &[&str]| {
        let hits = contents.iter().filter(|c| contains_any(c, phrases)).count();
        hits as f32 / contents.len() as f32
    };

    let mut patterns = Vec::new();
    if ratio(&["?"]) > 0.5 {
        patterns.push(UserPattern::Inquisitive);
    }
    if ratio(REFLECTION_PHRASES) > 0.3 {
        patterns.push(UserPattern::Reflective);
    }
    if ratio(HELP_PHRASES) > 0.3 {
        patterns.push(UserPattern::AdviceSeeking);
    }
    if ratio(EMOTION_WORDS) > 0.4 {
        patterns.push(UserPattern::EmotionallyExpressive);
    }
    patterns
}

pub(crate) fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::analyze_locally;
    use chrono::Utc;

    fn user(text: &str) -> Message {
        Message::user(text)
    }

    #[test]
    fn phase_thresholds() {
        assert_eq!(ConversationPhase::from_message_count(0), ConversationPhase::Opening);
        assert_eq!(ConversationPhase::from_message_count(2), ConversationPhase::Opening);
        assert_eq!(ConversationPhase::from_message_count(3), ConversationPhase::Developing);
        assert_eq!(ConversationPhase::from_message_count(6), ConversationPhase::Developing);
        assert_eq!(ConversationPhase::from_message_count(12), ConversationPhase::Deepening);
        assert_eq!(ConversationPhase::from_message_count(13), ConversationPhase::Established);
    }

    #[test]
    fn topics_are_presence_only_and_ordered_by_table() {
        let history = vec![
            user("My boss keeps moving the deadline"),
            Message::ai("That sounds stressful."),
            user("and my sister is not helping"),
        ];
        let ctx = ConversationContext::build(&history);
        assert_eq!(ctx.recent_topics, vec!["work-stress", "family-dynamics", "life-changes"]);
        assert_eq!(ctx.conversation_flow, ConversationPhase::Developing);
    }

    #[test]
    fn window_keeps_last_five_user_messages() {
        let mut history = vec![user("my boss is awful")];
        for _ in 0..5 {
            history.push(user("just a plain line"));
        }
        let ctx = ConversationContext::build(&history);
        assert_eq!(ctx.emotional_journey.len(), 5);
        assert!(!ctx.recent_topics.contains(&"work-stress"));
    }

    #[test]
    fn journey_prefers_attached_analysis() {
        let mut analyzed = user("whatever");
        analyzed.attach_emotions(analyze_locally("I am thrilled", Utc::now()));
        let history = vec![analyzed, user("I'm so confused"), user("nothing much")];
        let ctx = ConversationContext::build(&history);
        assert_eq!(ctx.emotional_journey, vec!["joy", "confused", "neutral"]);
    }

    #[test]
    fn patterns_fire_on_ratios() {
        let history = vec![
            user("I feel lost, what should I do?"),
            user("Can you help me think?"),
            user("I think I am happy though"),
        ];
        let ctx = ConversationContext::build(&history);
        assert_eq!(
            ctx.user_patterns,
            vec![
                UserPattern::Inquisitive,
                UserPattern::Reflective,
                UserPattern::AdviceSeeking,
                UserPattern::EmotionallyExpressive,
            ]
        );
    }

    #[test]
    fn empty_history_has_no_patterns() {
        let ctx = ConversationContext::build(&[]);
        assert!(ctx.user_patterns.is_empty());
        assert!(ctx.recent_topics.is_empty());
        assert_eq!(ctx.conversation_flow, ConversationPhase::Opening);
    }
}
