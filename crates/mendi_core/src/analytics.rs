//! crates/mendi_core/src/analytics.rs
//!
//! Mood and usage figures derived from stored conversations.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Conversation, ConversationStats, MoodTrend, TopicCount};

pub const TOP_TOPICS: usize = 5;

/// One point per analyzed user message across all conversations, oldest first.
pub fn mood_trends(conversations: &[Conversation]) -> Vec<MoodTrend> {
    let mut trends: Vec<MoodTrend> = conversations
        .iter()
        .flat_map(|c| c.user_messages())
        .filter_map(|m| {
            m.emotions.as_ref().map(|analysis| MoodTrend {
                date: m.timestamp,
                mood: analysis.primary.name.clone(),
                intensity: analysis.intensity,
                context: analysis.context.clone(),
            })
        })
        .collect();
    trends.sort_by_key(|t| t.date);
    trends
}

pub fn conversation_stats(conversations: &[Conversation], now: DateTime<Utc>) -> ConversationStats {
    let total = conversations.len();
    let week_ago = now - Duration::days(7);
    let this_week = conversations.iter().filter(|c| c.updated_at >= week_ago).count();
    let average_length = if total == 0 {
        0.0
    } else {
        conversations.iter().map(|c| c.messages.len()).sum::<usize>() as f32 / total as f32
    };

    let mut counts: Vec<TopicCount> = Vec::new();
    for topic in conversations.iter().flat_map(|c| c.topics.iter()) {
        match counts.iter_mut().find(|t| &t.topic == topic) {
            Some(entry) => entry.count += 1,
            None => counts.push(TopicCount { topic: topic.clone(), count: 1 }),
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_TOPICS);

    ConversationStats {
        total,
        this_week,
        average_length,
        top_topics: counts,
    }
}
