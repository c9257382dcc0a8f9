//! crates/mendi_core/src/analysis.rs
//!
//! Pure classification of a single user message into intent, tone, situation,
//! urgency and the response style those imply.

use serde::Serialize;

use crate::context::contains_any;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Questioning,
    SeekingGuidance,
    EmotionalExpression,
    DecisionMaking,
    Sharing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Melancholic,
    Agitated,
    Anxious,
    Uncertain,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Situation {
    #[serde(rename = "work-related")]
    Work,
    #[serde(rename = "relationship-related")]
    Relationship,
    #[serde(rename = "family-related")]
    Family,
    #[serde(rename = "social-related")]
    Social,
    #[serde(rename = "academic-related")]
    Academic,
    #[serde(rename = "health-related")]
    Health,
    #[serde(rename = "financial-related")]
    Financial,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    Supportive,
    Exploratory,
    Guiding,
    Celebratory,
    Calming,
    Validating,
}

// Rule tables in priority order: the first rule whose phrases appear wins.
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::DecisionMaking, &["what should", "how do i"]),
    (Intent::EmotionalExpression, &["i feel", "i'm feeling"]),
    (Intent::SeekingGuidance, &["help", "advice"]),
    (Intent::Questioning, &["?"]),
];

const TONE_RULES: &[(Tone, &[&str])] = &[
    (Tone::Uncertain, &["confused", "uncertain", "lost"]),
    (Tone::Anxious, &["worried", "anxious", "scared"]),
    (Tone::Agitated, &["angry", "frustrated", "annoyed"]),
    (Tone::Melancholic, &["sad", "down", "upset"]),
    (Tone::Positive, &["excited", "happy", "great"]),
];

const SITUATION_RULES: &[(Situation, &[&str])] = &[
    (Situation::Financial, &["money", "financial"]),
    (Situation::Health, &["health", "sick"]),
    (Situation::Academic, &["school", "study"]),
    (Situation::Social, &["friend", "social"]),
    (Situation::Family, &["family", "parent"]),
    (Situation::Relationship, &["relationship", "partner"]),
    (Situation::Work, &["work", "job"]),
];

const URGENT_PHRASES: &[&str] = &["urgent", "emergency", "crisis", "immediately", "right now", "asap"];
const MODERATE_PHRASES: &[&str] = &["soon", "quickly", "important", "need to", "have to"];

fn first_match<T: Copy>(rules: &[(T, &[&str])], text: &str) -> Option<T> {
    rules
        .iter()
        .find(|(_, phrases)| contains_any(text, phrases))
        .map(|(value, _)| *value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub primary_intent: Intent,
    pub emotional_tone: Tone,
    pub specific_situation: Situation,
    pub key_phrases: Vec<String>,
    pub urgency: Urgency,
    pub response_style: ResponseStyle,
}

impl ContentAnalysis {
    pub fn of(content: &str) -> Self {
        let lower = content.to_lowercase();

        let primary_intent = first_match(INTENT_RULES, &lower).unwrap_or(Intent::Sharing);
        let emotional_tone = first_match(TONE_RULES, &lower).unwrap_or(Tone::Neutral);
        let specific_situation = first_match(SITUATION_RULES, &lower).unwrap_or(Situation::General);

        let urgency = if contains_any(&lower, URGENT_PHRASES) {
            Urgency::High
        } else if contains_any(&lower, MODERATE_PHRASES) {
            Urgency::Medium
        } else {
            Urgency::Low
        };

        let key_phrases = content
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| s.chars().count() > 5)
            .take(2)
            .map(str::to_string)
            .collect();

        Self {
            primary_intent,
            emotional_tone,
            specific_situation,
            key_phrases,
            urgency,
            response_style: response_style(primary_intent, emotional_tone),
        }
    }
}

/// Tone outranks intent when picking the style.
fn response_style(intent: Intent, tone: Tone) -> ResponseStyle {
    match (tone, intent) {
        (Tone::Agitated, _) => ResponseStyle::Validating,
        (Tone::Anxious, _) => ResponseStyle::Calming,
        (Tone::Positive, _) => ResponseStyle::Celebratory,
        (_, Intent::SeekingGuidance) => ResponseStyle::Guiding,
        (_, Intent::Questioning) => ResponseStyle::Exploratory,
        _ => ResponseStyle::Supportive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_statement_defaults_to_sharing() {
        let a = ContentAnalysis::of("Work was long today");
        assert_eq!(a.primary_intent, Intent::Sharing);
        assert_eq!(a.emotional_tone, Tone::Neutral);
        assert_eq!(a.specific_situation, Situation::Work);
        assert_eq!(a.urgency, Urgency::Low);
        assert_eq!(a.response_style, ResponseStyle::Supportive);
    }

    #[test]
    fn decision_making_outranks_every_other_intent() {
        let a = ContentAnalysis::of("I feel stuck, I need advice: what should I do?");
        assert_eq!(a.primary_intent, Intent::DecisionMaking);
    }

    #[test]
    fn guidance_outranks_question() {
        let a = ContentAnalysis::of("Can you help me?");
        assert_eq!(a.primary_intent, Intent::SeekingGuidance);
        assert_eq!(a.response_style, ResponseStyle::Guiding);
    }

    #[test]
    fn question_gets_exploratory_style() {
        let a = ContentAnalysis::of("Why do people change?");
        assert_eq!(a.primary_intent, Intent::Questioning);
        assert_eq!(a.response_style, ResponseStyle::Exploratory);
    }

    #[test]
    fn later_tones_take_precedence() {
        let a = ContentAnalysis::of("I'm happy but also worried and a bit confused");
        assert_eq!(a.emotional_tone, Tone::Uncertain);
        let b = ContentAnalysis::of("I was happy, now I'm angry");
        assert_eq!(b.emotional_tone, Tone::Agitated);
        assert_eq!(b.response_style, ResponseStyle::Validating);
    }

    #[test]
    fn tone_style_overrides_intent_style() {
        let a = ContentAnalysis::of("Any advice? I'm so anxious");
        assert_eq!(a.primary_intent, Intent::SeekingGuidance);
        assert_eq!(a.response_style, ResponseStyle::Calming);
    }

    #[test]
    fn situation_priority_follows_table() {
        let a = ContentAnalysis::of("money problems at work with my partner");
        assert_eq!(a.specific_situation, Situation::Financial);
    }

    #[test]
    fn urgent_beats_moderate() {
        assert_eq!(ContentAnalysis::of("I need to fix this right now").urgency, Urgency::High);
        assert_eq!(ContentAnalysis::of("I need to fix this soon").urgency, Urgency::Medium);
    }

    #[test]
    fn key_phrases_are_first_two_long_sentences() {
        let a = ContentAnalysis::of("Hi. I lost my keys today! Then the bus left early? Ugh.");
        assert_eq!(a.key_phrases, vec!["I lost my keys today", "Then the bus left early"]);
    }
}
