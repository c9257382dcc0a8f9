//! crates/mendi_core/src/prompt.rs
//!
//! Assembles the system instruction sent along with remote chat completions.

use crate::domain::{AiSettings, CrisisCheck, User};

const COMPANION_BRIEF: &str = "You are Mendi, an advanced emotional AI companion. Your responses must be:

1. HIGHLY CONTEXTUAL: Reference specific details from what the user shared
2. CREATIVELY VARIED: Never repeat the same response patterns
3. EMOTIONALLY ATTUNED: Match the user's emotional state and situation
4. PERSONALLY RELEVANT: Address their specific circumstances, not generic situations
5. CONVERSATIONALLY NATURAL: Respond as a thoughtful friend would
6. DEEPLY ENGAGING: Ask questions that show you understand their unique situation

CRITICAL GUIDELINES:
- Always reference specific phrases or situations the user mentioned
- Vary your response style based on conversation history
- Avoid generic therapeutic language
- Make each response feel personally crafted for their exact situation
- Show genuine curiosity about their specific experience
- Balance support with authentic engagement";

const CRISIS_ALERT: &str = "CRISIS ALERT: The user may be experiencing a mental health crisis. Reference their specific words while providing appropriate crisis support and encouraging professional help.";

/// Builds the system prompt for one turn.
///
/// The base personality comes from the user's preferences when a user is known,
/// otherwise from the configured settings.
pub fn build_system_prompt(user: Option<&User>, settings: &AiSettings, crisis: &CrisisCheck) -> String {
    let base = match user {
        Some(user) => user.preferences.ai_personality.system_prompt(),
        None => settings.system_prompt.as_str(),
    };

    let mut prompt = format!("{}\n\n{}", base, COMPANION_BRIEF);

    if let Some(user) = user {
        let profile = &user.profile;
        let style = if profile.communication_style.is_empty() {
            "Getting to know them".to_string()
        } else {
            profile.communication_style.join(", ")
        };
        let topics = if profile.topics.is_empty() {
            "New conversation".to_string()
        } else {
            profile.topics.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        };
        prompt.push_str(&format!(
            "\n\nUSER CONTEXT:\n- Name: {}\n- Communication Style: {}\n- Recent Topics: {}\n- Conversation Personality: {}",
            user.name, style, topics, profile.preferred_tone
        ));
    }

    if crisis.detected {
        prompt.push_str("\n\n");
        prompt.push_str(CRISIS_ALERT);
    }

    prompt
}
