//! crates/mendi_core/src/responder.rs
//!
//! Reply generation. `ResponseSelector` picks a local template reply; `Companion`
//! wraps it with an optional remote chat model and the fallback rules.

use std::sync::{Arc, LazyLock};

use regex::RegexSet;
use tracing::{debug, warn};

use crate::analysis::{ContentAnalysis, Intent, Situation, Tone};
use crate::domain::{AiSettings, CrisisCheck, CrisisSeverity, Message, User};
use crate::picker::{RotationPicker, SeededRandomPicker, VariantPicker};
use crate::ports::{ChatCompletionService, ChatRequest, ChatRole, ChatTurn};
use crate::prompt::build_system_prompt;
use crate::templates::{self, fill, Pool, REASSURANCE};

/// How many trailing turns accompany a remote completion.
pub const REMOTE_HISTORY_TURNS: usize = 8;
pub const PRESENCE_PENALTY: f32 = 0.2;
pub const FREQUENCY_PENALTY: f32 = 0.3;

const DEFAULT_NAME: &str = "friend";
const SNIPPET_CHARS: usize = 50;

// Matched against the trimmed, lowercased message.
static GREETINGS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^(hi|hello|hey|hiya|howdy)$",
        r"^(hi|hello|hey|hiya|howdy)\s*[!.]*$",
        r"^(hi|hello|hey|hiya|howdy)\s+(there|mendi)$",
        r"^(good\s+morning|good\s+afternoon|good\s+evening|good\s+night)$",
        r"^(morning|afternoon|evening)$",
        r"^(what's\s+up|whats\s+up|sup|wassup)$",
        r"^(yo|hola|bonjour)$",
        r"^(how\s+are\s+you|how\s+are\s+you\s+doing|how\s+you\s+doing)$",
        r"^(how's\s+it\s+going|hows\s+it\s+going)$",
        r"^(hi\s+again|hello\s+again|hey\s+again)$",
        r"^(i'm\s+back|im\s+back|back\s+again)$",
    ])
    .expect("greeting patterns are valid")
});

pub fn is_greeting(message: &str) -> bool {
    GREETINGS.is_match(&message.trim().to_lowercase())
}

/// The quoted fragment used by crisis replies: at most 50 characters, with an
/// ellipsis when cut.
fn snippet(message: &str) -> String {
    if message.chars().count() > SNIPPET_CHARS {
        let cut: String = message.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", cut)
    } else {
        message.to_string()
    }
}

/// Local, template-based reply selection.
///
/// Crisis and greeting pools are chosen from with `random`; contextual pools
/// rotate with the conversation length through `rotation`.
#[derive(Clone)]
pub struct ResponseSelector {
    random: Arc<dyn VariantPicker>,
    rotation: Arc<dyn VariantPicker>,
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new(Arc::new(SeededRandomPicker::default()), Arc::new(RotationPicker))
    }
}

impl ResponseSelector {
    pub fn new(random: Arc<dyn VariantPicker>, rotation: Arc<dyn VariantPicker>) -> Self {
        Self { random, rotation }
    }

    /// A selector whose random pools are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededRandomPicker::from_seed(seed)), Arc::new(RotationPicker))
    }

    /// Replies to the last message of `history`; `None` for an empty history.
    pub fn select(&self, history: &[Message], user_name: Option<&str>, crisis: &CrisisCheck) -> Option<String> {
        let latest = history.last()?;
        let content = latest.content.as_str();
        let name = user_name.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_NAME);
        let turn = history.len();

        if crisis.detected {
            let pool = match crisis.severity {
                Some(CrisisSeverity::Critical) => templates::CRISIS_CRITICAL,
                Some(CrisisSeverity::High) => templates::CRISIS_HIGH,
                _ => templates::CRISIS_MEDIUM,
            };
            return Some(self.from_pool(&*self.random, pool, turn, name, &snippet(content)));
        }

        if is_greeting(content) {
            let pool = greeting_pool(&content.trim().to_lowercase(), history.len() <= 1);
            return Some(self.from_pool(&*self.random, pool, turn, name, ""));
        }

        let analysis = ContentAnalysis::of(content);
        let (pool, quote) = contextual_pool(content, &analysis);
        Some(self.from_pool(&*self.rotation, pool, turn, name, &quote))
    }

    fn from_pool(&self, picker: &dyn VariantPicker, pool: Pool, turn: usize, name: &str, quote: &str) -> String {
        let index = picker.pick(pool.len(), turn);
        fill(pool[index], name, quote)
    }
}

fn greeting_pool(greeting: &str, first_message: bool) -> Pool {
    if greeting.contains("morning") {
        templates::GREETING_MORNING
    } else if greeting.contains("afternoon") {
        templates::GREETING_AFTERNOON
    } else if greeting.contains("evening") || greeting.contains("night") {
        templates::GREETING_EVENING
    } else if greeting.contains("how are you") || greeting.contains("how you doing") {
        templates::GREETING_HOW_ARE_YOU
    } else if first_message {
        templates::GREETING_FIRST
    } else {
        templates::GREETING_REPEAT
    }
}

/// Maps the analysis onto a template pool, plus the text its `{quote}` refers to.
fn contextual_pool(content: &str, analysis: &ContentAnalysis) -> (Pool, String) {
    match analysis.primary_intent {
        Intent::Questioning => {
            let question = format!("{}?", content.split('?').next().unwrap_or_default());
            let pool = match analysis.specific_situation {
                Situation::Work => templates::QUESTION_WORK,
                Situation::Relationship => templates::QUESTION_RELATIONSHIP,
                _ => templates::QUESTION_GENERAL,
            };
            (pool, question)
        }
        Intent::SeekingGuidance => {
            let lower = content.to_lowercase();
            let pool = if lower.contains("change work") || lower.contains("change job") {
                templates::GUIDANCE_CAREER_CHANGE
            } else if analysis.specific_situation == Situation::Relationship {
                templates::GUIDANCE_RELATIONSHIP
            } else {
                templates::GUIDANCE_GENERAL
            };
            (pool, String::new())
        }
        Intent::EmotionalExpression => {
            let pool = match analysis.emotional_tone {
                Tone::Anxious => templates::EMOTION_ANXIOUS,
                Tone::Positive => templates::EMOTION_POSITIVE,
                Tone::Melancholic => templates::EMOTION_MELANCHOLIC,
                _ => templates::EMOTION_GENERAL,
            };
            (pool, String::new())
        }
        Intent::DecisionMaking => (templates::DECISION, String::new()),
        Intent::Sharing => {
            let pool = if analysis.specific_situation == Situation::Work {
                templates::SHARING_WORK
            } else {
                templates::SHARING_GENERAL
            };
            (pool, String::new())
        }
    }
}

/// The top-level reply generator, configured once with explicit settings.
#[derive(Clone)]
pub struct Companion {
    settings: AiSettings,
    chat: Option<Arc<dyn ChatCompletionService>>,
    selector: ResponseSelector,
}

impl Companion {
    pub fn new(
        settings: AiSettings,
        chat: Option<Arc<dyn ChatCompletionService>>,
        selector: ResponseSelector,
    ) -> Self {
        Self { settings, chat, selector }
    }

    /// A companion that never leaves the process.
    pub fn local(selector: ResponseSelector) -> Self {
        Self::new(AiSettings::default(), None, selector)
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// Produces the companion's reply to the last message of `history`.
    ///
    /// Never fails: a remote failure or empty remote reply drops to the local
    /// templates, and an empty history yields the fixed reassurance sentence.
    pub async fn generate_response(
        &self,
        history: &[Message],
        user: Option<&User>,
        crisis: &CrisisCheck,
    ) -> String {
        if history.is_empty() {
            return REASSURANCE.to_string();
        }

        if let Some(chat) = self.chat.as_ref().filter(|_| self.settings.remote_enabled()) {
            let request = self.chat_request(history, user, crisis);
            match chat.complete(request).await {
                Ok(reply) if !reply.trim().is_empty() => {
                    debug!("Remote chat completion produced the reply");
                    return reply;
                }
                Ok(_) => warn!("AI response generation returned an empty reply, falling back to creative response"),
                Err(e) => warn!("AI response generation failed, falling back to creative response: {}", e),
            }
        }

        self.selector
            .select(history, user.map(|u| u.name.as_str()), crisis)
            .unwrap_or_else(|| REASSURANCE.to_string())
    }

    fn chat_request(&self, history: &[Message], user: Option<&User>, crisis: &CrisisCheck) -> ChatRequest {
        let mut messages = vec![ChatTurn {
            role: ChatRole::System,
            content: build_system_prompt(user, &self.settings, crisis),
        }];
        let start = history.len().saturating_sub(REMOTE_HISTORY_TURNS);
        messages.extend(history[start..].iter().map(|m| ChatTurn {
            role: if m.is_user() { ChatRole::User } else { ChatRole::Assistant },
            content: m.content.clone(),
        }));

        ChatRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
        }
    }
}
