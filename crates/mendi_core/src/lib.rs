pub mod analysis;
pub mod analytics;
pub mod context;
pub mod crisis;
pub mod domain;
pub mod emotion;
pub mod memory;
pub mod picker;
pub mod pipeline;
pub mod ports;
pub mod prompt;
pub mod responder;
pub mod store;
pub mod templates;
pub mod voice;

pub use crisis::CrisisDetector;
pub use domain::{AiSettings, Conversation, CrisisCheck, EmotionalAnalysis, Message, User, UserProfile};
pub use emotion::EmotionAnalyzer;
pub use memory::ConversationMemory;
pub use pipeline::{ChatPipeline, TurnOutcome};
pub use ports::{
    ChatCompletionService, EmotionAnalysisService, KeyValueStore, PortError, PortResult,
    SpeechToTextService, TextToSpeechService,
};
pub use responder::{Companion, ResponseSelector};
pub use store::InMemoryStore;
pub use voice::{VoiceRecognizer, VoiceSettings};
