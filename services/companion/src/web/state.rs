//! services/companion/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use mendi_core::ports::{
    ChatCompletionService, EmotionAnalysisService, KeyValueStore, SpeechToTextService,
    TextToSpeechService,
};
use mendi_core::{ChatPipeline, Companion, ConversationMemory, CrisisDetector, EmotionAnalyzer, ResponseSelector};
use tokio::sync::Mutex;

use crate::config::Config;

/// The remote adapters, all absent when the service runs in mock mode.
#[derive(Clone, Default)]
pub struct RemoteServices {
    pub chat: Option<Arc<dyn ChatCompletionService>>,
    pub emotion: Option<Arc<dyn EmotionAnalysisService>>,
    pub stt: Option<Arc<dyn SpeechToTextService>>,
    pub tts: Option<Arc<dyn TextToSpeechService>>,
}

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: ChatPipeline,
    pub memory: ConversationMemory<dyn KeyValueStore>,
    pub stt: Option<Arc<dyn SpeechToTextService>>,
    pub tts: Option<Arc<dyn TextToSpeechService>>,
    /// Held for the whole read-turn-save sequence so turns never interleave.
    pub turn_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn KeyValueStore>, remote: RemoteServices) -> Self {
        Self::with_selector(config, store, remote, ResponseSelector::default())
    }

    pub fn with_selector(
        config: Arc<Config>,
        store: Arc<dyn KeyValueStore>,
        remote: RemoteServices,
        selector: ResponseSelector,
    ) -> Self {
        let companion = Companion::new(config.ai_settings(), remote.chat, selector);
        let pipeline = ChatPipeline::new(
            CrisisDetector::default(),
            EmotionAnalyzer::new(remote.emotion),
            companion,
        );
        Self {
            config,
            pipeline,
            memory: ConversationMemory::new(store),
            stt: remote.stt,
            tts: remote.tts,
            turn_lock: Mutex::new(()),
        }
    }
}
