//! crates/mendi_core/src/voice.rs
//!
//! Voice input as an explicit state machine.
//!
//! A `VoiceRecognizer` is driven by `VoiceEvent`s and reports what happened as
//! `VoiceUpdate`s on a channel. Audio is buffered while listening and handed to
//! the `SpeechToTextService` on `Stop`. Every failure becomes a user-facing
//! advisory string; nothing here is fatal.

use std::sync::Arc;

use futures::channel::mpsc;
use futures::{SinkExt, Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::ports::{PortError, SpeechToTextService};

pub const DEFAULT_LANGUAGE: &str = "en-US";
const UPDATE_BUFFER: usize = 16;

const SUPPORTED_LANGUAGES: &[&str] = &[
    "en-US", "en-GB", "en-AU", "en-CA", "en-IN", "en-NZ", "en-ZA",
    "es-ES", "es-MX", "es-AR", "es-CO", "es-CL", "es-PE", "es-VE",
    "fr-FR", "fr-CA", "fr-BE", "fr-CH",
    "de-DE", "de-AT", "de-CH",
    "it-IT", "it-CH",
    "pt-BR", "pt-PT",
    "ru-RU", "ja-JP", "ko-KR",
    "zh-CN", "zh-TW", "zh-HK",
    "ar-SA", "ar-EG",
    "hi-IN", "th-TH", "tr-TR", "pl-PL",
    "nl-NL", "nl-BE",
    "sv-SE", "da-DK", "no-NO", "fi-FI", "cs-CZ", "sk-SK", "hu-HU", "ro-RO", "bg-BG",
    "hr-HR", "sl-SI", "et-EE", "lv-LV", "lt-LT", "mt-MT", "el-GR", "he-IL", "vi-VN",
    "id-ID", "ms-MY", "tl-PH", "uk-UA", "ca-ES", "eu-ES", "gl-ES",
];

/// Resolves a requested language tag to a supported one: the exact tag, else the
/// first variant of the same language, else `en-US`.
pub fn validate_language(requested: &str) -> &'static str {
    if let Some(exact) = SUPPORTED_LANGUAGES.iter().copied().find(|l| *l == requested) {
        return exact;
    }
    let code = requested.split('-').next().unwrap_or_default();
    if let Some(variant) = SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|l| l.split('-').next() == Some(code))
    {
        warn!("Language {} not supported, falling back to {}", requested, variant);
        return variant;
    }
    warn!("Language {} not supported, falling back to {}", requested, DEFAULT_LANGUAGE);
    DEFAULT_LANGUAGE
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceFailure {
    LanguageNotSupported,
    Network,
    NotAllowed,
    NoSpeech,
    AudioCapture,
    ServiceNotAllowed,
    StartFailed,
    Other(String),
}

impl VoiceFailure {
    pub fn advisory(&self) -> String {
        match self {
            VoiceFailure::LanguageNotSupported => {
                "Speech recognition language not supported by your browser.".to_string()
            }
            VoiceFailure::Network => {
                "Network error. Please check your internet connection and try again.".to_string()
            }
            VoiceFailure::NotAllowed => {
                "Microphone access denied. Please allow microphone permissions and try again.".to_string()
            }
            VoiceFailure::NoSpeech => "No speech detected. Please speak clearly and try again.".to_string(),
            VoiceFailure::AudioCapture => {
                "Microphone not available. Please check your microphone and try again.".to_string()
            }
            VoiceFailure::ServiceNotAllowed => {
                "Speech recognition service not allowed. Please check your browser settings.".to_string()
            }
            VoiceFailure::StartFailed => "Failed to start speech recognition. Please try again.".to_string(),
            VoiceFailure::Other(e) => {
                format!("Speech recognition failed: {}. Please try refreshing the page.", e)
            }
        }
    }
}

impl From<PortError> for VoiceFailure {
    fn from(e: PortError) -> Self {
        match e {
            PortError::Timeout(_) => VoiceFailure::Network,
            other => VoiceFailure::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSettings {
    pub enabled: bool,
    pub language: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
    Error(VoiceFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    Start,
    AudioChunk(Vec<u8>),
    Stop,
    Failed(VoiceFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceUpdate {
    Started { language: String },
    Transcript(String),
    Ended,
    /// A displayable advisory; never an exception.
    Error(String),
}

pub struct VoiceRecognizer {
    settings: VoiceSettings,
    state: VoiceState,
    buffer: Vec<u8>,
    stt: Arc<dyn SpeechToTextService>,
    updates: mpsc::Sender<VoiceUpdate>,
}

impl VoiceRecognizer {
    /// Creates a recognizer in `Idle` together with the receiving end of its updates.
    pub fn new(
        mut settings: VoiceSettings,
        stt: Arc<dyn SpeechToTextService>,
    ) -> (Self, mpsc::Receiver<VoiceUpdate>) {
        settings.language = validate_language(&settings.language).to_string();
        let (updates, receiver) = mpsc::channel(UPDATE_BUFFER);
        let recognizer = Self {
            settings,
            state: VoiceState::Idle,
            buffer: Vec::new(),
            stt,
            updates,
        };
        (recognizer, receiver)
    }

    pub fn state(&self) -> &VoiceState {
        &self.state
    }

    pub fn language(&self) -> &str {
        &self.settings.language
    }

    /// Consumes events until the stream ends.
    pub async fn run<E>(mut self, mut events: E)
    where
        E: Stream<Item = VoiceEvent> + Unpin,
    {
        while let Some(event) = events.next().await {
            self.handle(event).await;
        }
        debug!("Voice event stream closed");
    }

    pub async fn handle(&mut self, event: VoiceEvent) {
        let listening = self.state == VoiceState::Listening;
        match event {
            VoiceEvent::Start if listening => {
                debug!("Start ignored, already listening");
            }
            VoiceEvent::Start if !self.settings.enabled => {
                debug!("Start ignored, voice input is disabled");
            }
            VoiceEvent::Start => {
                self.buffer.clear();
                self.state = VoiceState::Listening;
                info!(language = %self.settings.language, "Voice recognition started");
                let language = self.settings.language.clone();
                self.emit(VoiceUpdate::Started { language }).await;
            }
            VoiceEvent::AudioChunk(chunk) if listening => {
                self.buffer.extend_from_slice(&chunk);
            }
            VoiceEvent::Stop if listening => {
                let audio = std::mem::take(&mut self.buffer);
                match self.stt.transcribe_audio(&audio).await {
                    Ok(text) if !text.trim().is_empty() => {
                        self.state = VoiceState::Idle;
                        self.emit(VoiceUpdate::Transcript(text.trim().to_string())).await;
                        self.emit(VoiceUpdate::Ended).await;
                    }
                    Ok(_) => self.fail(VoiceFailure::NoSpeech).await,
                    Err(e) => {
                        warn!("Transcription failed: {}", e);
                        self.fail(e.into()).await;
                    }
                }
            }
            VoiceEvent::Failed(failure) if listening || failure == VoiceFailure::StartFailed => {
                self.fail(failure).await;
            }
            other => {
                debug!(event = ?other, state = ?self.state, "Voice event ignored");
            }
        }
    }

    async fn fail(&mut self, failure: VoiceFailure) {
        warn!(?failure, "Speech recognition error");
        self.buffer.clear();
        let advisory = match failure {
            VoiceFailure::LanguageNotSupported if self.settings.language != DEFAULT_LANGUAGE => {
                self.settings.language = DEFAULT_LANGUAGE.to_string();
                format!("Language not supported. Switched to {}. Please try again.", DEFAULT_LANGUAGE)
            }
            ref other => other.advisory(),
        };
        self.state = VoiceState::Error(failure);
        self.emit(VoiceUpdate::Error(advisory)).await;
        self.emit(VoiceUpdate::Ended).await;
    }

    async fn emit(&mut self, update: VoiceUpdate) {
        if self.updates.send(update).await.is_err() {
            debug!("Voice update receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedStt {
        reply: Result<String, ()>,
        heard: Mutex<Vec<Vec<u8>>>,
    }

    impl ScriptedStt {
        fn new(reply: Result<String, ()>) -> Arc<Self> {
            Arc::new(Self { reply, heard: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl SpeechToTextService for ScriptedStt {
        async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String> {
            self.heard.lock().unwrap().push(audio_data.to_vec());
            self.reply.clone().map_err(|_| PortError::Timeout(20))
        }
    }

    fn drain(rx: &mut mpsc::Receiver<VoiceUpdate>) -> Vec<VoiceUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = rx.try_recv() {
            out.push(update);
        }
        out
    }

    #[test]
    fn language_fallbacks() {
        assert_eq!(validate_language("fr-CA"), "fr-CA");
        assert_eq!(validate_language("fr-LU"), "fr-FR");
        assert_eq!(validate_language("xx-YY"), "en-US");
    }

    #[tokio::test]
    async fn full_session_yields_transcript() {
        let stt = ScriptedStt::new(Ok("  hello there ".into()));
        let (mut rec, mut rx) = VoiceRecognizer::new(VoiceSettings::default(), stt.clone());

        rec.handle(VoiceEvent::Start).await;
        rec.handle(VoiceEvent::AudioChunk(vec![1, 2])).await;
        rec.handle(VoiceEvent::AudioChunk(vec![3])).await;
        rec.handle(VoiceEvent::Stop).await;

        assert_eq!(rec.state(), &VoiceState::Idle);
        assert_eq!(stt.heard.lock().unwrap()[0], vec![1, 2, 3]);
        assert_eq!(
            drain(&mut rx),
            vec![
                VoiceUpdate::Started { language: "en-US".into() },
                VoiceUpdate::Transcript("hello there".into()),
                VoiceUpdate::Ended,
            ]
        );
    }

    #[tokio::test]
    async fn second_start_and_disabled_start_are_ignored() {
        let stt = ScriptedStt::new(Ok("x".into()));
        let (mut rec, mut rx) = VoiceRecognizer::new(VoiceSettings::default(), stt.clone());
        rec.handle(VoiceEvent::Start).await;
        rec.handle(VoiceEvent::Start).await;
        assert_eq!(drain(&mut rx).len(), 1);

        let settings = VoiceSettings { enabled: false, ..VoiceSettings::default() };
        let (mut off, mut rx) = VoiceRecognizer::new(settings, stt);
        off.handle(VoiceEvent::Start).await;
        assert_eq!(off.state(), &VoiceState::Idle);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn empty_transcript_is_no_speech() {
        let (mut rec, mut rx) = VoiceRecognizer::new(VoiceSettings::default(), ScriptedStt::new(Ok("   ".into())));
        rec.handle(VoiceEvent::Start).await;
        rec.handle(VoiceEvent::Stop).await;
        assert_eq!(rec.state(), &VoiceState::Error(VoiceFailure::NoSpeech));
        let updates = drain(&mut rx);
        assert_eq!(updates[1], VoiceUpdate::Error(VoiceFailure::NoSpeech.advisory()));
        assert_eq!(updates[2], VoiceUpdate::Ended);
    }

    #[tokio::test]
    async fn transcription_timeout_reads_as_network_error() {
        let (mut rec, mut rx) = VoiceRecognizer::new(VoiceSettings::default(), ScriptedStt::new(Err(())));
        rec.handle(VoiceEvent::Start).await;
        rec.handle(VoiceEvent::Stop).await;
        assert_eq!(rec.state(), &VoiceState::Error(VoiceFailure::Network));
        assert!(drain(&mut rx).contains(&VoiceUpdate::Error(VoiceFailure::Network.advisory())));
    }

    #[tokio::test]
    async fn unsupported_language_switches_to_default_once() {
        let settings = VoiceSettings { enabled: true, language: "de-DE".into() };
        let (mut rec, mut rx) = VoiceRecognizer::new(settings, ScriptedStt::new(Ok("x".into())));
        rec.handle(VoiceEvent::Start).await;
        rec.handle(VoiceEvent::Failed(VoiceFailure::LanguageNotSupported)).await;
        assert_eq!(rec.language(), "en-US");
        assert!(drain(&mut rx).contains(&VoiceUpdate::Error(
            "Language not supported. Switched to en-US. Please try again.".into()
        )));

        rec.handle(VoiceEvent::Start).await;
        rec.handle(VoiceEvent::Failed(VoiceFailure::LanguageNotSupported)).await;
        assert!(drain(&mut rx).contains(&VoiceUpdate::Error(VoiceFailure::LanguageNotSupported.advisory())));
    }

    #[tokio::test]
    async fn error_state_can_restart() {
        let (mut rec, _rx) = VoiceRecognizer::new(VoiceSettings::default(), ScriptedStt::new(Ok("x".into())));
        rec.handle(VoiceEvent::Start).await;
        rec.handle(VoiceEvent::Failed(VoiceFailure::AudioCapture)).await;
        assert_eq!(rec.state(), &VoiceState::Error(VoiceFailure::AudioCapture));
        rec.handle(VoiceEvent::Start).await;
        assert_eq!(rec.state(), &VoiceState::Listening);
    }

    #[tokio::test]
    async fn run_drives_from_a_stream() {
        let (rec, rx) = VoiceRecognizer::new(VoiceSettings::default(), ScriptedStt::new(Ok("hi".into())));
        let events = futures::stream::iter(vec![
            VoiceEvent::Start,
            VoiceEvent::AudioChunk(vec![0, 0]),
            VoiceEvent::Stop,
        ]);
        rec.run(events).await;
        let updates: Vec<VoiceUpdate> = rx.collect().await;
        assert_eq!(updates[1], VoiceUpdate::Transcript("hi".into()));
    }

    #[test]
    fn other_failure_names_the_error() {
        assert_eq!(
            VoiceFailure::Other("aborted".into()).advisory(),
            "Speech recognition failed: aborted. Please try refreshing the page."
        );
    }
}
