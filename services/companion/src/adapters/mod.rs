//! services/companion/src/adapters/mod.rs
//!
//! Implementations of the core ports against OpenAI and the local filesystem.

use std::future::Future;
use std::time::Duration;

use mendi_core::ports::{PortError, PortResult};

pub mod chat_llm;
pub mod emotion_llm;
pub mod sst;
pub mod store_json;
pub mod tts;

pub use chat_llm::OpenAiChatAdapter;
pub use emotion_llm::OpenAiEmotionAdapter;
pub use sst::OpenAiSstAdapter;
pub use store_json::JsonFileStore;
pub use tts::OpenAiTtsAdapter;

/// Bounds a remote call; an elapsed limit becomes `PortError::Timeout`.
pub(crate) async fn with_timeout<T, F>(limit: Duration, call: F) -> PortResult<T>
where
    F: Future<Output = PortResult<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| PortError::Timeout(limit.as_secs()))?
}
