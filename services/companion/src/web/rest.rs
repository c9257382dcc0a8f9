//! services/companion/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use futures::StreamExt;
use mendi_core::analytics::{conversation_stats, mood_trends};
use mendi_core::crisis::crisis_advisory;
use mendi_core::domain::{Conversation, CrisisCategory, UserPreferences};
use mendi_core::memory::{export_conversation, export_file_name};
use mendi_core::ports::PortError;
use mendi_core::voice::{VoiceEvent, VoiceUpdate, DEFAULT_LANGUAGE};
use mendi_core::{VoiceRecognizer, VoiceSettings};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        chat_handler,
        list_conversations_handler,
        get_conversation_handler,
        delete_conversation_handler,
        star_conversation_handler,
        export_conversation_handler,
        get_user_handler,
        update_preferences_handler,
        mood_handler,
        stats_handler,
        resources_handler,
        transcribe_handler,
        speak_handler,
    ),
    components(
        schemas(ChatBody, ChatResponse, StarResponse, TranscribeResponse, SpeakBody)
    ),
    tags(
        (name = "Mendi API", description = "Endpoints for the emotional-support companion.")
    )
)]
pub struct ApiDoc;

/// Builds the API router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/conversations", get(list_conversations_handler))
        .route(
            "/conversations/{id}",
            get(get_conversation_handler).delete(delete_conversation_handler),
        )
        .route("/conversations/{id}/star", post(star_conversation_handler))
        .route("/conversations/{id}/export", get(export_conversation_handler))
        .route("/user", get(get_user_handler))
        .route("/user/preferences", put(update_preferences_handler))
        .route("/analytics/mood", get(mood_handler))
        .route("/analytics/stats", get(stats_handler))
        .route("/resources", get(resources_handler))
        .route("/voice/transcribe", post(transcribe_handler))
        .route("/voice/speak", post(speak_handler))
        .with_state(state)
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One user message, optionally continuing a stored conversation.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    conversation_id: Option<Uuid>,
    content: String,
}

/// The outcome of a conversational turn.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Absent until the conversation has been saved.
    conversation_id: Option<Uuid>,
    #[schema(value_type = Object)]
    reply: mendi_core::Message,
    #[schema(value_type = Vec<Object>)]
    messages: Vec<mendi_core::Message>,
    #[schema(value_type = Object)]
    crisis: mendi_core::CrisisCheck,
    show_emergency_banner: bool,
    advisory: Option<String>,
    #[schema(value_type = Vec<Object>)]
    resources: Vec<mendi_core::domain::EmergencyResource>,
}

#[derive(Serialize, ToSchema)]
pub struct StarResponse {
    id: Uuid,
    starred: bool,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResourceQuery {
    /// Crisis category, e.g. `suicide` or `self-harm`.
    category: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TranscribeQuery {
    /// BCP 47 tag such as `en-US`.
    language: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    transcript: Option<String>,
    /// The language actually used, which may differ after a fallback.
    language: String,
    error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SpeakBody {
    text: String,
}

//=========================================================================================
// Chat
//=========================================================================================

/// Run one conversational turn.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatBody,
    responses(
        (status = 200, description = "The companion's reply", body = ChatResponse),
        (status = 400, description = "Blank message"),
        (status = 404, description = "Unknown conversation id")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    // One local user and one store document for every conversation, so a single
    // lock serializes the whole load-turn-save sequence.
    let _turn = state.turn_lock.lock().await;

    let user = state.memory.ensure_user(Utc::now()).await?;
    let current = match body.conversation_id {
        Some(id) => Some(
            state
                .memory
                .conversation(id)
                .await?
                .ok_or_else(|| PortError::NotFound(format!("Conversation {}", id)))?,
        ),
        None => None,
    };
    let history = current.as_ref().map(|c| c.messages.clone()).unwrap_or_default();

    let outcome = state.pipeline.handle_turn(&history, &body.content, Some(&user)).await?;

    let now = Utc::now();
    let saved = if user.preferences.auto_save {
        state.memory.auto_save(current, &outcome.messages, now).await?
    } else {
        current
    };
    state.memory.update_user_profile(&outcome.messages, now).await?;

    let advisory = outcome.crisis.detected.then(|| crisis_advisory(outcome.crisis.severity));
    Ok(Json(ChatResponse {
        conversation_id: saved.map(|c| c.id),
        reply: outcome.reply,
        messages: outcome.messages,
        crisis: outcome.crisis,
        show_emergency_banner: outcome.show_emergency_banner,
        advisory,
        resources: outcome.resources,
    }))
}

//=========================================================================================
// Conversations
//=========================================================================================

/// List stored conversations, most recently updated first.
#[utoipa::path(
    get,
    path = "/conversations",
    responses((status = 200, description = "All conversations", body = serde_json::Value))
)]
pub async fn list_conversations_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let mut conversations = state.memory.conversations().await?;
    conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(Json(conversations))
}

async fn find_conversation(state: &AppState, id: Uuid) -> Result<Conversation, ApiError> {
    state
        .memory
        .conversation(id)
        .await?
        .ok_or_else(|| PortError::NotFound(format!("Conversation {}", id)).into())
}

#[utoipa::path(
    get,
    path = "/conversations/{id}",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "The conversation", body = serde_json::Value),
        (status = 404, description = "Unknown conversation id")
    )
)]
pub async fn get_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(find_conversation(&state, id).await?))
}

#[utoipa::path(
    delete,
    path = "/conversations/{id}",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown conversation id")
    )
)]
pub async fn delete_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.memory.delete_conversation(id).await? {
        return Err(PortError::NotFound(format!("Conversation {}", id)).into());
    }
    info!(%id, "Conversation deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the starred flag.
#[utoipa::path(
    post,
    path = "/conversations/{id}/star",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "The new flag", body = StarResponse),
        (status = 404, description = "Unknown conversation id")
    )
)]
pub async fn star_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StarResponse>, ApiError> {
    let current = find_conversation(&state, id).await?;
    let updated = state.memory.set_starred(id, !current.starred).await?;
    Ok(Json(StarResponse {
        id,
        starred: updated.starred,
    }))
}

/// Download a conversation as a JSON attachment.
#[utoipa::path(
    get,
    path = "/conversations/{id}/export",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "The export document", body = serde_json::Value),
        (status = 404, description = "Unknown conversation id")
    )
)]
pub async fn export_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = find_conversation(&state, id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&conversation.title)
    );
    Ok((
        [(header::CONTENT_DISPOSITION, disposition)],
        Json(export_conversation(&conversation)),
    ))
}

//=========================================================================================
// User
//=========================================================================================

#[utoipa::path(
    get,
    path = "/user",
    responses((status = 200, description = "The local user, created on first use", body = serde_json::Value))
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<mendi_core::User>, ApiError> {
    Ok(Json(state.memory.ensure_user(Utc::now()).await?))
}

#[utoipa::path(
    put,
    path = "/user/preferences",
    request_body = serde_json::Value,
    responses((status = 200, description = "The updated user", body = serde_json::Value))
)]
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    Json(preferences): Json<UserPreferences>,
) -> Result<Json<mendi_core::User>, ApiError> {
    let now = Utc::now();
    let mut user = state.memory.ensure_user(now).await?;
    user.preferences = preferences;
    user.updated_at = now;
    state.memory.save_user(&user).await?;
    Ok(Json(user))
}

//=========================================================================================
// Analytics and Resources
//=========================================================================================

/// One mood point per analyzed user message, oldest first.
#[utoipa::path(
    get,
    path = "/analytics/mood",
    responses((status = 200, description = "Mood trend points", body = serde_json::Value))
)]
pub async fn mood_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<mendi_core::domain::MoodTrend>>, ApiError> {
    Ok(Json(mood_trends(&state.memory.conversations().await?)))
}

#[utoipa::path(
    get,
    path = "/analytics/stats",
    responses((status = 200, description = "Conversation statistics", body = serde_json::Value))
)]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<mendi_core::domain::ConversationStats>, ApiError> {
    let conversations = state.memory.conversations().await?;
    Ok(Json(conversation_stats(&conversations, Utc::now())))
}

#[utoipa::path(
    get,
    path = "/resources",
    params(ResourceQuery),
    responses(
        (status = 200, description = "Emergency resources", body = serde_json::Value),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn resources_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<mendi_core::domain::EmergencyResource>>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<CrisisCategory>)
        .transpose()
        .map_err(PortError::InvalidInput)?;
    Ok(Json(state.pipeline.detector().emergency_resources(category)))
}

//=========================================================================================
// Voice
//=========================================================================================

/// Transcribe one recording of raw mono PCM16.
#[utoipa::path(
    post,
    path = "/voice/transcribe",
    params(TranscribeQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Raw PCM16 audio."),
    responses(
        (status = 200, description = "The transcript or an advisory", body = TranscribeResponse),
        (status = 503, description = "Speech-to-text is not configured")
    )
)]
pub async fn transcribe_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscribeQuery>,
    audio: Bytes,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let stt = state
        .stt
        .clone()
        .ok_or_else(|| ApiError::Unavailable("speech-to-text is not configured".to_string()))?;
    let user = state.memory.ensure_user(Utc::now()).await?;

    let settings = VoiceSettings {
        enabled: user.preferences.voice_enabled,
        language: query.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
    };
    let (mut recognizer, updates) = VoiceRecognizer::new(settings, stt);
    recognizer.handle(VoiceEvent::Start).await;
    recognizer.handle(VoiceEvent::AudioChunk(audio.to_vec())).await;
    recognizer.handle(VoiceEvent::Stop).await;
    let language = recognizer.language().to_string();
    drop(recognizer);

    let mut response = TranscribeResponse {
        transcript: None,
        language,
        error: None,
    };
    let updates: Vec<VoiceUpdate> = updates.collect().await;
    for update in updates {
        match update {
            VoiceUpdate::Transcript(text) => response.transcript = Some(text),
            VoiceUpdate::Error(advisory) => response.error = Some(advisory),
            VoiceUpdate::Started { .. } | VoiceUpdate::Ended => {}
        }
    }
    if let Some(advisory) = &response.error {
        warn!(advisory = %advisory, "Transcription ended with an advisory");
    }
    Ok(Json(response))
}

/// Speak a text aloud; returns the encoded audio.
#[utoipa::path(
    post,
    path = "/voice/speak",
    request_body = SpeakBody,
    responses(
        (status = 200, description = "MP3 audio", body = Vec<u8>, content_type = "audio/mpeg"),
        (status = 503, description = "Text-to-speech is not configured")
    )
)]
pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SpeakBody>,
) -> Result<impl IntoResponse, ApiError> {
    let tts = state
        .tts
        .clone()
        .ok_or_else(|| ApiError::Unavailable("text-to-speech is not configured".to_string()))?;
    let audio = tts.generate_audio(&body.text).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}
