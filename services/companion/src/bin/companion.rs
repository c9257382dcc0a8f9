//! services/companion/src/bin/companion.rs

use std::sync::Arc;

use async_openai::{config::OpenAIConfig, types::audio::SpeechModel, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use companion_lib::{
    adapters::{
        tts::parse_voice, JsonFileStore, OpenAiChatAdapter, OpenAiEmotionAdapter, OpenAiSstAdapter,
        OpenAiTtsAdapter,
    },
    config::{Config, ConfigError},
    error::ApiError,
    web::{router, ApiDoc, AppState, RemoteServices},
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Recordings are raw PCM16, so allow a few minutes of audio per request.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

fn remote_services(config: &Config) -> Result<RemoteServices, ApiError> {
    let Some(api_key) = config.openai_api_key.as_deref().filter(|_| config.remote_enabled()) else {
        warn!("No AI provider configured; running with local analysis and templated replies");
        return Ok(RemoteServices::default());
    };

    let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
    let timeout = config.llm_timeout;
    let voice = parse_voice(&config.tts_voice)?;

    info!(model = %config.chat_model, "Using OpenAI for replies and emotion analysis");
    Ok(RemoteServices {
        chat: Some(Arc::new(OpenAiChatAdapter::new(openai_client.clone(), timeout))),
        emotion: Some(Arc::new(OpenAiEmotionAdapter::new(
            openai_client.clone(),
            config.emotion_model.clone(),
            timeout,
        ))),
        stt: Some(Arc::new(OpenAiSstAdapter::new(
            openai_client.clone(),
            config.sst_model.clone(),
            timeout,
        ))),
        tts: Some(Arc::new(OpenAiTtsAdapter::new(
            openai_client,
            SpeechModel::Tts1Hd,
            voice,
            timeout,
        ))),
    })
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Store & Initialize Service Adapters ---
    let store = Arc::new(JsonFileStore::open(&config.data_dir).await?);
    let remote = remote_services(&config)?;

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), store, remote));

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|_| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), config.cors_origin.clone())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = router(app_state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors);

    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
