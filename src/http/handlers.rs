use super::state::AppState;
use crate::audio::{AudioBackendConfig, MicrophoneBackend};
use crate::error::SessionError;
use crate::lang::Language;
use crate::session::{SessionConfig, TranslationSession};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Language being spoken, e.g. "en-US"
    pub source_lang: Language,

    /// Language to translate into, e.g. "hi-IN"
    pub target_lang: Language,
}

#[derive(Debug, Serialize)]
pub struct ReplayResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Start a new translation session, replacing any active one
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    info!(
        "Starting translation session ({} -> {})",
        req.source_lang, req.target_lang
    );

    // Exactly one session at a time: tear down the previous one first,
    // discarding its unflushed state.
    let previous = { state.session.write().await.take() };
    if let Some(previous) = previous {
        info!("Replacing active session {}", previous.config().session_id);
        previous.shutdown().await;
    }

    let mut config = SessionConfig::new(req.source_lang, req.target_lang);
    config.chunk_duration = Duration::from_millis(state.settings.audio.chunk_duration_ms);
    config.settle_delay = Duration::from_millis(state.settings.session.settle_delay_ms);
    config.sample_rate = state.settings.audio.sample_rate;
    config.channels = state.settings.audio.channels;
    config.save_chunks_dir = state.settings.audio.save_chunks_dir.clone().map(PathBuf::from);

    let backend = Box::new(MicrophoneBackend::new(AudioBackendConfig {
        target_sample_rate: config.sample_rate,
        target_channels: config.channels,
        buffer_duration_ms: 100,
    }));

    let session = Arc::new(TranslationSession::new(
        config,
        Arc::clone(&state.client),
        Arc::clone(&state.synthesizer),
    ));

    match session.start(backend).await {
        Ok(()) => {
            let snapshot = session.snapshot().await;
            *state.session.write().await = Some(session);
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        Err(e @ SessionError::DeviceUnavailable(_)) => {
            error!("Failed to start session: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start session: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /session/stop
/// Stop the active session; auto-play follows after the settle delay
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = { state.session.read().await.clone() };

    match session {
        Some(session) => {
            let snapshot = session.stop().await;
            info!("Session {} stopped", snapshot.session_id);
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No active session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /session/replay
/// Speak the translated text again, cancelling any playback in progress
pub async fn replay_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = { state.session.read().await.clone() };

    match session {
        Some(session) => match session.replay().await {
            Ok(()) => (
                StatusCode::OK,
                Json(ReplayResponse {
                    session_id: session.config().session_id.clone(),
                    status: "replaying".to_string(),
                }),
            )
                .into_response(),
            Err(e) => {
                error!("Replay failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response()
            }
        },
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No active session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /session
/// Get state and accumulated text of the active session
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = { state.session.read().await.clone() };

    match session {
        Some(session) => (StatusCode::OK, Json(session.snapshot().await)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No active session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
