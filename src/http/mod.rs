//! HTTP API for driving the translator from a browser or desktop shell
//!
//! This module provides a REST API for controlling the one active session:
//! - POST /session/start - Start recording and translating
//! - POST /session/stop - Stop recording (auto-play follows the settle delay)
//! - POST /session/replay - Speak the translated text again
//! - GET /session - Query session state and accumulated text
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
