//! Translation session management
//!
//! This module provides the `TranslationSession` controller that manages:
//! - Audio capture and 3-second chunk assembly
//! - Concurrent, unordered chunk uploads to the translation endpoint
//! - Accumulation of recognized and translated text in arrival order
//! - Auto-playback of the translated text after capture stops
//! - Session state and statistics

mod config;
mod session;
mod state;

pub use config::SessionConfig;
pub use session::TranslationSession;
pub use state::{SessionSnapshot, SessionState, SessionStatus, NETWORK_ERROR_NOTE};
