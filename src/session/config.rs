use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::lang::Language;

/// Configuration for a translation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Language being spoken into the microphone
    pub source_language: Language,

    /// Language the endpoint translates into
    pub target_language: Language,

    /// Duration of each upload chunk
    /// Default: 3 seconds
    pub chunk_duration: Duration,

    /// Pause after stopping capture before auto-playback, letting in-flight
    /// chunk responses land
    /// Default: 350 milliseconds
    pub settle_delay: Duration,

    /// Capture sample rate
    pub sample_rate: u32,

    /// Number of capture channels (1 = mono)
    pub channels: u16,

    /// Mirror encoded chunks to this directory for debugging
    pub save_chunks_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(source_language: Language, target_language: Language) -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            source_language,
            target_language,
            chunk_duration: Duration::from_millis(3000),
            settle_delay: Duration::from_millis(350),
            sample_rate: 16000,
            channels: 1,
            save_chunks_dir: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        // The endpoint's own defaults: English in, Hindi out
        Self::new(Language::English, Language::Hindi)
    }
}
