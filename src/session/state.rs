use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lang::Language;
use crate::translate::TranslationResult;

/// Note appended when a chunk upload fails.
pub const NETWORK_ERROR_NOTE: &str = "Network error";

/// Endpoint notes carrying these markers describe undecodable audio; they
/// are logged but never shown to the user.
const SUPPRESSED_NOTE_MARKERS: [&str; 3] = ["corrupt", "unsupported audio", "deepgram error"];

/// Session lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No recording has happened yet
    #[default]
    Idle,
    /// Actively capturing and uploading chunks
    Listening,
    /// Capture finished; text is frozen apart from late chunk responses
    Stopped,
    /// Recording could not start
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Listening => write!(f, "listening"),
            SessionStatus::Stopped => write!(f, "stopped"),
            SessionStatus::Error => write!(f, "error"),
        }
    }
}

/// Accumulated text state for one session
///
/// Text fields are append-only while the session runs; merges happen in
/// arrival order of chunk responses, which is not guaranteed to match the
/// order the words were spoken.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    status: SessionStatus,
    original: String,
    translated: String,
    notes: String,
    last_fault: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all text and enter `Listening`; called when recording starts.
    pub fn reset_for_start(&mut self) {
        self.original.clear();
        self.translated.clear();
        self.notes.clear();
        self.last_fault = None;
        self.status = SessionStatus::Listening;
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Apply one chunk response.
    pub fn merge(&mut self, result: &TranslationResult) {
        if let Some(fragment) = result.original_fragment() {
            append_fragment(&mut self.original, fragment);
        }
        if let Some(fragment) = result.translation_fragment() {
            append_fragment(&mut self.translated, fragment);
        }
        if let Some(note) = result.note() {
            if is_suppressed_note(note) {
                debug!("Suppressed endpoint note: {}", note);
            } else {
                append_fragment(&mut self.notes, note);
            }
        }
    }

    /// Append a note directly (e.g. the network-error marker).
    pub fn push_note(&mut self, note: &str) {
        append_fragment(&mut self.notes, note);
    }

    /// Record a mid-session capture fault. The session is degraded but keeps
    /// its status; it is not auto-terminated.
    pub fn record_fault(&mut self, message: &str) {
        self.last_fault = Some(message.to_string());
    }

    pub fn original_text(&self) -> &str {
        &self.original
    }

    pub fn translated_text(&self) -> &str {
        &self.translated
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn last_fault(&self) -> Option<&str> {
        self.last_fault.as_deref()
    }
}

/// Point-in-time view of a session, served by the control API
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub status: SessionStatus,
    pub is_recording: bool,
    pub source_language: Language,
    pub target_language: Language,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub chunks_uploaded: usize,
    pub original_text: String,
    pub translated_text: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fault: Option<String>,
}

/// Space-join: set directly when the field is empty, append otherwise.
fn append_fragment(field: &mut String, fragment: &str) {
    if field.is_empty() {
        field.push_str(fragment);
    } else {
        field.push(' ');
        field.push_str(fragment);
    }
}

/// Case-insensitive check against the suppressed-note markers.
pub fn is_suppressed_note(note: &str) -> bool {
    let lowered = note.to_lowercase();
    SUPPRESSED_NOTE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
