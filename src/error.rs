use thiserror::Error;

/// Failures a translation session can surface. All of them are local: none
/// aborts the process, and only `DeviceUnavailable` prevents a session from
/// running at all.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Microphone access was denied or no capture device exists.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A single chunk upload failed; the session continues without it.
    #[error("chunk upload failed: {0}")]
    UploadFailed(#[from] reqwest::Error),

    /// The capture device reported an internal error mid-session.
    #[error("recorder fault: {0}")]
    RecorderFault(String),

    /// Speech synthesis failed.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}
