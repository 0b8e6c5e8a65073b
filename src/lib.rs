pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod lang;
pub mod session;
pub mod speech;
pub mod translate;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioChunk, AudioFrame, ChunkAssembler, ChunkConfig,
    MicrophoneBackend,
};
pub use config::Config;
pub use error::SessionError;
pub use http::{create_router, AppState};
pub use lang::Language;
pub use session::{
    SessionConfig, SessionSnapshot, SessionState, SessionStatus, TranslationSession,
    NETWORK_ERROR_NOTE,
};
pub use speech::{SharedSynthesizer, SpeechSynthesizer, SystemSynthesizer};
pub use translate::{TranslateClient, TranslationResult, UPLOAD_FILE_NAME};
