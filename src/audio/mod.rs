pub mod backend;
pub mod capture;
pub mod chunk;

pub use backend::{AudioBackend, AudioBackendConfig, AudioFrame};
pub use capture::MicrophoneBackend;
pub use chunk::{AudioChunk, ChunkAssembler, ChunkConfig};
