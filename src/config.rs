use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub endpoint: EndpointConfig,
    pub audio: AudioConfig,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the transcribe-and-translate service.
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Duration of each upload chunk in milliseconds.
    pub chunk_duration_ms: u64,
    /// Mirror encoded chunks to this directory for debugging.
    #[serde(default)]
    pub save_chunks_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    /// Pause after stopping capture, letting in-flight chunk responses land
    /// before auto-playback.
    pub settle_delay_ms: u64,
}

impl Config {
    /// Load configuration: built-in defaults, then an optional file at
    /// `path`, then `CARE_TRANSLATE_*` environment variables (nested keys
    /// separated by `__`, e.g. `CARE_TRANSLATE_ENDPOINT__BASE_URL`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "care-translate")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8787)?
            .set_default("endpoint.base_url", "http://localhost:8000")?
            .set_default("audio.sample_rate", 16000)?
            .set_default("audio.channels", 1)?
            .set_default("audio.chunk_duration_ms", 3000)?
            .set_default("session.settle_delay_ms", 350)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CARE_TRANSLATE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
