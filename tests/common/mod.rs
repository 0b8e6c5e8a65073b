// Shared fixtures for integration tests: channel-fed audio backends, a
// recording speech synthesizer, and an in-process mock of the
// transcribe-and-translate endpoint.
#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::extract::{Multipart, State};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use care_translate::{AudioBackend, AudioChunk, AudioFrame, ChunkAssembler, ChunkConfig, Language, SpeechSynthesizer};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Audio fixtures
// ============================================================================

/// 100ms of mono 16kHz audio at the given timestamp.
pub fn frame_at(timestamp_ms: u64) -> AudioFrame {
    AudioFrame {
        samples: vec![250i16; 1600],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms,
    }
}

/// One small encoded chunk, for client tests.
pub fn sample_chunk() -> AudioChunk {
    let mut assembler = ChunkAssembler::new(ChunkConfig::new("test-session".to_string()));
    for i in 0..5 {
        assembler
            .push_frame(&frame_at(i * 100))
            .expect("push frame");
    }
    assembler.flush().expect("flush").expect("chunk")
}

/// Audio backend fed by the test through a channel handle. Dropping the
/// sender while the session records simulates a capture fault.
pub struct PushBackend {
    rx: Option<mpsc::Receiver<AudioFrame>>,
    capturing: bool,
}

pub fn push_backend() -> (mpsc::Sender<AudioFrame>, PushBackend) {
    let (tx, rx) = mpsc::channel(256);
    (
        tx,
        PushBackend {
            rx: Some(rx),
            capturing: false,
        },
    )
}

#[async_trait::async_trait]
impl AudioBackend for PushBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let rx = self.rx.take().context("Backend already started")?;
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "push"
    }
}

/// Backend that refuses to start, as when microphone access is denied.
pub struct DeniedBackend;

#[async_trait::async_trait]
impl AudioBackend for DeniedBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        anyhow::bail!("Microphone access denied")
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "denied"
    }
}

// ============================================================================
// Speech fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthCall {
    Speak(String),
    Cancel,
}

/// Synthesizer that records calls instead of producing audio.
#[derive(Clone, Default)]
pub struct RecordingSynthesizer {
    calls: Arc<Mutex<Vec<SynthCall>>>,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SynthCall::Speak(text) => Some(text),
                SynthCall::Cancel => None,
            })
            .collect()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&mut self, text: &str, _language: Language) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SynthCall::Speak(text.to_string()));
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(SynthCall::Cancel);
        Ok(())
    }
}

// ============================================================================
// Mock translation endpoint
// ============================================================================

/// One scripted reply; the delay lets tests invert response arrival order.
pub struct MockResponse {
    pub delay: Duration,
    pub body: serde_json::Value,
}

impl MockResponse {
    pub fn immediate(body: serde_json::Value) -> Self {
        Self {
            delay: Duration::ZERO,
            body,
        }
    }

    pub fn delayed(delay_ms: u64, body: serde_json::Value) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            body,
        }
    }
}

/// What one upload request actually carried.
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    pub src_lang: String,
    pub tgt_lang: String,
}

#[derive(Clone)]
pub struct MockEndpoint {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
}

impl MockEndpoint {
    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

/// Serve POST /api/transcribe_and_translate on an ephemeral port, answering
/// with the scripted responses in request-arrival order.
pub async fn spawn_mock_endpoint(
    responses: Vec<MockResponse>,
) -> Result<(String, MockEndpoint)> {
    let endpoint = MockEndpoint {
        responses: Arc::new(Mutex::new(responses.into())),
        uploads: Arc::new(Mutex::new(Vec::new())),
    };

    let router = Router::new()
        .route("/api/transcribe_and_translate", post(handle_upload))
        .with_state(endpoint.clone());

    let base_url = spawn_router(router).await?;

    Ok((base_url, endpoint))
}

/// Serve an arbitrary router on an ephemeral port.
pub async fn spawn_router(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock");
    });

    Ok(format!("http://{addr}"))
}

async fn handle_upload(
    State(endpoint): State<MockEndpoint>,
    mut multipart: Multipart,
) -> Json<serde_json::Value> {
    let mut upload = ReceivedUpload::default();

    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.bytes = field.bytes().await.expect("file bytes").to_vec();
            }
            Some("src_lang") => upload.src_lang = field.text().await.expect("src_lang"),
            Some("tgt_lang") => upload.tgt_lang = field.text().await.expect("tgt_lang"),
            _ => {}
        }
    }

    let response = endpoint.responses.lock().unwrap().pop_front();
    endpoint.uploads.lock().unwrap().push(upload);

    match response {
        Some(response) => {
            if !response.delay.is_zero() {
                tokio::time::sleep(response.delay).await;
            }
            Json(response.body)
        }
        None => Json(serde_json::json!({ "translation": "", "notes": "" })),
    }
}
