use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::state::{SessionSnapshot, SessionState, SessionStatus, NETWORK_ERROR_NOTE};
use crate::audio::{AudioBackend, AudioChunk, AudioFrame, ChunkAssembler, ChunkConfig};
use crate::error::SessionError;
use crate::lang::Language;
use crate::speech::SharedSynthesizer;
use crate::translate::{TranslateClient, TranslationResult};

/// Event produced by one finished chunk upload, consumed by the reducer
enum MergeEvent {
    Translation(TranslationResult),
    UploadFailed,
}

/// A translation session: capture, chunk uploads, text accumulation, and
/// playback of the translated result
///
/// Chunk uploads are fire-and-forget and unordered; a single reducer task is
/// the only writer of the accumulated text, applying responses strictly in
/// arrival order. Stopping cancels only the capture cadence; uploads already
/// in flight complete and still merge during the settle window.
pub struct TranslationSession {
    config: SessionConfig,
    uploader: Uploader,
    synthesizer: SharedSynthesizer,
    state: Arc<Mutex<SessionState>>,
    is_recording: Arc<AtomicBool>,
    autoplay_armed: Arc<AtomicBool>,
    chunks_uploaded: Arc<AtomicUsize>,
    started_at: DateTime<Utc>,
    stop_signal: Arc<Notify>,
    pump_task: Mutex<Option<JoinHandle<()>>>,
}

impl TranslationSession {
    /// Create a session and spawn its reducer. Must be called inside a tokio
    /// runtime.
    pub fn new(
        config: SessionConfig,
        client: Arc<TranslateClient>,
        synthesizer: SharedSynthesizer,
    ) -> Self {
        info!("Creating translation session: {}", config.session_id);

        let state = Arc::new(Mutex::new(SessionState::new()));
        let (merge_tx, mut merge_rx) = mpsc::channel::<MergeEvent>(64);

        // Single-writer reducer: responses mutate text in arrival order,
        // whatever order their uploads were dispatched in.
        let reducer_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = merge_rx.recv().await {
                let mut state = reducer_state.lock().await;
                match event {
                    MergeEvent::Translation(result) => state.merge(&result),
                    MergeEvent::UploadFailed => state.push_note(NETWORK_ERROR_NOTE),
                }
            }
        });

        let chunks_uploaded = Arc::new(AtomicUsize::new(0));
        let uploader = Uploader {
            client,
            merge_tx,
            source: config.source_language,
            target: config.target_language,
            chunks_uploaded: Arc::clone(&chunks_uploaded),
        };

        Self {
            config,
            uploader,
            synthesizer,
            state,
            is_recording: Arc::new(AtomicBool::new(false)),
            autoplay_armed: Arc::new(AtomicBool::new(false)),
            chunks_uploaded,
            started_at: Utc::now(),
            stop_signal: Arc::new(Notify::new()),
            pump_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start recording
    ///
    /// Resets all accumulated text, arms the one-shot auto-play right, and
    /// acquires the capture device through `backend`. On failure the session
    /// ends up in `Error` with `is_recording == false` and no chunk cadence
    /// running.
    pub async fn start(&self, mut backend: Box<dyn AudioBackend>) -> Result<(), SessionError> {
        if self.is_recording.swap(true, Ordering::SeqCst) {
            warn!("Session {} is already recording", self.config.session_id);
            return Ok(());
        }

        info!("Starting translation session: {}", self.config.session_id);

        self.state.lock().await.reset_for_start();
        self.autoplay_armed.store(true, Ordering::SeqCst);

        let frames = match backend.start().await {
            Ok(rx) => rx,
            Err(e) => {
                error!("Failed to start audio capture: {e:#}");
                self.is_recording.store(false, Ordering::SeqCst);
                self.state.lock().await.set_status(SessionStatus::Error);
                return Err(SessionError::DeviceUnavailable(e.to_string()));
            }
        };

        let assembler = ChunkAssembler::new(ChunkConfig {
            session_id: self.config.session_id.clone(),
            chunk_duration: self.config.chunk_duration,
            save_dir: self.config.save_chunks_dir.clone(),
        });

        let uploader = self.uploader.clone();
        let is_recording = Arc::clone(&self.is_recording);
        let state = Arc::clone(&self.state);
        let stop_signal = Arc::clone(&self.stop_signal);

        let pump = tokio::spawn(async move {
            let mut backend = backend;
            let mut frames = frames;
            let mut assembler = assembler;

            debug!("Audio pump task started");

            loop {
                tokio::select! {
                    // Frames first: queued audio is never dropped by a stop
                    biased;
                    maybe_frame = frames.recv() => match maybe_frame {
                        Some(frame) => feed_frame(&mut assembler, &uploader, &frame),
                        None => {
                            if is_recording.load(Ordering::SeqCst) {
                                warn!("Audio stream ended while recording");
                                state
                                    .lock()
                                    .await
                                    .record_fault("audio stream ended unexpectedly");
                            }
                            break;
                        }
                    },
                    _ = stop_signal.notified() => {
                        // Take whatever the device already produced before
                        // flushing the final window
                        while let Ok(frame) = frames.try_recv() {
                            feed_frame(&mut assembler, &uploader, &frame);
                        }
                        break;
                    }
                }
            }

            // The capture device hands over its remainder when stopped; the
            // partial window still goes out as a final chunk.
            match assembler.flush() {
                Ok(Some(chunk)) => uploader.dispatch(chunk),
                Ok(None) => {}
                Err(e) => warn!("Failed to encode final chunk: {e}"),
            }

            if let Err(e) = backend.stop().await {
                error!("Failed to stop audio backend: {e}");
            }

            debug!("Audio pump task stopped");
        });

        *self.pump_task.lock().await = Some(pump);

        info!("Translation session started: {}", self.config.session_id);

        Ok(())
    }

    /// Stop recording
    ///
    /// Releases the capture device and schedules the one-shot auto-play
    /// check after the settle delay. Uploads already in flight are left to
    /// finish and may still merge text afterwards.
    pub async fn stop(&self) -> SessionSnapshot {
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            warn!("Session {} is not recording", self.config.session_id);
            return self.snapshot().await;
        }

        info!("Stopping translation session: {}", self.config.session_id);

        self.stop_signal.notify_one();
        if let Some(task) = self.pump_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("Audio pump task panicked: {e}");
            }
        }

        self.state.lock().await.set_status(SessionStatus::Stopped);
        self.spawn_settle_task();

        info!("Translation session stopped: {}", self.config.session_id);

        self.snapshot().await
    }

    /// Speak the current translated text, cancelling any playback already in
    /// progress. Independent of the one-shot auto-play right.
    pub async fn replay(&self) -> Result<(), SessionError> {
        let text = self.state.lock().await.translated_text().to_string();

        let mut synthesizer = self.synthesizer.lock().await;
        synthesizer
            .cancel_all()
            .map_err(|e| SessionError::Synthesis(e.to_string()))?;

        if text.is_empty() {
            debug!("Replay requested with no translated text");
            return Ok(());
        }

        synthesizer
            .speak(&text, self.config.target_language)
            .map_err(|e| SessionError::Synthesis(e.to_string()))
    }

    /// Teardown: release the device and disarm auto-play without ever
    /// speaking. Used when a new session replaces this one.
    pub async fn shutdown(&self) {
        self.autoplay_armed.store(false, Ordering::SeqCst);

        if self.is_recording.swap(false, Ordering::SeqCst) {
            self.stop_signal.notify_one();
        }
        if let Some(task) = self.pump_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("Audio pump task panicked: {e}");
            }
        }

        info!("Translation session torn down: {}", self.config.session_id);
    }

    /// Get a point-in-time view of the session
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            status: state.status(),
            is_recording: self.is_recording.load(Ordering::SeqCst),
            source_language: self.config.source_language,
            target_language: self.config.target_language,
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            chunks_uploaded: self.chunks_uploaded.load(Ordering::SeqCst),
            original_text: state.original_text().to_string(),
            translated_text: state.translated_text().to_string(),
            notes: state.notes().to_string(),
            last_fault: state.last_fault().map(str::to_string),
        }
    }

    /// One-shot deferred auto-play: wait out the settle delay, then speak the
    /// translated text if the right is still armed and there is anything to
    /// say.
    fn spawn_settle_task(&self) {
        let state = Arc::clone(&self.state);
        let armed = Arc::clone(&self.autoplay_armed);
        let synthesizer = Arc::clone(&self.synthesizer);
        let delay = self.config.settle_delay;
        let language = self.config.target_language;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let text = state.lock().await.translated_text().to_string();
            if text.is_empty() {
                debug!("No translated text after settle delay, skipping auto-play");
                return;
            }
            if !armed.swap(false, Ordering::SeqCst) {
                return;
            }

            let mut synthesizer = synthesizer.lock().await;
            if let Err(e) = synthesizer.speak(&text, language) {
                warn!("Auto-play failed: {e}");
            }
        });
    }
}

/// Run one frame through the assembler, dispatching a completed window.
fn feed_frame(assembler: &mut ChunkAssembler, uploader: &Uploader, frame: &AudioFrame) {
    if frame.samples.is_empty() {
        return;
    }
    match assembler.push_frame(frame) {
        Ok(Some(chunk)) => uploader.dispatch(chunk),
        Ok(None) => {}
        Err(e) => warn!("Failed to encode chunk: {e}"),
    }
}

/// Everything an upload task needs, cloned per chunk
#[derive(Clone)]
struct Uploader {
    client: Arc<TranslateClient>,
    merge_tx: mpsc::Sender<MergeEvent>,
    source: Language,
    target: Language,
    chunks_uploaded: Arc<AtomicUsize>,
}

impl Uploader {
    /// Submit one chunk without waiting on any other upload. Failures become
    /// a note; nothing is retried and the session keeps running.
    fn dispatch(&self, chunk: AudioChunk) {
        let client = Arc::clone(&self.client);
        let merge_tx = self.merge_tx.clone();
        let source = self.source;
        let target = self.target;
        let index = chunk.index;

        self.chunks_uploaded.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            let event = match client.translate_chunk(chunk, source, target).await {
                Ok(result) => MergeEvent::Translation(result),
                Err(e) => {
                    warn!("Chunk {index} upload failed: {e}");
                    MergeEvent::UploadFailed
                }
            };

            // The reducer only goes away with the session itself.
            let _ = merge_tx.send(event).await;
        });
    }
}
