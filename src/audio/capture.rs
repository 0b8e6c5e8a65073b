// Microphone capture backend built on cpal.
//
// The cpal stream is !Send, so a dedicated thread owns it for the lifetime
// of the capture and drops it on the way out; that is what releases the
// device on every exit path.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

/// Captures the default input device and forwards mono 16-bit frames.
pub struct MicrophoneBackend {
    config: AudioBackendConfig,
    stop_tx: Option<std::sync::mpsc::Sender<()>>,
    capture_thread: Option<std::thread::JoinHandle<()>>,
    capturing: bool,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            stop_tx: None,
            capture_thread: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.capturing {
            anyhow::bail!("Already capturing");
        }

        let (frame_tx, frame_rx) = mpsc::channel(32);
        let (stop_tx, stop_rx) = std::sync::mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let config = self.config.clone();
        let handle =
            std::thread::spawn(move || capture_thread_main(config, frame_tx, stop_rx, ready_tx));

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => anyhow::bail!("Capture thread exited before reporting readiness"),
        }

        self.stop_tx = Some(stop_tx);
        self.capture_thread = Some(handle);
        self.capturing = true;

        info!("Microphone capture started");

        Ok(frame_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.capturing {
            return Ok(());
        }

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.capture_thread.take() {
            if handle.join().is_err() {
                error!("Capture thread panicked");
            }
        }
        self.capturing = false;

        info!("Microphone capture stopped");

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

impl Drop for MicrophoneBackend {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

fn capture_thread_main(
    config: AudioBackendConfig,
    frame_tx: mpsc::Sender<AudioFrame>,
    stop_rx: std::sync::mpsc::Receiver<()>,
    ready_tx: oneshot::Sender<Result<()>>,
) {
    let (stream, faulted) = match build_input_stream(&config, frame_tx) {
        Ok(built) => built,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(anyhow::Error::new(e).context("Failed to start audio stream")));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    loop {
        match stop_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if faulted.load(Ordering::Relaxed) {
                    warn!("Audio stream reported a fault, ending capture");
                    break;
                }
            }
        }
    }

    drop(stream);
}

fn build_input_stream(
    config: &AudioBackendConfig,
    frame_tx: mpsc::Sender<AudioFrame>,
) -> Result<(cpal::Stream, Arc<AtomicBool>)> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .context("No input device available")?;

    info!(
        "Using audio input device: {}",
        device.name().unwrap_or_else(|_| "unknown".to_string())
    );

    let default_config = device
        .default_input_config()
        .context("Failed to get default input config")?;
    let sample_format = default_config.sample_format();
    let stream_config: cpal::StreamConfig = default_config.into();

    let channels = stream_config.channels as usize;
    let native_rate = stream_config.sample_rate.0;

    let faulted = Arc::new(AtomicBool::new(false));
    let fault_flag = Arc::clone(&faulted);
    let err_fn = move |err: cpal::StreamError| {
        error!("Audio stream error: {err}");
        fault_flag.store(true, Ordering::Relaxed);
    };

    let forwarder = FrameForwarder::new(
        frame_tx,
        native_rate,
        config.target_sample_rate,
        channels,
        config.buffer_duration_ms,
    );

    let stream = match sample_format {
        SampleFormat::F32 => {
            let mut forwarder = forwarder;
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| forwarder.push_f32(data),
                err_fn,
                None,
            )
        }
        SampleFormat::I16 => {
            let mut forwarder = forwarder;
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| forwarder.push_i16(data),
                err_fn,
                None,
            )
        }
        other => anyhow::bail!("Unsupported input sample format: {other:?}"),
    }
    .context("Failed to build input stream (microphone access may be denied)")?;

    Ok((stream, faulted))
}

/// Converts interleaved device samples to mono i16, decimates to the target
/// rate, and emits fixed-duration frames.
struct FrameForwarder {
    tx: mpsc::Sender<AudioFrame>,
    channels: usize,
    decimate: usize,
    phase: usize,
    effective_rate: u32,
    samples_per_frame: usize,
    pending: Vec<i16>,
    sent_samples: u64,
}

impl FrameForwarder {
    fn new(
        tx: mpsc::Sender<AudioFrame>,
        native_rate: u32,
        target_rate: u32,
        channels: usize,
        buffer_duration_ms: u64,
    ) -> Self {
        // Decimation only; upsampling is never worth it for speech.
        let decimate = if target_rate > 0 && native_rate > target_rate {
            (native_rate / target_rate).max(1) as usize
        } else {
            1
        };
        let effective_rate = native_rate / decimate as u32;
        let samples_per_frame =
            ((effective_rate as u64 * buffer_duration_ms) / 1000).max(1) as usize;

        Self {
            tx,
            channels: channels.max(1),
            decimate,
            phase: 0,
            effective_rate,
            samples_per_frame,
            pending: Vec::new(),
            sent_samples: 0,
        }
    }

    fn push_f32(&mut self, data: &[f32]) {
        for frame in data.chunks(self.channels) {
            if self.phase == 0 {
                let sum: f32 = frame.iter().sum();
                let mono = sum / frame.len() as f32;
                self.pending
                    .push((mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
            }
            self.phase = (self.phase + 1) % self.decimate;
        }
        self.drain();
    }

    fn push_i16(&mut self, data: &[i16]) {
        for frame in data.chunks(self.channels) {
            if self.phase == 0 {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                let mono = (sum / frame.len() as i32).clamp(i16::MIN as i32, i16::MAX as i32);
                self.pending.push(mono as i16);
            }
            self.phase = (self.phase + 1) % self.decimate;
        }
        self.drain();
    }

    fn drain(&mut self) {
        while self.pending.len() >= self.samples_per_frame {
            let samples: Vec<i16> = self.pending.drain(..self.samples_per_frame).collect();
            let timestamp_ms = self.sent_samples * 1000 / self.effective_rate as u64;
            self.sent_samples += samples.len() as u64;

            let frame = AudioFrame {
                samples,
                sample_rate: self.effective_rate,
                channels: 1,
                timestamp_ms,
            };

            // Never block the audio callback; drop the frame if the
            // receiver lags.
            let _ = self.tx.try_send(frame);
        }
    }
}
