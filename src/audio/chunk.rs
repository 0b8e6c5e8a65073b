use anyhow::{Context, Result};
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use super::backend::AudioFrame;

/// Chunk assembly configuration
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Session ID (used for mirrored chunk filenames)
    pub session_id: String,
    /// Duration of each chunk (default: 3 seconds)
    pub chunk_duration: Duration,
    /// Mirror encoded chunks to this directory for debugging
    pub save_dir: Option<PathBuf>,
}

impl ChunkConfig {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            chunk_duration: Duration::from_millis(3000),
            save_dir: None,
        }
    }
}

/// One encoded upload chunk
///
/// Exists only between assembly and upload; the optional debug mirror is the
/// sole place chunk bytes ever touch disk.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Chunk number (0-indexed)
    pub index: usize,
    /// Encoded WAV payload
    pub bytes: Vec<u8>,
    /// Start time in milliseconds since capture started
    pub start_ms: u64,
    /// End time in milliseconds since capture started
    pub end_ms: u64,
    /// Number of samples in this chunk
    pub sample_count: usize,
    /// Sample rate
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

/// Slices a frame stream into fixed-duration encoded chunks
///
/// Receives audio frames and rotates every `chunk_duration`; each completed
/// window comes back as an in-memory WAV payload. Windows with no samples
/// produce nothing.
pub struct ChunkAssembler {
    config: ChunkConfig,
    current: Option<PendingChunk>,
    chunk_index: usize,
}

impl ChunkAssembler {
    pub fn new(config: ChunkConfig) -> Self {
        debug!(
            "Chunk assembler initialized: {} ({}ms windows)",
            config.session_id,
            config.chunk_duration.as_millis()
        );

        Self {
            config,
            current: None,
            chunk_index: 0,
        }
    }

    /// Feed one frame; returns the completed chunk when this frame crosses a
    /// window boundary.
    pub fn push_frame(&mut self, frame: &AudioFrame) -> Result<Option<AudioChunk>> {
        let mut completed = None;

        if self.should_start_new_chunk(frame) {
            completed = self.finish_current()?;
            self.current = Some(PendingChunk::start(self.chunk_index, frame));
            self.chunk_index += 1;
        }

        if let Some(current) = &mut self.current {
            current.write_frame(frame);
        }

        Ok(completed)
    }

    /// Finish the partial window, as when capture stops mid-chunk.
    pub fn flush(&mut self) -> Result<Option<AudioChunk>> {
        self.finish_current()
    }

    fn should_start_new_chunk(&self, frame: &AudioFrame) -> bool {
        match &self.current {
            None => true,
            Some(current) => {
                let chunk_duration_ms = self.config.chunk_duration.as_millis() as u64;
                let elapsed_ms = frame.timestamp_ms.saturating_sub(current.start_ms);
                elapsed_ms >= chunk_duration_ms
            }
        }
    }

    fn finish_current(&mut self) -> Result<Option<AudioChunk>> {
        let Some(pending) = self.current.take() else {
            return Ok(None);
        };
        if pending.samples.is_empty() {
            return Ok(None);
        }

        let bytes = encode_wav(&pending.samples, pending.sample_rate, pending.channels)?;

        let chunk = AudioChunk {
            index: pending.index,
            start_ms: pending.start_ms,
            end_ms: pending.end_ms,
            sample_count: pending.samples.len(),
            sample_rate: pending.sample_rate,
            channels: pending.channels,
            bytes,
        };

        debug!(
            "Chunk {} complete: {:.1}s - {:.1}s ({} samples)",
            chunk.index,
            chunk.start_ms as f64 / 1000.0,
            chunk.end_ms as f64 / 1000.0,
            chunk.sample_count
        );

        if let Some(dir) = &self.config.save_dir {
            let path = dir.join(format!(
                "{}-chunk-{:03}.wav",
                self.config.session_id, chunk.index
            ));
            if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, &chunk.bytes))
            {
                warn!("Failed to mirror chunk to {:?}: {}", path, e);
            }
        }

        Ok(Some(chunk))
    }
}

/// Samples accumulated for the window currently being filled
struct PendingChunk {
    index: usize,
    start_ms: u64,
    end_ms: u64,
    sample_rate: u32,
    channels: u16,
    samples: Vec<i16>,
}

impl PendingChunk {
    fn start(index: usize, frame: &AudioFrame) -> Self {
        Self {
            index,
            start_ms: frame.timestamp_ms,
            end_ms: frame.timestamp_ms,
            sample_rate: frame.sample_rate,
            channels: frame.channels,
            samples: Vec::new(),
        }
    }

    fn write_frame(&mut self, frame: &AudioFrame) {
        self.samples.extend_from_slice(&frame.samples);
        self.end_ms = frame.timestamp_ms;
    }
}

/// Encode 16-bit PCM samples as an in-memory WAV payload.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer =
            hound::WavWriter::new(cursor, spec).context("Failed to create WAV writer")?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .context("Failed to write sample to WAV chunk")?;
        }
        writer.finalize().context("Failed to finalize WAV chunk")?;
    }

    Ok(bytes)
}
