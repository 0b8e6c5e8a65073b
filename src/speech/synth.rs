use anyhow::{Context, Result};
use tracing::debug;
use tts::Tts;

use crate::lang::Language;

/// Speech synthesis seam
///
/// The session controller only ever talks to this trait; tests substitute a
/// recording fake for the OS synthesizer.
pub trait SpeechSynthesizer: Send {
    /// Speak `text` in `language`, cancelling any in-progress utterance
    /// first.
    fn speak(&mut self, text: &str, language: Language) -> Result<()>;

    /// Cancel all queued and in-progress utterances.
    fn cancel_all(&mut self) -> Result<()>;
}

/// System speech synthesizer backed by the platform TTS engine
pub struct SystemSynthesizer {
    tts: Tts,
}

impl SystemSynthesizer {
    pub fn new() -> Result<Self> {
        let tts = Tts::default().context("Failed to initialize system speech synthesis")?;
        Ok(Self { tts })
    }

    /// Best-effort voice selection: pick a voice whose language starts with
    /// the target's two-letter code, or keep the current voice.
    fn select_voice(&mut self, language: Language) {
        let Ok(voices) = self.tts.voices() else {
            return;
        };

        let code = language.short_code();
        let matching = voices
            .iter()
            .find(|voice| voice.language().to_string().to_ascii_lowercase().starts_with(code));

        if let Some(voice) = matching {
            if let Err(e) = self.tts.set_voice(voice) {
                debug!("Voice selection for {} failed: {}", language, e);
            }
        }
    }
}

impl SpeechSynthesizer for SystemSynthesizer {
    fn speak(&mut self, text: &str, language: Language) -> Result<()> {
        self.select_voice(language);

        // interrupt=true replaces whatever is currently being spoken
        self.tts
            .speak(text, true)
            .map(|_| ())
            .context("Speech synthesis failed")
    }

    fn cancel_all(&mut self) -> Result<()> {
        self.tts
            .stop()
            .map(|_| ())
            .context("Failed to cancel speech playback")
    }
}
