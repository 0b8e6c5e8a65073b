//! Speech synthesis
//!
//! The synthesizer is one global playback resource: every playback call
//! cancels whatever is currently being spoken, so two utterances never
//! overlap.

mod synth;

pub use synth::{SpeechSynthesizer, SystemSynthesizer};

use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the process-wide synthesizer.
pub type SharedSynthesizer = Arc<Mutex<Box<dyn SpeechSynthesizer>>>;

pub fn shared(synthesizer: Box<dyn SpeechSynthesizer>) -> SharedSynthesizer {
    Arc::new(Mutex::new(synthesizer))
}
