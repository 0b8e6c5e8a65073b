use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::session::TranslationSession;
use crate::speech::{self, SharedSynthesizer, SpeechSynthesizer};
use crate::translate::TranslateClient;

/// Shared application state for HTTP handlers
///
/// Holds at most one session: starting a new recording tears down and
/// replaces whatever was active before.
#[derive(Clone)]
pub struct AppState {
    /// The active translation session, if any
    pub session: Arc<RwLock<Option<Arc<TranslationSession>>>>,
    /// Client for the remote translation endpoint
    pub client: Arc<TranslateClient>,
    /// Process-wide speech synthesizer
    pub synthesizer: SharedSynthesizer,
    /// Service configuration
    pub settings: Arc<Config>,
}

impl AppState {
    pub fn new(settings: Config, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        let client = Arc::new(TranslateClient::new(settings.endpoint.base_url.clone()));

        Self {
            session: Arc::new(RwLock::new(None)),
            client,
            synthesizer: speech::shared(synthesizer),
            settings: Arc::new(settings),
        }
    }
}
