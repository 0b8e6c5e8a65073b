use serde::{Deserialize, Serialize};

/// Decoded response to one chunk upload
///
/// Endpoints have drifted on the field carrying the recognized text, so the
/// original fragment is taken from the first non-empty of `original`,
/// `transcript`, `source`, `text`, in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TranslationResult {
    /// The recognized source-language fragment, if any.
    pub fn original_fragment(&self) -> Option<&str> {
        [&self.original, &self.transcript, &self.source, &self.text]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|fragment| !fragment.is_empty())
    }

    /// The translated fragment, if any.
    pub fn translation_fragment(&self) -> Option<&str> {
        self.translation.as_deref().filter(|t| !t.is_empty())
    }

    /// The human-readable note, if any.
    pub fn note(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }
}
