use serde::{Deserialize, Serialize};

/// Languages supported by the translation endpoint.
///
/// Each carries a full language+region tag; the endpoint receives the
/// two-letter form produced by [`Language::short_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US", alias = "en", alias = "english", alias = "English")]
    English,
    #[serde(rename = "hi-IN", alias = "hi", alias = "hindi", alias = "Hindi")]
    Hindi,
    #[serde(rename = "es-ES", alias = "es", alias = "spanish", alias = "Spanish")]
    Spanish,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Spanish];

    /// Full language tag, e.g. `en-US`.
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Spanish => "es-ES",
        }
    }

    /// Wire form: the tag truncated at its first hyphen.
    pub fn short_code(self) -> &'static str {
        match self.tag().split_once('-') {
            Some((code, _)) => code,
            None => self.tag(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
