use reqwest::multipart;
use tracing::debug;

use super::response::TranslationResult;
use crate::audio::AudioChunk;
use crate::error::SessionError;
use crate::lang::Language;

/// Filename advertised for the uploaded chunk part.
pub const UPLOAD_FILE_NAME: &str = "chunk.wav";

/// HTTP client for the transcribe-and-translate endpoint
pub struct TranslateClient {
    http: reqwest::Client,
    base_url: String,
}

impl TranslateClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload one chunk for transcription and translation.
    ///
    /// Language tags are sent in their truncated two-letter form. Any
    /// transport or decode failure comes back as a single
    /// [`SessionError::UploadFailed`]; callers treat it as one lost chunk.
    pub async fn translate_chunk(
        &self,
        chunk: AudioChunk,
        source: Language,
        target: Language,
    ) -> Result<TranslationResult, SessionError> {
        let url = format!("{}/api/transcribe_and_translate", self.base_url);

        debug!(
            "Uploading chunk {} ({} bytes, {} -> {})",
            chunk.index,
            chunk.bytes.len(),
            source.short_code(),
            target.short_code()
        );

        let file = multipart::Part::bytes(chunk.bytes)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("audio/wav")?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("src_lang", source.short_code())
            .text("tgt_lang", target.short_code());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let result = response.json::<TranslationResult>().await?;

        Ok(result)
    }
}
