// Integration tests for the translation endpoint client
//
// These run against an in-process mock of POST /api/transcribe_and_translate
// and verify the multipart contract and response decoding.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use care_translate::{Language, SessionError, TranslateClient, TranslationResult, UPLOAD_FILE_NAME};
use common::{sample_chunk, spawn_mock_endpoint, spawn_router, MockResponse};
use serde_json::json;
use std::io::Cursor;

#[tokio::test]
async fn test_multipart_upload_contract() -> Result<()> {
    let (base_url, endpoint) = spawn_mock_endpoint(vec![MockResponse::immediate(json!({
        "original": "hello",
        "translation": "नमस्ते",
        "notes": ""
    }))])
    .await?;

    let client = TranslateClient::new(&base_url);
    let chunk = sample_chunk();
    let expected_bytes = chunk.bytes.clone();

    let result = client
        .translate_chunk(chunk, Language::English, Language::Hindi)
        .await
        .expect("upload should succeed");

    assert_eq!(result.original.as_deref(), Some("hello"));
    assert_eq!(result.translation.as_deref(), Some("नमस्ते"));

    let uploads = endpoint.uploads();
    assert_eq!(uploads.len(), 1);
    // Language tags go over the wire in their truncated two-letter form
    assert_eq!(uploads[0].src_lang, "en");
    assert_eq!(uploads[0].tgt_lang, "hi");
    assert_eq!(uploads[0].file_name.as_deref(), Some(UPLOAD_FILE_NAME));
    assert_eq!(uploads[0].bytes, expected_bytes);

    // and the payload is a readable WAV
    let reader = hound::WavReader::new(Cursor::new(uploads[0].bytes.clone()))?;
    assert_eq!(reader.spec().sample_rate, 16000);

    Ok(())
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_tolerated() -> Result<()> {
    let (base_url, endpoint) =
        spawn_mock_endpoint(vec![MockResponse::immediate(json!({"translation": "ok"}))]).await?;

    let client = TranslateClient::new(format!("{base_url}/"));
    client
        .translate_chunk(sample_chunk(), Language::English, Language::Spanish)
        .await
        .expect("upload should succeed");

    assert_eq!(endpoint.upload_count(), 1);
    Ok(())
}

#[test]
fn test_original_fragment_priority() {
    let decode = |value: serde_json::Value| -> TranslationResult {
        serde_json::from_value(value).expect("decode response")
    };

    // `original` wins over everything
    let result = decode(json!({
        "original": "a", "transcript": "b", "source": "c", "text": "d"
    }));
    assert_eq!(result.original_fragment(), Some("a"));

    // empty fields are skipped, not selected
    let result = decode(json!({ "original": "", "transcript": "", "source": "c" }));
    assert_eq!(result.original_fragment(), Some("c"));

    let result = decode(json!({ "text": "d" }));
    assert_eq!(result.original_fragment(), Some("d"));

    let result = decode(json!({ "translation": "only" }));
    assert_eq!(result.original_fragment(), None);
    assert_eq!(result.translation_fragment(), Some("only"));

    // fields the endpoint never sent decode as absent
    let result = decode(json!({}));
    assert_eq!(result.original_fragment(), None);
    assert_eq!(result.translation_fragment(), None);
    assert_eq!(result.note(), None);
}

#[tokio::test]
async fn test_connection_failure_is_upload_failed() {
    // Nothing listens on port 9 (discard)
    let client = TranslateClient::new("http://127.0.0.1:9");

    let err = client
        .translate_chunk(sample_chunk(), Language::English, Language::Hindi)
        .await
        .expect_err("upload should fail");

    assert!(matches!(err, SessionError::UploadFailed(_)));
}

#[tokio::test]
async fn test_server_error_is_upload_failed() -> Result<()> {
    let router = Router::new().route(
        "/api/transcribe_and_translate",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base_url = spawn_router(router).await?;

    let client = TranslateClient::new(&base_url);
    let err = client
        .translate_chunk(sample_chunk(), Language::English, Language::Hindi)
        .await
        .expect_err("upload should fail");

    assert!(matches!(err, SessionError::UploadFailed(_)));
    Ok(())
}
