// Integration tests for the HTTP control API
//
// These exercise the routes that need no microphone: health, configuration
// defaults, and the no-active-session paths.

mod common;

use anyhow::Result;
use care_translate::{create_router, AppState, Config};
use common::RecordingSynthesizer;

async fn spawn_api() -> Result<String> {
    // No file at this path, so built-in defaults apply
    let cfg = Config::load("config/does-not-exist")?;
    let state = AppState::new(cfg, Box::new(RecordingSynthesizer::new()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, create_router(state))
            .await
            .expect("serve api");
    });

    Ok(format!("http://{addr}"))
}

#[test]
fn test_config_defaults_and_env_override() -> Result<()> {
    let cfg = Config::load("config/does-not-exist")?;
    assert_eq!(cfg.service.name, "care-translate");
    assert_eq!(cfg.endpoint.base_url, "http://localhost:8000");
    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.channels, 1);
    assert_eq!(cfg.audio.chunk_duration_ms, 3000);
    assert_eq!(cfg.session.settle_delay_ms, 350);
    assert!(cfg.audio.save_chunks_dir.is_none());

    std::env::set_var("CARE_TRANSLATE_ENDPOINT__BASE_URL", "http://translate.test");
    let cfg = Config::load("config/does-not-exist")?;
    std::env::remove_var("CARE_TRANSLATE_ENDPOINT__BASE_URL");

    assert_eq!(cfg.endpoint.base_url, "http://translate.test");

    Ok(())
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let base_url = spawn_api().await?;

    let response = reqwest::get(format!("{base_url}/health")).await?;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

#[tokio::test]
async fn test_session_routes_without_active_session() -> Result<()> {
    let base_url = spawn_api().await?;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base_url}/session")).send().await?;
    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "No active session");

    let response = client
        .post(format!("{base_url}/session/stop"))
        .send()
        .await?;
    assert_eq!(response.status(), 404);

    let response = client
        .post(format!("{base_url}/session/replay"))
        .send()
        .await?;
    assert_eq!(response.status(), 404);

    Ok(())
}
