use anyhow::{Context, Result};
use care_translate::{create_router, AppState, Config, SystemSynthesizer};
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "care-translate", about = "Voice-to-voice translation service")]
struct Args {
    /// Path to the configuration file (extension optional)
    #[arg(long, default_value = "config/care-translate")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);
    info!("Translation endpoint: {}", cfg.endpoint.base_url);
    info!(
        "Chunk cadence: {}ms, settle delay: {}ms",
        cfg.audio.chunk_duration_ms, cfg.session.settle_delay_ms
    );

    let synthesizer =
        SystemSynthesizer::new().context("Failed to initialize speech synthesizer")?;

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg, Box::new(synthesizer));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Control API listening on {addr}");

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
