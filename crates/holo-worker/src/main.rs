//! One-shot generation from a request file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use holo_checkpoints::CheckpointConfig;
use holo_models::GenerateRequest;
use holo_worker::{new_request_id, GenerationService, WorkerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a multi-shot video from a JSON request", long_about = None)]
struct Args {
    /// Path to the JSON request (same shape as POST /generate-video)
    #[arg(short, long)]
    request: PathBuf,

    /// Where to write the encoded video (default: OUTPUT_DIR/<uuid>.mp4)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only validate the request and print the engine parameters
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("holo=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let body = tokio::fs::read_to_string(&args.request)
        .await
        .with_context(|| format!("failed to read {}", args.request.display()))?;
    let request: GenerateRequest =
        serde_json::from_str(&body).context("request is not valid JSON")?;

    if args.dry_run {
        let prepared = holo_worker::prepare(request)?;
        println!("{}", serde_json::to_string_pretty(&prepared.params)?);
        return Ok(());
    }

    let worker_config = WorkerConfig::from_env();
    let checkpoint_config = CheckpointConfig::from_env();
    info!(?worker_config, root = %checkpoint_config.root.display(), "Starting holo-generate");

    let service = GenerationService::from_env(&worker_config, &checkpoint_config)?;
    let request_id = new_request_id();

    let result = match &args.output {
        Some(output) => service.generate_to(&request_id, request, output).await,
        None => service.generate(&request_id, request).await,
    };

    match result {
        Ok(video) => {
            info!(
                request_id = %video.request_id,
                elapsed_secs = video.elapsed.as_secs_f64(),
                "Video written"
            );
            println!("{}", video.path.display());
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            Err(e.into())
        }
    }
}
