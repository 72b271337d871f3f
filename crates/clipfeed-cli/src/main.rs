//! Clipfeed CLI: upload and delete media on the configured media host.
//!
//! Set CLIPFEED_CLOUD_NAME and CLIPFEED_UPLOAD_PRESET. Deletion also needs
//! CLIPFEED_API_KEY and CLIPFEED_API_SECRET.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clipfeed_cli::{config_summary, infer_kind, init_tracing, parse_policy, require_media_kind};
use clipfeed_core::{MediaKind, UploadConfig, UploadRequest};
use clipfeed_upload::{CancellationToken, HttpTransport, UploadPipeline};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "clipfeed", about = "Clipfeed media upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image or video
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Media kind: image or video (guessed from the extension when omitted)
        #[arg(long)]
        kind: Option<MediaKind>,
        /// Size policy: posts or stories
        #[arg(long, default_value = "posts")]
        policy: String,
    },
    /// Delete a remote asset by public id
    Delete {
        /// Public id returned by a previous upload
        public_id: String,
        /// Media kind: image or video
        #[arg(long, default_value = "image")]
        kind: MediaKind,
    },
    /// Print the effective configuration
    Config,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn build_pipeline(config: UploadConfig, policy: &str) -> anyhow::Result<UploadPipeline> {
    let policy = parse_policy(policy)?;
    let transport = HttpTransport::new(config.clone()).context("Failed to build HTTP client")?;
    Ok(UploadPipeline::new(config, Arc::new(transport), policy))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let result = run(cli).await;

    clipfeed_infra::shutdown_telemetry().await;
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = UploadConfig::from_env().context(
        "Failed to load configuration. Set CLIPFEED_CLOUD_NAME and CLIPFEED_UPLOAD_PRESET",
    )?;

    match cli.command {
        Commands::Upload { file, kind, policy } => {
            let kind = require_media_kind(kind.unwrap_or_else(|| infer_kind(&file)))?;
            let pipeline = build_pipeline(config, &policy)?;
            let request = UploadRequest::new(file.to_string_lossy(), kind);

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupted, cancelling upload");
                    on_interrupt.cancel();
                }
            });

            let result = pipeline
                .upload_with_cancel(&request, cancel)
                .await
                .with_context(|| format!("Upload of {} failed", file.display()))?;
            print_json(&result)?;
        }
        Commands::Delete { public_id, kind } => {
            let kind = require_media_kind(kind)?;
            let pipeline = build_pipeline(config, "posts")?;
            pipeline
                .delete_remote_asset(&public_id, kind)
                .await
                .with_context(|| format!("Failed to delete {}", public_id))?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("Asset {} deleted", public_id),
            }))?;
        }
        Commands::Config => {
            print_json(&config_summary(&config))?;
        }
    }

    Ok(())
}
