//! Folio CLI: upload a batch of photos to the Folio backend.
//!
//! Set FOLIO_API_KEY and FOLIO_API_URL (or API_URL). Uses X-API-Key auth.

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_api_client::ApiClient;
use folio_cli::{collect_sources, format_rejection, init_tracing};
use folio_core::{SharedSettings, UploadConfig};
use folio_processing::{BatchSession, PhotoValidator, Resampler, VariantDeriver};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "folio", about = "Folio photo upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize and upload a batch of JPEG photos
    Upload {
        /// Photos to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Category UUID assigned to every photo
        #[arg(long)]
        category: Option<Uuid>,
        /// Publish the photos immediately
        #[arg(long)]
        publish: bool,
    },
    /// Show the account's photo usage
    Usage,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = Arc::new(ApiClient::from_env().context(
        "Failed to create API client. Set FOLIO_API_KEY and FOLIO_API_URL (or API_URL)",
    )?);

    match cli.command {
        Commands::Usage => {
            let usage = client.usage().await.context("Failed to fetch usage")?;
            print_json(&usage)?;
        }
        Commands::Upload {
            files,
            category,
            publish,
        } => {
            let config = UploadConfig::from_env().context("Invalid upload configuration")?;
            let (sources, unreadable) =
                collect_sources(&files, &PhotoValidator::from_config(&config));
            for rejection in &unreadable {
                eprintln!("skipped {}", format_rejection(rejection));
            }

            let resampler = Arc::new(
                Resampler::new(config.max_canvas_dimension)
                    .with_max_decode_bytes(config.max_decode_bytes),
            );
            let variants = Arc::new(VariantDeriver::new(resampler));
            let session = BatchSession::new(&config, variants, client.clone(), client);

            if let Err(err) = session.refresh_usage().await {
                tracing::warn!(error = %err, "Could not fetch usage, using configured limit");
            }
            session
                .set_shared_settings(SharedSettings {
                    category_id: category,
                    publish_immediately: publish,
                })
                .await;

            let admission = session.admit(sources).await;
            for rejection in &admission.rejected {
                eprintln!("skipped {}", format_rejection(rejection));
            }
            if admission.admitted.is_empty() {
                anyhow::bail!("No files to upload");
            }

            let mut events = session.subscribe();
            let progress = tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => tracing::info!(
                            file_id = %event.file_id,
                            status = %event.status,
                            progress = event.progress,
                            error = event.error.as_deref().unwrap_or(""),
                            "Progress"
                        ),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let result = session
                .run()
                .await
                .context("Another upload is already running")?;
            progress.abort();

            print_json(&result)?;
            println!("{}", result);

            if result.has_failures() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
