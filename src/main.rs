//! Statdash - CSV Upload & Summary Statistics Dashboard
//!
//! A small web application that summarizes an uploaded CSV file (or a bundled
//! sample) into totals, a mean, per-category totals and per-category time series.

mod charts;
mod config;
mod data;
mod stats;
mod web;

use anyhow::{Context, Result};
use config::Args;
use data::DataLoader;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use web::{AppState, UploadStore};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging(&args);

    info!("Statdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    std::fs::create_dir_all(&args.upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory {}",
            args.upload_dir.display()
        )
    })?;

    let loader = DataLoader::new(&args.upload_dir, &args.sample_file);
    if !loader.sample_path().is_file() {
        tracing::warn!(
            "Sample file {} not found; requests without an upload will show no data",
            loader.sample_path().display()
        );
    }
    info!("Uploads stored in {}", loader.upload_dir().display());

    let state = AppState::new(
        loader,
        UploadStore::new(&args.upload_dir),
        args.max_upload_bytes,
    );
    let app = web::build_router(state);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Listening on http://{}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down");
    Ok(())
}

fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
