use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use glimpse_capture::{ScreenGrabber, XcapGrabber};
use glimpse_dispatch::{Dispatch, HttpDispatcher};

mod controller;
mod hotkey;
mod presenter;
mod profile;
mod state;


use self::controller::PipelineController;
use self::state::AppState;

/// Hotkey-triggered screen capture piped through OCR and AI analysis.
#[derive(Parser)]
#[command(name = "glimpse", version)]
struct Args {
    /// Path to the profile file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.log_json);

    let config = profile::load_or_default(&args.config)?;
    let state = Arc::new(AppState::new(config));

    let shutdown = async {
        let _ = signal::ctrl_c().await;
    };

    run(state, shutdown).await
}

async fn run(state: Arc<AppState>, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    let dispatch: Arc<dyn Dispatch> = {
        let config = state.config.read().await;
        Arc::new(HttpDispatcher::new(config.dispatch))
    };
    let grabber: Arc<dyn ScreenGrabber> = Arc::new(XcapGrabber);

    let controller = PipelineController::new(state, dispatch, grabber);
    let mut tasks = controller.spawn_tasks();

    info!("glimpse running, press the hotkey to capture");

    tokio::select! {
        _ = shutdown => {
            info!("shutdown requested");
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => warn!("a pipeline task exited early"),
                Some(Ok(Err(err))) => error!(error = %err, "a pipeline task failed"),
                Some(Err(err)) => error!(error = %err, "a pipeline task panicked"),
                None => {}
            }
        }
    }

    controller.shutdown();
    tasks.shutdown().await;

    let dropped = controller.trigger_handle().dropped_total();
    if dropped > 0 {
        info!(dropped, "triggers arrived while sessions were busy");
    }

    info!("glimpse stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr));

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
