use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use qr_scan_session::{
    initialize_scanner, AcquisitionError, CameraArbiter, ChannelPresenter, FrameScript,
    PresenterEvent, ResultCardService, ScanConfig, ScriptedCamera,
};
use shared::ScanResult;

/// Run one scan cycle against a scripted camera and print the result card
#[derive(Debug, Parser)]
#[command(name = "scan-sim", version, about)]
struct Cli {
    /// Scanner config (YAML); defaults are used when omitted or missing
    #[arg(long, env = "SCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Frame script (YAML) played by the simulated camera
    #[arg(long)]
    script: Option<PathBuf>,

    /// Simulate the user denying camera permission
    #[arg(long)]
    deny_camera: bool,

    /// Delay before the camera opens, in milliseconds
    #[arg(long, default_value_t = 0)]
    acquire_delay_ms: u64,

    /// Give up waiting for a result after this many milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Print the result as JSON instead of a text card
    #[arg(long)]
    json: bool,
}

enum Outcome {
    Scanned(ScanResult),
    CameraFailed(String),
    TimedOut,
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Where the config came from. Logged once the subscriber is installed,
/// since loading happens before the log filter is known.
fn config_source(path: Option<&Path>) -> String {
    match path {
        Some(path) if path.exists() => format!("Using scanner config {:?}", path),
        Some(path) => format!("No scanner config at {:?}, using defaults", path),
        None => "Using built-in scanner config".to_string(),
    }
}

fn demo_script() -> FrameScript {
    FrameScript {
        frames: vec![None, None, Some("INVOICE-4471:EUR-12.50".to_string())],
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    init_logging(&config.log_filter);
    info!("{}", config_source(cli.config.as_deref()));

    let script = match &cli.script {
        Some(path) => FrameScript::load(path)?,
        None => demo_script(),
    };
    info!("🎞️ Simulating camera with {} frames", script.frames.len());

    let mut camera = ScriptedCamera::from_script(script)
        .with_acquire_delay(Duration::from_millis(cli.acquire_delay_ms));
    if cli.deny_camera {
        camera = camera.with_acquisition_error(AcquisitionError::PermissionDenied);
    }

    let (presenter, mut events) = ChannelPresenter::new();
    let driver = initialize_scanner(&config, camera, CameraArbiter::new(), Arc::new(presenter));
    driver.set_active(true);

    let wait = async {
        while let Some(event) = events.recv().await {
            match event {
                PresenterEvent::ScanResult(result) => return Outcome::Scanned(result),
                PresenterEvent::AcquisitionFailed { message, .. } => {
                    return Outcome::CameraFailed(message)
                }
                PresenterEvent::ViewState(_) => {}
            }
        }
        Outcome::TimedOut
    };
    let outcome = tokio::time::timeout(Duration::from_millis(cli.timeout_ms), wait)
        .await
        .unwrap_or(Outcome::TimedOut);

    driver
        .shutdown()
        .await
        .context("Scan driver task failed")?;

    let cards = ResultCardService::new();
    match outcome {
        Outcome::Scanned(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", cards.render_text(&cards.format_card(Some(&result))));
            }
        }
        Outcome::CameraFailed(message) => {
            warn!("Scan did not start");
            eprintln!("{}", message);
            std::process::exit(2);
        }
        Outcome::TimedOut => {
            warn!("No code was read within {}ms", cli.timeout_ms);
            println!("{}", cards.render_text(&cards.format_card(None)));
        }
    }

    Ok(())
}
