//! flowlens - terminal viewer for intercepted network flows
//!
//! Loads a JSON capture file, applies `.flowlens/config.toml`, and
//! hands control to the TUI event loop.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use flowlens_app::{AppState, Config};
use flowlens_core::error::{Error, Result};
use flowlens_core::flow::Flow;

#[derive(Parser, Debug)]
#[command(name = "flowlens", version, about = "Terminal viewer for intercepted network flows")]
struct Args {
    /// Path to a JSON capture file (an array of flows).
    capture: PathBuf,

    /// Show only pinned flows on startup.
    #[arg(long)]
    pinned_only: bool,

    /// Maximum flows retained; overrides the config file.
    #[arg(long)]
    max_flows: Option<usize>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = flowlens_core::logging::init() {
        eprintln!("warning: logging unavailable: {err}");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "fatal error");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    if args.pinned_only {
        config.pinned_only = true;
    }
    if let Some(max_flows) = args.max_flows {
        config.max_flows = max_flows;
    }

    let flows = load_capture(&args.capture)?;

    let mut state = AppState::new(&config);
    state.refresh(flows);

    flowlens_tui::run(&mut state)
}

/// Read and parse a capture file: a JSON array of flow objects.
fn load_capture(path: &PathBuf) -> Result<Vec<Flow>> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::CaptureNotFound { path: path.clone() }
        } else {
            Error::Io(err)
        }
    })?;
    serde_json::from_str(&raw).map_err(|err| Error::CaptureMalformed {
        path: path.clone(),
        message: err.to_string(),
    })
}
