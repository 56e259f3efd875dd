//! Drive Replay - runs a recorded location trace through a session

use anyhow::{Context, Result};
use clap::Parser;
use drive_session::{
    init_json_logging, init_logging, Authorization, DriveSession, DriveSettings, LocationFeed,
};
use geo_math::LocationSample;
use motion_classifier::MotionFeed;
use narration::SilentSpeech;
use route_model::RouteModel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "drive-replay", version, about = "Replay a recorded drive against a route")]
struct Args {
    /// Route document (JSON)
    route: PathBuf,

    /// Location trace: one JSON sample per line, `null` for a missing fix
    trace: PathBuf,

    /// Settings file (TOML)
    settings: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn read_trace(path: &Path) -> Result<Vec<Option<LocationSample>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading trace {}", path.display()))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: malformed sample", path.display(), n + 1))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.json_logs {
        init_json_logging()?;
    } else {
        init_logging()?;
    }

    info!("=== Drive Replay v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = DriveSettings::load(args.settings.as_deref())?;

    let route_text = std::fs::read_to_string(&args.route)
        .with_context(|| format!("reading route {}", args.route.display()))?;
    let route = RouteModel::from_value(
        serde_json::from_str(&route_text).context("route document is not JSON")?,
    )?;

    let trace = read_trace(&args.trace)?;
    info!("Replaying {} samples on route {}", trace.len(), route.name());

    let (tx, location) = LocationFeed::channel(Authorization::Authorized, 64);
    let checklist = settings.checklist();
    let handle = DriveSession::start(
        settings,
        route,
        location,
        MotionFeed::unavailable(),
        Arc::new(SilentSpeech::new()),
        checklist,
    )?;

    let total = trace.len() as u64;
    let mut snapshots = handle.subscribe();
    for sample in trace {
        tx.send(sample)
            .await
            .context("session stopped accepting samples")?;
    }
    snapshots
        .wait_for(|s| s.location_samples >= total)
        .await
        .context("session stopped before the trace was consumed")?;
    drop(tx);

    let summary = handle.end().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
