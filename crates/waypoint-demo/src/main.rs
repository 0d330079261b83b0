#![forbid(unsafe_code)]

//! Waypoint demo
//!
//! Replays a scripted session of a pretend recruiting app against a guided
//! tour and prints every effect the tour asks of its host, plus a one-line
//! summary of the overlay after each cue.
//!
//! # Running
//!
//! ```sh
//! cargo run -p waypoint-demo
//! RUST_LOG=waypoint_tour=debug cargo run -p waypoint-demo -- --width 1024
//! cargo run -p waypoint-demo -- --state /tmp/tour.json --dismiss
//! ```

mod host;
mod script;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use waypoint::{DismissalStore, FileStore, MemoryStore, Size, StepCatalog, TourConfig};

use crate::script::{Replay, SESSION};

const SAMPLE_TOUR: &str = include_str!("../data/sample_tour.toml");

#[derive(Debug, Parser)]
#[command(
    name = "waypoint-demo",
    about = "Replay a scripted host session against a guided tour",
    version
)]
struct Cli {
    /// Step catalog (TOML or JSON). Defaults to the built-in sample tour.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Engine configuration (TOML or JSON). Invalid files fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// File remembering "don't show again". Kept in memory when omitted.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Opt out of the tour at the end of the session.
    #[arg(long)]
    dismiss: bool,

    #[arg(long, default_value_t = 1280)]
    width: i32,

    #[arg(long, default_value_t = 800)]
    height: i32,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(error) = run(&cli) {
        eprintln!("waypoint-demo: {error} ({})", error.degradation());
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> waypoint::Result<()> {
    let catalog = match &cli.catalog {
        Some(path) => waypoint::load_catalog(path)?,
        None => StepCatalog::from_toml_str(SAMPLE_TOUR)?,
    };
    let config = match &cli.config {
        Some(path) => waypoint::load_config_or_default(path),
        None => TourConfig::default(),
    };
    let mut store: Box<dyn DismissalStore> = match &cli.state {
        Some(path) => Box::new(FileStore::new(path.clone())),
        None => Box::new(MemoryStore::new()),
    };

    let stdout = std::io::stdout();
    let replay = Replay::new(
        catalog,
        config,
        Size::new(cli.width, cli.height),
        stdout.lock(),
    );
    let outcome = replay.run(SESSION, store.as_mut(), cli.dismiss)?;
    tracing::info!(
        started = outcome.started,
        lifecycle = outcome.lifecycle.as_str(),
        reason = outcome.reason.unwrap_or("none"),
        anomalies = outcome.anomalies,
        elapsed_ms = u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
        "session replayed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["waypoint-demo"]);
        assert!(cli.catalog.is_none());
        assert!(!cli.dismiss);
        assert_eq!((cli.width, cli.height), (1280, 800));
    }

    #[test]
    fn cli_accepts_paths_and_flags() {
        let cli = Cli::parse_from([
            "waypoint-demo",
            "--catalog",
            "tour.json",
            "--state",
            "state.json",
            "--dismiss",
            "--width",
            "1024",
        ]);
        assert_eq!(cli.catalog, Some(PathBuf::from("tour.json")));
        assert_eq!(cli.state, Some(PathBuf::from("state.json")));
        assert!(cli.dismiss);
        assert_eq!(cli.width, 1024);
    }

    #[test]
    fn file_state_survives_between_runs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tour.json");
        let cli = Cli::parse_from([
            "waypoint-demo",
            "--state",
            path.to_str().expect("utf8 path"),
            "--dismiss",
        ]);
        run(&cli).expect("first run");
        assert!(FileStore::new(&path).is_dismissed());
    }
}
