//! # Grand Drive
//!
//! Headless shot simulator.
//!
//! Loads a TOML configuration, plays each scripted shot through a full shot
//! session on the reference ball body, and prints one JSON line per shot.
//!
//! ```text
//! grand-drive [CONFIG] [--shot TYPE]
//! grand-drive --write-config PATH
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod driver;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drive_common::ShotType;
use drive_gameplay::{ShotSession, SimpleBody};

use crate::config::{SimConfig, CONFIG_FILE};
use crate::driver::{equip, ScriptedGolfer, ShotOutcome};

/// Command line options.
#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    shot_override: Option<ShotType>,
    write_config: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--shot" => {
                let name = iter.next().context("--shot needs a shot type")?;
                args.shot_override = Some(name.parse()?);
            },
            "--write-config" => {
                args.write_config = Some(iter.next().unwrap_or_else(|| CONFIG_FILE.to_string()));
            },
            flag if flag.starts_with("--") => bail!("Unknown option {flag}"),
            path => args.config = Some(path.to_string()),
        }
    }
    Ok(args)
}

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("grand_drive=info".parse()?)
                .add_directive("drive_gameplay=info".parse()?),
        )
        .init();

    info!("Grand Drive simulator starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = parse_args()?;

    if let Some(path) = &args.write_config {
        SimConfig::default()
            .save_to(path)
            .with_context(|| format!("writing default config to {path}"))?;
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => SimConfig::try_load_from(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => SimConfig::load_from(CONFIG_FILE),
    };
    config.validate();
    if let Some(shot_type) = args.shot_override {
        for shot in &mut config.shots {
            shot.shot_type = shot_type;
        }
    }

    let mut loadout = config.loadout.clone();
    for (name, distance) in loadout.distances() {
        info!("Club {name}: max distance {distance:.0}y");
    }

    let body = SimpleBody::new(config.body.clone());
    let mut session = ShotSession::new(
        config.gameplay.clone(),
        body,
        Box::new(loadout.clone()),
    );
    let golfer = ScriptedGolfer::new(config.frame_dt, config.max_shot_seconds);

    for (index, shot) in config.shots.iter().enumerate() {
        equip(&mut session, &mut loadout, shot);
        let outcome = golfer.play(&mut session, shot);
        match &outcome {
            ShotOutcome::Completed(summary) => info!(
                "Shot {}: {} carried {:.1}, finished at {:.1}",
                index + 1,
                summary.shot_type,
                summary.carry_distance,
                summary.total_distance
            ),
            ShotOutcome::Missed => warn!("Shot {}: swing missed", index + 1),
            ShotOutcome::TimedOut => warn!("Shot {}: timed out", index + 1),
        }
        println!("{}", serde_json::to_string(&outcome)?);
    }

    info!("Grand Drive simulator finished");
    Ok(())
}
