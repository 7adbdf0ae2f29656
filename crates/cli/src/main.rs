// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! PokeVisor command line, recognizes the cards on table frames and logs the
//! players hands.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, atomic::AtomicBool},
};

use pokevisor_core::{Config, FrameReport, Supervisor};
use pokevisor_vision::TemplateSet;

mod frames;

#[derive(Debug, Parser)]
struct Cli {
    /// The directory with the rank and suit reference images.
    #[clap(long, short)]
    templates: PathBuf,
    /// A JSON configuration file.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Number of players, overrides the configuration.
    #[clap(long, short, value_parser = clap::value_parser!(u8).range(2..=32))]
    players: Option<u8>,
    /// Frames per second, overrides the configuration.
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: Option<u32>,
    /// Print the hands results as JSON lines.
    #[clap(long)]
    json: bool,
    /// Frame images or directories of frame images.
    #[clap(required = true)]
    frames: Vec<PathBuf>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    if let Some(players) = cli.players {
        config.table.players = players as usize;
    }

    if let Some(fps) = cli.fps {
        config.frame_loop.fps = fps;
    }

    let templates = TemplateSet::load_dir(&cli.templates)?;
    let mut supervisor = Supervisor::new(config, Arc::new(templates))?;
    let mut source = frames::ImageFiles::new(&cli.frames)?;

    let stop = AtomicBool::new(false);
    let json = cli.json;
    let frames = supervisor.run(&mut source, &stop, |report| {
        if let Err(e) = print_report(report, json) {
            error!("{e}");
        }
    })?;

    info!("Done after {frames} frames");
    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading config {}", path.display()))?;
    let config: Config = serde_json::from_str(&text)
        .with_context(|| format!("Parsing config {}", path.display()))?;
    config.validate()?;
    info!("Loaded config {}", path.display());
    Ok(config)
}

fn print_report(report: &FrameReport, json: bool) -> Result<()> {
    let Some(results) = &report.results else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string(results)?);
        return Ok(());
    }

    let community = results
        .community
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>();
    println!("Community cards: {}", community.join(" "));

    for (idx, hand) in results.players.iter().enumerate() {
        let cards = hand.cards.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        println!("Player {}: {} {}", idx + 1, cards.join(" "), hand.category);
    }

    Ok(())
}
