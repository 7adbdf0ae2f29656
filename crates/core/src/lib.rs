// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! PokeVisor core.
//!
//! Connects the table vision to the hands evaluation: the [Supervisor] takes
//! frames from a [FrameSource], recognizes the cards in each table region,
//! and uses a [RoundTracker] to report the players hands once all the cards
//! on the table are known.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod config;
pub use config::{CardDetectorConfig, Config, ConfigError, LoopConfig, TableConfig};

pub mod source;
pub use source::{FrameSource, FramesQueue, SourceEvent};

mod supervisor;
pub use supervisor::{FrameReport, RegionCards, Supervisor};

pub mod tracker;
pub use tracker::{HandResults, Observation, PlayerHand, RoundPhase, RoundTracker};
