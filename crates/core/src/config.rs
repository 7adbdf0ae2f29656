// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Supervisor configuration.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use pokevisor_vision::{LocatorConfig, MatchConfig, TableLayout};

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Wrong number of players.
    #[error("players must be in 2..={max}, got {0}", max = TableLayout::MAX_PLAYERS)]
    Players(usize),
    /// The community radius is not positive.
    #[error("community radius must be positive, got {0}")]
    CommunityRadius(f32),
    /// The card area bounds are empty.
    #[error("card area range ({min}, {max}) is empty")]
    CardArea {
        /// Smallest card area.
        min: f64,
        /// Largest card area.
        max: f64,
    },
    /// A match threshold is zero, no card would ever be recognized.
    #[error("{0} must be positive")]
    Threshold(&'static str),
    /// The frame rate is zero.
    #[error("frames per second must be positive")]
    Fps,
}

/// The PokeVisor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Table geometry.
    pub table: TableConfig,
    /// Cards recognition.
    pub card_detector: CardDetectorConfig,
    /// Frame loop.
    #[serde(rename = "loop")]
    pub frame_loop: LoopConfig,
}

impl Config {
    /// Checks that the configuration values are consistent.
    ///
    /// The community radius upper bound depends on the frame size and is
    /// checked when the table layout is computed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let players = self.table.players;
        if !(2..=TableLayout::MAX_PLAYERS).contains(&players) {
            return Err(ConfigError::Players(players));
        }

        let radius = self.table.community_radius;
        if !(radius > 0.0) {
            return Err(ConfigError::CommunityRadius(radius));
        }

        let detector = &self.card_detector;
        if !(detector.card_min_area >= 0.0 && detector.card_min_area < detector.card_max_area) {
            return Err(ConfigError::CardArea {
                min: detector.card_min_area,
                max: detector.card_max_area,
            });
        }

        if detector.rank_diff_max == 0 {
            return Err(ConfigError::Threshold("rank-diff-max"));
        }

        if detector.suit_diff_max == 0 {
            return Err(ConfigError::Threshold("suit-diff-max"));
        }

        if self.frame_loop.fps == 0 {
            return Err(ConfigError::Fps);
        }

        Ok(())
    }
}

/// Table geometry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TableConfig {
    /// Number of players around the table.
    pub players: usize,
    /// Radius in pixels of the community cards area.
    pub community_radius: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            players: 4,
            community_radius: 180.0,
        }
    }
}

/// Cards recognition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CardDetectorConfig {
    /// Smallest card area in pixels.
    pub card_min_area: f64,
    /// Largest card area in pixels.
    pub card_max_area: f64,
    /// Largest rank difference for a match.
    pub rank_diff_max: u32,
    /// Largest suit difference for a match.
    pub suit_diff_max: u32,
}

impl Default for CardDetectorConfig {
    fn default() -> Self {
        let locator = LocatorConfig::default();
        let matching = MatchConfig::default();
        Self {
            card_min_area: locator.min_area,
            card_max_area: locator.max_area,
            rank_diff_max: matching.rank_diff_max,
            suit_diff_max: matching.suit_diff_max,
        }
    }
}

impl CardDetectorConfig {
    /// The card locator parameters.
    pub fn locator(&self) -> LocatorConfig {
        LocatorConfig {
            min_area: self.card_min_area,
            max_area: self.card_max_area,
            ..LocatorConfig::default()
        }
    }

    /// The symbols matching thresholds.
    pub fn matching(&self) -> MatchConfig {
        MatchConfig {
            rank_diff_max: self.rank_diff_max,
            suit_diff_max: self.suit_diff_max,
        }
    }
}

/// Frame loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoopConfig {
    /// Target frames per second.
    pub fps: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { fps: 60 }
    }
}

impl LoopConfig {
    /// The time between two frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.table.players, 4);
        assert_eq!(config.table.community_radius, 180.0);
        assert_eq!(config.card_detector.card_min_area, 12_500.0);
        assert_eq!(config.card_detector.card_max_area, 240_000.0);
        assert_eq!(config.card_detector.rank_diff_max, 2000);
        assert_eq!(config.card_detector.suit_diff_max, 700);
        assert_eq!(config.frame_loop.fps, 60);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn parse_json() {
        let config: Config = serde_json::from_str(
            r#"{
                "card-detector": { "card-max-area": 120000, "card-min-area": 8000 },
                "table": { "players": 6 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.card_detector.card_min_area, 8_000.0);
        assert_eq!(config.card_detector.card_max_area, 120_000.0);
        assert_eq!(config.card_detector.rank_diff_max, 2000);
        assert_eq!(config.table.players, 6);
        assert_eq!(config.table.community_radius, 180.0);
        assert_eq!(config.frame_loop.fps, 60);

        let locator = config.card_detector.locator();
        assert_eq!(locator.min_area, 8_000.0);
        assert_eq!(locator.blur_sigma, LocatorConfig::default().blur_sigma);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"loop\""));
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }

    #[test]
    fn invalid_values() {
        let mut config = Config::default();
        config.table.players = 1;
        assert_eq!(config.validate(), Err(ConfigError::Players(1)));

        let mut config = Config::default();
        config.table.community_radius = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::CommunityRadius(0.0)));

        let mut config = Config::default();
        config.card_detector.card_min_area = 300_000.0;
        assert!(matches!(config.validate(), Err(ConfigError::CardArea { .. })));

        let mut config = Config::default();
        config.card_detector.suit_diff_max = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Threshold("suit-diff-max"))
        );

        let mut config = Config::default();
        config.frame_loop.fps = 0;
        assert_eq!(config.validate(), Err(ConfigError::Fps));
    }

    #[test]
    fn frame_interval() {
        let config = LoopConfig { fps: 50 };
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
    }
}
