// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Per frame supervision.
//!
//! The [Supervisor] runs the table pipeline on each frame: it keeps the table
//! layout for the frame geometry, detects the cards in every region, feeds
//! the cards to the round tracker, and reports the players hands when the
//! tracker resolves the table.
use anyhow::Result;
use image::GrayImage;
use log::{info, warn};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use pokevisor_cards::Card;
use pokevisor_vision::{
    CardDetector, Detection, LayoutError, LayoutKey, RegionId, TableLayout, TemplateSet,
};

use crate::{
    config::{Config, ConfigError},
    source::{FrameSource, SourceEvent, frame_timeout},
    tracker::{HandResults, Observation, RoundPhase, RoundTracker},
};

/// The cards detected in a region.
#[derive(Debug, Clone)]
pub struct RegionCards {
    /// The region.
    pub region: RegionId,
    /// The cards largest first.
    pub detections: Vec<Detection>,
}

impl RegionCards {
    /// The region cards sorted.
    pub fn cards(&self) -> Vec<Card> {
        let mut cards = self.detections.iter().map(|d| d.card).collect::<Vec<_>>();
        cards.sort();
        cards
    }
}

/// The result of processing a frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// The detections for each region, the community region first.
    pub regions: Vec<RegionCards>,
    /// The community cards seen in this frame.
    pub community: Vec<Card>,
    /// The cards seen in front of each player in this frame.
    pub players: Vec<Vec<Card>>,
    /// The round phase after this frame.
    pub phase: RoundPhase,
    /// The players hands if the tracker reported them on this frame.
    pub results: Option<HandResults>,
}

/// Runs the cards recognition and the round tracking on frames.
#[derive(Debug)]
pub struct Supervisor {
    config: Config,
    detector: CardDetector,
    layout: Option<TableLayout>,
    tracker: RoundTracker,
}

impl Supervisor {
    /// Creates a supervisor with a validated configuration.
    pub fn new(config: Config, templates: Arc<TemplateSet>) -> Result<Self, ConfigError> {
        config.validate()?;

        let detector = CardDetector::new(
            config.card_detector.locator(),
            config.card_detector.matching(),
            templates,
        );

        Ok(Self {
            config,
            detector,
            layout: None,
            tracker: RoundTracker::new(),
        })
    }

    /// The supervisor configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The layout of the last processed frame.
    pub fn layout(&self) -> Option<&TableLayout> {
        self.layout.as_ref()
    }

    /// The round tracker.
    pub fn tracker(&self) -> &RoundTracker {
        &self.tracker
    }

    /// Changes the number of players, this starts a new round.
    pub fn set_players(&mut self, players: usize) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        config.table.players = players;
        config.validate()?;

        if players != self.config.table.players {
            self.config = config;
            self.tracker.reset();
        }

        Ok(())
    }

    /// Starts a new round.
    pub fn new_round(&mut self) {
        self.tracker.reset();
    }

    /// Processes a frame.
    ///
    /// Fails if the table geometry doesn't fit the frame.
    pub fn process_frame(&mut self, frame: &GrayImage) -> Result<FrameReport, LayoutError> {
        let key = LayoutKey {
            width: frame.width(),
            height: frame.height(),
            players: self.config.table.players,
            community_radius: self.config.table.community_radius,
        };

        let layout = match self.layout.take() {
            Some(layout) if layout.matches(&key) => layout,
            _ => {
                let layout =
                    TableLayout::new(key.width, key.height, key.players, key.community_radius)?;
                info!(
                    "Table layout {}x{} for {} players",
                    key.width, key.height, key.players
                );
                layout
            }
        };

        let regions = detect_regions(&self.detector, frame, &layout);
        self.layout = Some(layout);

        let mut cards = regions.iter().map(RegionCards::cards);
        let community = cards.next().unwrap_or_default();
        let players = cards.collect::<Vec<_>>();

        let observation = Observation::new(community.clone(), players.clone());
        let results = self.tracker.update(observation);

        Ok(FrameReport {
            regions,
            community,
            players,
            phase: self.tracker.phase(),
            results,
        })
    }

    /// Processes the frames from a source until the source is closed or the
    /// stop flag is set.
    ///
    /// Returns the number of processed frames.
    pub fn run<S, F>(
        &mut self,
        source: &mut S,
        stop: &AtomicBool,
        mut on_report: F,
    ) -> Result<usize>
    where
        S: FrameSource,
        F: FnMut(&FrameReport),
    {
        let interval = self.config.frame_loop.frame_interval();
        let mut elapsed = Duration::ZERO;
        let mut frames = 0;

        while !stop.load(Ordering::Relaxed) {
            match source.next_frame(frame_timeout(interval, elapsed))? {
                SourceEvent::Frame(frame) => {
                    let start = Instant::now();
                    match self.process_frame(&frame) {
                        Ok(report) => on_report(&report),
                        Err(e) => warn!("Dropping frame: {e}"),
                    }

                    frames += 1;
                    elapsed = start.elapsed();
                }
                SourceEvent::Timeout => elapsed = Duration::ZERO,
                SourceEvent::Closed => break,
            }
        }

        info!("Processed {frames} frames");
        Ok(frames)
    }
}

#[cfg(not(feature = "parallel"))]
fn detect_regions(
    detector: &CardDetector,
    frame: &GrayImage,
    layout: &TableLayout,
) -> Vec<RegionCards> {
    let binary = detector.binarize(frame);
    layout
        .regions()
        .map(|region| RegionCards {
            region: region.id(),
            detections: detector.detect_binary(frame, &binary, Some(region.mask())),
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn detect_regions(
    detector: &CardDetector,
    frame: &GrayImage,
    layout: &TableLayout,
) -> Vec<RegionCards> {
    let mut regions = layout
        .regions()
        .map(|region| RegionCards {
            region: region.id(),
            detections: Vec::new(),
        })
        .collect::<Vec<_>>();

    let binary = detector.binarize(frame);
    let binary = &binary;
    std::thread::scope(|s| {
        for (region, cards) in layout.regions().zip(regions.iter_mut()) {
            s.spawn(move || {
                cards.detections = detector.detect_binary(frame, binary, Some(region.mask()));
            });
        }
    });

    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TableConfig, source::FramesQueue};
    use pokevisor_eval::HandCategory;
    use pokevisor_vision::test_utils::{self, table_image, templates};

    const WIDTH: u32 = 900;
    const HEIGHT: u32 = 1300;

    fn supervisor() -> Supervisor {
        let config = Config {
            table: TableConfig {
                players: 2,
                community_radius: 200.0,
            },
            ..Default::default()
        };

        Supervisor::new(config, Arc::new(templates())).unwrap()
    }

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    /// Upright card with the top left corner at (x, y).
    fn draw(frame: &mut GrayImage, card: Card, x: f32, y: f32) {
        let image = test_utils::card_for(card.rank(), card.suit());
        let corners = [[x, y], [x + 255.0, y], [x + 255.0, y + 359.0], [x, y + 359.0]];
        test_utils::draw_card(frame, &image, corners);
    }

    /// Two players table, the community band is between rows 450 and 850.
    fn table(community: &[Card], top: &[Card], bottom: &[Card]) -> GrayImage {
        let mut frame = table_image(WIDTH, HEIGHT);
        let columns = [60.0, 460.0];
        for (card, x) in community.iter().zip(columns) {
            draw(&mut frame, *card, x, 470.0);
        }

        for (card, x) in top.iter().zip(columns) {
            draw(&mut frame, *card, x, 60.0);
        }

        for (card, x) in bottom.iter().zip(columns) {
            draw(&mut frame, *card, x, 880.0);
        }

        frame
    }

    #[test]
    fn round_resolves_once() {
        let mut supervisor = supervisor();
        let community = [card("9S"), card("9D")];

        // Only the community cards are on the table.
        let frame = table(&community, &[], &[]);
        let report = supervisor.process_frame(&frame).unwrap();
        assert_eq!(report.regions[0].region, RegionId::Community);
        assert_eq!(report.community, [card("9D"), card("9S")]);
        assert_eq!(report.players, vec![Vec::<Card>::new(); 2]);
        assert_eq!(report.phase, RoundPhase::Collecting);
        assert!(report.results.is_none());

        let layout = supervisor.layout().unwrap();
        assert_eq!(layout.players().len(), 2);

        // All cards dealt.
        let frame = table(&community, &[card("9C"), card("2H")], &[card("5S")]);
        let report = supervisor.process_frame(&frame).unwrap();
        assert_eq!(report.phase, RoundPhase::Resolved);
        assert_eq!(report.players[0], [card("9C"), card("2H")]);
        assert_eq!(report.players[1], [card("5S")]);

        let results = report.results.unwrap();
        assert_eq!(results.players[0].category, HandCategory::ThreeOfAKind);
        assert_eq!(results.players[1].category, HandCategory::OnePair);

        // Nothing changed.
        let report = supervisor.process_frame(&frame).unwrap();
        assert!(report.results.is_none());

        // Same cards in a new round.
        supervisor.new_round();
        let report = supervisor.process_frame(&frame).unwrap();
        assert!(report.results.is_some());
    }

    #[test]
    fn regions_share_binary_frame() {
        let mut supervisor = supervisor();
        let frame = table(&[card("KH")], &[card("3C")], &[card("JD"), card("4S")]);
        let report = supervisor.process_frame(&frame).unwrap();

        // Same detections as a full detection pass for each region.
        let layout = supervisor.layout().unwrap();
        assert_eq!(report.regions.len(), layout.regions().count());
        for (cards, region) in report.regions.iter().zip(layout.regions()) {
            assert_eq!(cards.region, region.id());
            assert_eq!(
                cards.detections,
                supervisor.detector.detect(&frame, Some(region.mask()))
            );
        }

        assert_eq!(report.community, [card("KH")]);
        assert_eq!(report.players[0], [card("3C")]);
        assert_eq!(report.players[1], [card("JD"), card("4S")]);
    }

    #[test]
    fn layout_is_cached() {
        let mut supervisor = supervisor();
        let frame = table_image(WIDTH, HEIGHT);
        supervisor.process_frame(&frame).unwrap();
        let key = supervisor.layout().unwrap().key();

        supervisor.process_frame(&frame).unwrap();
        assert_eq!(supervisor.layout().unwrap().key(), key);

        supervisor.set_players(3).unwrap();
        supervisor.process_frame(&frame).unwrap();
        assert_eq!(supervisor.layout().unwrap().players().len(), 3);

        assert_eq!(supervisor.set_players(1), Err(ConfigError::Players(1)));
        assert_eq!(supervisor.config().table.players, 3);
    }

    #[test]
    fn frame_too_small() {
        let mut supervisor = supervisor();
        let err = supervisor.process_frame(&table_image(300, 300)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidRadius { .. }));
    }

    #[test]
    fn run_frames() {
        let mut supervisor = supervisor();
        let mut source = FramesQueue::new([
            table_image(300, 300),
            table_image(WIDTH, HEIGHT),
            table_image(WIDTH, HEIGHT),
        ]);

        let stop = AtomicBool::new(false);
        let mut reports = 0;
        let frames = supervisor
            .run(&mut source, &stop, |report| {
                assert!(report.community.is_empty());
                reports += 1;
            })
            .unwrap();

        // The small frame is dropped.
        assert_eq!(frames, 3);
        assert_eq!(reports, 2);

        // A stopped loop doesn't read frames.
        let mut source = FramesQueue::new([table_image(WIDTH, HEIGHT)]);
        stop.store(true, Ordering::Relaxed);
        assert_eq!(supervisor.run(&mut source, &stop, |_| {}).unwrap(), 0);
    }

    #[test]
    fn invalid_config() {
        let mut config = Config::default();
        config.frame_loop.fps = 0;
        let err = Supervisor::new(config, Arc::new(templates())).unwrap_err();
        assert_eq!(err, ConfigError::Fps);
    }
}
