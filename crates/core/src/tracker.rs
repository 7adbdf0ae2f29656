// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Round state tracking.
//!
//! The camera sees cards appear one at a time and detections flicker while
//! hands move over the table, the [RoundTracker] only reports hands once all
//! the cards on the table are recognized.
use log::{debug, info};
use serde::{Deserialize, Serialize};

use pokevisor_cards::Card;
use pokevisor_eval::HandCategory;

/// The cards seen in every region of the table in one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    community: Vec<Card>,
    players: Vec<Vec<Card>>,
}

impl Observation {
    /// Creates an observation, cards order within a region doesn't matter.
    pub fn new(mut community: Vec<Card>, mut players: Vec<Vec<Card>>) -> Self {
        community.sort();
        players.iter_mut().for_each(|cards| cards.sort());
        Self { community, players }
    }

    /// The community cards.
    pub fn community(&self) -> &[Card] {
        &self.community
    }

    /// The cards in front of each player.
    pub fn players(&self) -> &[Vec<Card>] {
        &self.players
    }

    /// Checks if every region has cards and all the cards are known.
    pub fn is_uncovered(&self) -> bool {
        std::iter::once(&self.community)
            .chain(self.players.iter())
            .all(|cards| !cards.is_empty() && cards.iter().all(|c| !c.is_unknown()))
    }
}

/// The best hand of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHand {
    /// The player cards.
    pub cards: Vec<Card>,
    /// The best category made with the community cards.
    pub category: HandCategory,
}

/// The hands of all players for a resolved table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResults {
    /// The community cards.
    pub community: Vec<Card>,
    /// The hand of each player.
    pub players: Vec<PlayerHand>,
}

impl HandResults {
    /// Evaluates the players hands of an uncovered observation.
    pub fn evaluate(observation: &Observation) -> Self {
        let community = observation.community().to_vec();
        let players = observation
            .players()
            .iter()
            .map(|cards| PlayerHand {
                cards: cards.clone(),
                category: HandCategory::best(cards, &community),
            })
            .collect();

        Self { community, players }
    }
}

/// The round phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Some region has no cards or has unknown cards.
    Collecting,
    /// All cards are known and the hands have been reported.
    Resolved,
}

/// Debounces observations and reports hands when the table is resolved.
#[derive(Debug)]
pub struct RoundTracker {
    phase: RoundPhase,
    last: Option<Observation>,
    results: Option<HandResults>,
}

impl Default for RoundTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundTracker {
    /// Creates a tracker for a new round.
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Collecting,
            last: None,
            results: None,
        }
    }

    /// The current round phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Checks if all the cards on the table have been recognized.
    pub fn is_uncovered(&self) -> bool {
        self.phase == RoundPhase::Resolved
    }

    /// The last stored observation.
    pub fn last_observation(&self) -> Option<&Observation> {
        self.last.as_ref()
    }

    /// The last reported hands.
    pub fn last_results(&self) -> Option<&HandResults> {
        self.results.as_ref()
    }

    /// Updates the round with a new observation.
    ///
    /// Returns the players hands when the table becomes resolved or when the
    /// cards of a resolved table change.
    pub fn update(&mut self, observation: Observation) -> Option<HandResults> {
        let uncovered = observation.is_uncovered();

        match self.phase {
            RoundPhase::Collecting if uncovered => {
                info!("Round resolved");
                self.phase = RoundPhase::Resolved;
                Some(self.emit(observation))
            }
            RoundPhase::Collecting => {
                self.last = Some(observation);
                None
            }
            RoundPhase::Resolved if !uncovered => {
                debug!("Ignoring partial observation");
                None
            }
            RoundPhase::Resolved if self.last.as_ref() == Some(&observation) => None,
            RoundPhase::Resolved => {
                info!("Table cards changed");
                Some(self.emit(observation))
            }
        }
    }

    /// Resets the tracker for a new round.
    pub fn reset(&mut self) {
        info!("New round");
        self.phase = RoundPhase::Collecting;
        self.last = None;
        self.results = None;
    }

    fn emit(&mut self, observation: Observation) -> HandResults {
        let results = HandResults::evaluate(&observation);
        for (idx, hand) in results.players.iter().enumerate() {
            info!("Player {} {:?} {}", idx + 1, hand.cards, hand.category);
        }

        self.last = Some(observation);
        self.results = Some(results.clone());
        results
    }
}
