// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker hand evaluator.
//!
//! The evaluator classifies a hand into a [HandCategory] by testing the hand
//! patterns from the strongest to the weakest, and finds the best category for
//! a player by trying every 5 cards hand made from the player hole cards and
//! the community cards (see [Hands]).
//!
//! Hands are compared by category only, two full houses have the same value
//! and there is no kicker comparison. Aces are high only, so the wheel (ace
//! to five) is not a straight.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Card;

mod combos;
pub use combos::{Combinations, Hands};

/// A poker hand category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    /// High card.
    HighCard = 0,
    /// One pair.
    OnePair,
    /// Two pair.
    TwoPair,
    /// Three of a kind.
    ThreeOfAKind,
    /// Straight.
    Straight,
    /// Flush.
    Flush,
    /// Full house.
    FullHouse,
    /// Four of a kind.
    FourOfAKind,
    /// Straight flush, the royal hand.
    StraightFlush,
}

impl HandCategory {
    /// Returns all categories from the weakest to the strongest.
    pub fn categories() -> impl DoubleEndedIterator<Item = HandCategory> {
        use HandCategory::*;
        [
            HighCard,
            OnePair,
            TwoPair,
            ThreeOfAKind,
            Straight,
            Flush,
            FullHouse,
            FourOfAKind,
            StraightFlush,
        ]
        .into_iter()
    }

    /// Classifies a hand.
    ///
    /// A complete hand has 5 cards, a shorter hand can only make one or two
    /// pairs, trips, and quads. Cards must not be unknown.
    pub fn classify(hand: &[Card]) -> HandCategory {
        debug_assert!(hand.iter().all(|c| !c.is_unknown()), "{hand:?}");

        let shape = Shape::new(hand);
        if shape.is_straight_flush() {
            HandCategory::StraightFlush
        } else if shape.has_count(4) {
            HandCategory::FourOfAKind
        } else if shape.is_full_house() {
            HandCategory::FullHouse
        } else if shape.is_flush() {
            HandCategory::Flush
        } else if shape.is_straight() {
            HandCategory::Straight
        } else if shape.has_count(3) {
            HandCategory::ThreeOfAKind
        } else if shape.is_two_pair() {
            HandCategory::TwoPair
        } else if shape.is_pair() {
            HandCategory::OnePair
        } else {
            HandCategory::HighCard
        }
    }

    /// Returns the best category for the given hole and community cards.
    pub fn best(hole: &[Card], community: &[Card]) -> HandCategory {
        Self::best_with_hand(hole, community).0
    }

    /// Returns the best category and the first hand that makes it.
    pub fn best_with_hand(hole: &[Card], community: &[Card]) -> (HandCategory, Vec<Card>) {
        let mut best = (HandCategory::HighCard, Vec::new());
        for (idx, hand) in Hands::new(hole, community).enumerate() {
            let category = Self::classify(&hand);
            if idx == 0 || category > best.0 {
                best = (category, hand);
            }
        }

        best
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        };

        write!(f, "{s}")
    }
}

/// Returns the best hand category for a player.
///
/// Short for [HandCategory::best].
pub fn best_hand(hole: &[Card], community: &[Card]) -> HandCategory {
    HandCategory::best(hole, community)
}

/// Rank and suit multiset of a hand.
struct Shape {
    len: usize,
    /// Rank values sorted ascending.
    values: Vec<u8>,
    /// Occurrences of each distinct rank sorted ascending.
    counts: Vec<u8>,
    same_suit: bool,
}

impl Shape {
    /// The only straight that is not checked by consecutive values.
    const BROADWAY: [u8; 5] = [10, 11, 12, 13, 14];

    fn new(hand: &[Card]) -> Self {
        let mut values = hand
            .iter()
            .map(|c| c.rank().value().unwrap_or_default())
            .collect::<Vec<_>>();
        values.sort_unstable();

        let mut counts = Vec::with_capacity(values.len());
        for chunk in values.chunk_by(|a, b| a == b) {
            counts.push(chunk.len() as u8);
        }
        counts.sort_unstable();

        let same_suit = hand.windows(2).all(|w| w[0].suit() == w[1].suit());

        Self {
            len: hand.len(),
            values,
            counts,
            same_suit,
        }
    }

    fn is_complete(&self) -> bool {
        self.len == Hands::HAND_SIZE
    }

    fn is_flush(&self) -> bool {
        self.is_complete() && self.same_suit
    }

    fn is_straight(&self) -> bool {
        if !self.is_complete() {
            return false;
        }

        if self.values == Self::BROADWAY {
            return true;
        }

        self.values.windows(2).all(|w| w[0] + 1 == w[1])
    }

    fn is_straight_flush(&self) -> bool {
        self.is_flush() && self.is_straight()
    }

    fn has_count(&self, n: u8) -> bool {
        self.counts.contains(&n)
    }

    fn is_full_house(&self) -> bool {
        self.counts == [2, 3]
    }

    /// Counts [1, 2, 2] for 5 cards and [2, 2] for 4 cards.
    fn is_two_pair(&self) -> bool {
        self.pairs() == 2 && self.counts.iter().all(|&c| c <= 2)
    }

    fn is_pair(&self) -> bool {
        // One duplicate only.
        self.counts.len() + 1 == self.len
    }

    fn pairs(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 2).count()
    }
}
