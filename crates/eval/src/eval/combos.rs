// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Lazy hand enumeration.
use crate::Card;

/// Iterator over the k-subsets of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    /// Creates an iterator over the k-subsets of `0..n`.
    ///
    /// Yields nothing if `k > n` and a single empty subset if `k == 0`.
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }

        // Find the rightmost index that can still move right.
        let k = self.indices.len();
        let Some(pos) = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) else {
            self.done = true;
            return None;
        };

        self.indices[pos] += 1;
        for i in (pos + 1)..k {
            self.indices[i] = self.indices[i - 1] + 1;
        }

        Some(self.indices.clone())
    }
}

/// The candidate hands for a player.
///
/// Every split of a hand into `5 - i` hole cards and `i` community cards for
/// `i` in `0..=5` is a 5-subset of the hole and community cards together, so
/// the candidates are the 5-subsets of all the available cards. With less
/// than 5 cards available the only candidate is the full set.
///
/// The iterator is restartable by cloning and holds no state other than the
/// current position.
#[derive(Debug, Clone)]
pub struct Hands {
    cards: Vec<Card>,
    combos: Combinations,
}

impl Hands {
    /// The size of a complete poker hand.
    pub const HAND_SIZE: usize = 5;

    /// Creates an iterator over the hands made from the hole and community cards.
    pub fn new(hole: &[Card], community: &[Card]) -> Self {
        let cards = hole.iter().chain(community).copied().collect::<Vec<_>>();
        let k = cards.len().min(Self::HAND_SIZE);
        let combos = Combinations::new(cards.len(), k);
        Self { cards, combos }
    }
}

impl Iterator for Hands {
    type Item = Vec<Card>;

    fn next(&mut self) -> Option<Self::Item> {
        self.combos
            .next()
            .map(|idx| idx.into_iter().map(|i| self.cards[i]).collect())
    }
}
