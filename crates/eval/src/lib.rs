// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! PokeVisor hand evaluator.
//!
//! Finds the best poker hand category a player can make with the hole cards
//! in front of them and the community cards revealed on the table, trying all
//! the 5 cards hands made from these cards:
//!
//! ```
//! # use pokevisor_eval::*;
//! let hole: Vec<Card> = ["5S", "5C"].iter().map(|c| c.parse().unwrap()).collect();
//! let board: Vec<Card> = ["5D", "9H", "9C"].iter().map(|c| c.parse().unwrap()).collect();
//! assert_eq!(best_hand(&hole, &board), HandCategory::FullHouse);
//! assert_eq!(best_hand(&hole, &board[1..]), HandCategory::TwoPair);
//! ```
//!
//! Hands are ranked by [HandCategory] only, without kickers.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
pub mod eval;
pub use eval::{HandCategory, Hands, best_hand};

// Reexport cards types.
pub use pokevisor_cards::{Card, Deck, Rank, Suit};
