// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! PokeVisor cards types.
//!
//! This crate define the types for cards recognized on a table:
//!
//! ```
//! # use pokevisor_cards::{Card, Rank, Suit};
//! let ah = Card::new(Rank::Ace, Suit::Hearts);
//! let kd: Card = "KD".parse().unwrap();
//! assert!(!ah.is_unknown());
//! assert!(kd < ah);
//! ```
//!
//! A card that the recognizer could not match has an unknown rank or suit:
//!
//! ```
//! # use pokevisor_cards::{Card, Rank, Suit};
//! let card = Card::new(Rank::Queen, Suit::Unknown);
//! assert!(card.is_unknown());
//! assert_eq!(card.to_string(), "Q?");
//! ```
//!
//! The [Deck] type iterates the standard 52 cards deck, for example to visit
//! all 5 cards hands:
//!
//! ```no_run
//! # use pokevisor_cards::Deck;
//! let mut counter = 0;
//! Deck::default().for_each(5, |hand| {
//!     counter += 1;
//! });
//! assert_eq!(counter, 2_598_960);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod cards;
pub use cards::{Card, Deck, ParseCardError, Rank, Suit};
