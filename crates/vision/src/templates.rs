// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Reference templates and symbols matching.
use image::{
    GrayImage,
    imageops::{self, FilterType},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::rectify::{RANK_SIZE, SUIT_SIZE, Symbols};
use pokevisor_cards::{Card, Rank, Suit};

/// Score of a symbol that could not be matched.
pub const NO_MATCH: u32 = u32::MAX;

/// Templates loading errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A template file could not be read or decoded.
    #[error("cannot load template {path}: {source}")]
    Image {
        /// The template file.
        path: PathBuf,
        /// The decoding error.
        #[source]
        source: image::ImageError,
    },
    /// A template is missing from the set.
    #[error("missing {0} template")]
    Missing(&'static str),
    /// A symbol has more than one template.
    #[error("duplicate {0} template")]
    Duplicate(&'static str),
    /// A template image has no pixels.
    #[error("empty {0} template")]
    Empty(&'static str),
}

/// Symbols matching thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// A rank matches only if its difference is below this value.
    pub rank_diff_max: u32,
    /// A suit matches only if its difference is below this value.
    pub suit_diff_max: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rank_diff_max: 2000,
            suit_diff_max: 700,
        }
    }
}

/// The result of matching a card symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolsMatch {
    /// The matched rank, unknown if no template is close enough.
    pub rank: Rank,
    /// The matched suit, unknown if no template is close enough.
    pub suit: Suit,
    /// The difference from the closest rank template.
    pub rank_diff: u32,
    /// The difference from the closest suit template.
    pub suit_diff: u32,
}

impl SymbolsMatch {
    /// A match for symbols that could not be extracted.
    pub const UNKNOWN: SymbolsMatch = SymbolsMatch {
        rank: Rank::Unknown,
        suit: Suit::Unknown,
        rank_diff: NO_MATCH,
        suit_diff: NO_MATCH,
    };

    /// The matched card.
    pub fn card(&self) -> Card {
        Card::new(self.rank, self.suit)
    }
}

/// The 13 rank and 4 suit reference images.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    ranks: Vec<(Rank, GrayImage)>,
    suits: Vec<(Suit, GrayImage)>,
}

impl TemplateSet {
    /// Builds a set from in memory images.
    ///
    /// Every rank and suit must have exactly one template, images are resized
    /// to the symbols sizes.
    pub fn from_images<R, S>(ranks: R, suits: S) -> Result<Self, TemplateError>
    where
        R: IntoIterator<Item = (Rank, GrayImage)>,
        S: IntoIterator<Item = (Suit, GrayImage)>,
    {
        let ranks = collect(ranks, Rank::ranks(), Rank::name, RANK_SIZE)?;
        let suits = collect(suits, Suit::suits(), Suit::name, SUIT_SIZE)?;
        Ok(Self { ranks, suits })
    }

    /// Loads the templates from a directory.
    ///
    /// Templates are files named after the symbol, like `ace.jpg` or
    /// `spades.png`, the images are converted to grayscale.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();

        let ranks = Rank::ranks()
            .map(|rank| Ok((rank, load_template(dir, rank.name())?)))
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let suits = Suit::suits()
            .map(|suit| Ok((suit, load_template(dir, suit.name())?)))
            .collect::<Result<Vec<_>, TemplateError>>()?;

        info!("Loaded templates from {}", dir.display());
        Self::from_images(ranks, suits)
    }

    /// Finds the closest rank template.
    pub fn best_rank(&self, symbol: &GrayImage) -> (Rank, u32) {
        best_match(&self.ranks, symbol).unwrap_or((Rank::Unknown, NO_MATCH))
    }

    /// Finds the closest suit template.
    pub fn best_suit(&self, symbol: &GrayImage) -> (Suit, u32) {
        best_match(&self.suits, symbol).unwrap_or((Suit::Unknown, NO_MATCH))
    }

    /// Matches a card symbols.
    ///
    /// If either symbol is missing the card is unknown.
    pub fn match_symbols(&self, symbols: &Symbols, config: &MatchConfig) -> SymbolsMatch {
        let (Some(rank), Some(suit)) = (&symbols.rank, &symbols.suit) else {
            return SymbolsMatch::UNKNOWN;
        };

        let (best_rank, rank_diff) = self.best_rank(rank);
        let (best_suit, suit_diff) = self.best_suit(suit);

        let result = SymbolsMatch {
            rank: if rank_diff < config.rank_diff_max {
                best_rank
            } else {
                Rank::Unknown
            },
            suit: if suit_diff < config.suit_diff_max {
                best_suit
            } else {
                Suit::Unknown
            },
            rank_diff,
            suit_diff,
        };

        debug!(
            "Matched {} rank diff {} suit diff {}",
            result.card(),
            result.rank_diff,
            result.suit_diff
        );

        result
    }

    /// The rank templates.
    pub fn ranks(&self) -> impl Iterator<Item = (Rank, &GrayImage)> {
        self.ranks.iter().map(|(r, img)| (*r, img))
    }

    /// The suit templates.
    pub fn suits(&self) -> impl Iterator<Item = (Suit, &GrayImage)> {
        self.suits.iter().map(|(s, img)| (*s, img))
    }
}

/// Sum of the absolute pixel differences divided by 255.
///
/// The images must have the same size.
pub fn difference(a: &GrayImage, b: &GrayImage) -> u32 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let sum = a
        .pixels()
        .zip(b.pixels())
        .map(|(p, q)| p[0].abs_diff(q[0]) as u64)
        .sum::<u64>();

    u32::try_from(sum / 255).unwrap_or(NO_MATCH)
}

fn best_match<T: Copy>(templates: &[(T, GrayImage)], symbol: &GrayImage) -> Option<(T, u32)> {
    let (w, h) = templates.first()?.1.dimensions();
    let resized;
    let symbol = if symbol.dimensions() == (w, h) {
        symbol
    } else {
        resized = imageops::resize(symbol, w, h, FilterType::Triangle);
        &resized
    };

    let mut best: Option<(T, u32)> = None;
    for (value, template) in templates {
        let diff = difference(symbol, template);
        if best.is_none_or(|(_, d)| diff < d) {
            best = Some((*value, diff));
        }
    }

    best
}

fn collect<T, I>(
    images: I,
    expected: impl Iterator<Item = T>,
    name: fn(&T) -> &'static str,
    size: (u32, u32),
) -> Result<Vec<(T, GrayImage)>, TemplateError>
where
    T: Copy + PartialEq,
    I: IntoIterator<Item = (T, GrayImage)>,
{
    let images = images.into_iter().collect::<Vec<_>>();

    let mut templates = Vec::with_capacity(images.len());
    for value in expected {
        let mut matching = images.iter().filter(|(v, _)| *v == value);
        let (_, image) = matching.next().ok_or(TemplateError::Missing(name(&value)))?;
        if matching.next().is_some() {
            return Err(TemplateError::Duplicate(name(&value)));
        }

        if image.width() == 0 || image.height() == 0 {
            return Err(TemplateError::Empty(name(&value)));
        }

        let image = if image.dimensions() == size {
            image.clone()
        } else {
            imageops::resize(image, size.0, size.1, FilterType::Triangle)
        };

        templates.push((value, image));
    }

    Ok(templates)
}

fn load_template(dir: &Path, name: &'static str) -> Result<GrayImage, TemplateError> {
    let mut capitalized = name.to_string();
    capitalized[..1].make_ascii_uppercase();

    let path = [name, capitalized.as_str()]
        .iter()
        .flat_map(|stem| ["png", "jpg", "jpeg"].map(|ext| dir.join(format!("{stem}.{ext}"))))
        .find(|path| path.is_file())
        .ok_or(TemplateError::Missing(name))?;

    let image = image::open(&path).map_err(|source| TemplateError::Image {
        path: path.clone(),
        source,
    })?;

    Ok(image.to_luma8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{card_for, templates};
    use image::Luma;

    #[test]
    fn difference_score() {
        let black = GrayImage::new(10, 10);
        let white = GrayImage::from_pixel(10, 10, Luma([255]));
        assert_eq!(difference(&black, &black), 0);
        assert_eq!(difference(&black, &white), 100);

        let gray = GrayImage::from_pixel(10, 10, Luma([100]));
        // 100 * 100 / 255
        assert_eq!(difference(&black, &gray), 39);
    }

    #[test]
    fn self_match() {
        let templates = templates();
        for (rank, template) in templates.ranks() {
            assert_eq!(templates.best_rank(template), (rank, 0));
        }

        for (suit, template) in templates.suits() {
            assert_eq!(templates.best_suit(template), (suit, 0));
        }
    }

    #[test]
    fn match_card_symbols() {
        let templates = templates();
        let config = MatchConfig::default();

        for card in [
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::Deuce, Suit::Diamonds),
        ] {
            let symbols = Symbols::extract(&card_for(card.rank(), card.suit()));
            let result = templates.match_symbols(&symbols, &config);
            assert_eq!(result.card(), card);
            assert_eq!((result.rank_diff, result.suit_diff), (0, 0));
        }
    }

    #[test]
    fn thresholds() {
        let templates = templates();
        let symbols = Symbols::extract(&card_for(Rank::King, Suit::Clubs));

        // Thresholds are exclusive.
        let config = MatchConfig {
            rank_diff_max: 0,
            suit_diff_max: 1,
        };

        let result = templates.match_symbols(&symbols, &config);
        assert_eq!(result.rank, Rank::Unknown);
        assert_eq!(result.suit, Suit::Clubs);
        assert_eq!(result.rank_diff, 0);
    }

    #[test]
    fn missing_symbols() {
        let templates = templates();
        let symbols = Symbols {
            rank: Symbols::extract(&card_for(Rank::King, Suit::Clubs)).rank,
            suit: None,
        };

        let result = templates.match_symbols(&symbols, &MatchConfig::default());
        assert_eq!(result, SymbolsMatch::UNKNOWN);
        assert!(result.card().is_unknown());
    }

    #[test]
    fn incomplete_set() {
        let templates = templates();
        let ranks = templates
            .ranks()
            .filter(|(r, _)| *r != Rank::Queen)
            .map(|(r, img)| (r, img.clone()))
            .collect::<Vec<_>>();
        let suits = templates.suits().map(|(s, img)| (s, img.clone())).collect::<Vec<_>>();

        let err = TemplateSet::from_images(ranks.clone(), suits.clone()).unwrap_err();
        assert!(matches!(err, TemplateError::Missing("queen")));

        let mut duplicated = suits.clone();
        duplicated.push(suits[0].clone());
        let mut all_ranks = ranks;
        all_ranks.push((Rank::Queen, GrayImage::new(5, 5)));
        let err = TemplateSet::from_images(all_ranks, duplicated).unwrap_err();
        assert!(matches!(err, TemplateError::Duplicate("clubs")));
    }

    #[test]
    fn load_missing_dir() {
        let err = TemplateSet::load_dir("/nonexistent/templates").unwrap_err();
        assert!(matches!(err, TemplateError::Missing("two")));
    }
}
