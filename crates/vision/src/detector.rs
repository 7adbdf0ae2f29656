// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Cards detection.
use image::GrayImage;
use log::debug;
use std::sync::Arc;

use crate::{
    locate::{CardContour, Locator, LocatorConfig},
    rectify::{Orientation, RectifiedCard},
    templates::{MatchConfig, SymbolsMatch, TemplateSet},
};
use pokevisor_cards::Card;

/// A card found in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The identified card, rank and suit may be unknown.
    pub card: Card,
    /// The difference from the closest rank template.
    pub rank_diff: u32,
    /// The difference from the closest suit template.
    pub suit_diff: u32,
    /// The card center in frame coordinates.
    pub center: [f32; 2],
    /// The frame points of the card top left, top right, bottom right, and
    /// bottom left corners.
    pub corners: [[f32; 2]; 4],
    /// How the card lies on the table.
    pub orientation: Orientation,
}

/// Identifies a located card.
///
/// Returns `None` if the contour cannot be rectified.
pub fn identify(
    contour: &CardContour,
    gray: &GrayImage,
    templates: &TemplateSet,
    config: &MatchConfig,
) -> Option<Detection> {
    let Some(card) = RectifiedCard::new(gray, contour) else {
        debug!("Dropping malformed contour at {:?}", contour.bounds().center());
        return None;
    };

    let SymbolsMatch {
        rank,
        suit,
        rank_diff,
        suit_diff,
    } = templates.match_symbols(&card.symbols(), config);

    Some(Detection {
        card: Card::new(rank, suit),
        rank_diff,
        suit_diff,
        center: card.center(),
        corners: card.corners,
        orientation: card.orientation,
    })
}

/// Locates and identifies cards.
#[derive(Debug, Clone)]
pub struct CardDetector {
    locator: Locator,
    matching: MatchConfig,
    templates: Arc<TemplateSet>,
}

impl CardDetector {
    /// Creates a detector with shared templates.
    pub fn new(locator: LocatorConfig, matching: MatchConfig, templates: Arc<TemplateSet>) -> Self {
        Self {
            locator: Locator::new(locator),
            matching,
            templates,
        }
    }

    /// The reference templates.
    pub fn templates(&self) -> &Arc<TemplateSet> {
        &self.templates
    }

    /// Binarizes a frame for [CardDetector::detect_binary].
    pub fn binarize(&self, gray: &GrayImage) -> GrayImage {
        self.locator.binarize(gray)
    }

    /// Detects the cards in a frame or in the masked part of a frame.
    ///
    /// Cards are returned largest first, contours that cannot be rectified
    /// are dropped.
    pub fn detect(&self, gray: &GrayImage, mask: Option<&GrayImage>) -> Vec<Detection> {
        self.detect_binary(gray, &self.binarize(gray), mask)
    }

    /// Detects the cards in a frame using its binarized image, the binarized
    /// image is shared by all the regions of a frame.
    pub fn detect_binary(
        &self,
        gray: &GrayImage,
        binary: &GrayImage,
        mask: Option<&GrayImage>,
    ) -> Vec<Detection> {
        self.locator
            .locate_binary(binary, mask)
            .iter()
            .filter_map(|contour| identify(contour, gray, &self.templates, &self.matching))
            .collect()
    }
}
