// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Card localization.
//!
//! Cards are found as the outer borders of the adaptive threshold foreground
//! that have a card sized area and simplify to a quadrilateral. Borders found
//! inside another card, like the frame printed around a face card picture, are
//! removed.
use image::GrayImage;
use imageproc::{
    contours::{BorderType, find_contours},
    geometry::{arc_length, contour_area},
    point::Point,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    binarize,
    geometry::{self, Rect},
};

/// Card localization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Smallest area in pixels of a card contour, exclusive.
    pub min_area: f64,
    /// Largest area in pixels of a card contour, exclusive.
    pub max_area: f64,
    /// Gaussian blur sigma applied before thresholding.
    pub blur_sigma: f32,
    /// Radius of the adaptive threshold window.
    pub threshold_radius: u32,
    /// Adaptive threshold offset from the window mean.
    pub threshold_offset: i32,
    /// Polygon simplification tolerance as a fraction of the perimeter.
    pub approx_tolerance: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            min_area: 12_500.0,
            max_area: 240_000.0,
            blur_sigma: 0.8,
            threshold_radius: 2,
            threshold_offset: 2,
            approx_tolerance: 0.01,
        }
    }
}

/// A contour found in a frame.
#[derive(Debug, Clone)]
pub struct CardContour {
    points: Vec<Point<i32>>,
    polygon: Vec<Point<i32>>,
    area: f64,
    bounds: Rect,
    is_card: bool,
}

impl CardContour {
    /// The border points in frame coordinates.
    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    /// The simplified border polygon, a card has 4 vertices.
    pub fn polygon(&self) -> &[Point<i32>] {
        &self.polygon
    }

    /// The enclosed area.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// The bounding rectangle.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Checks if this contour has the shape and size of a card.
    pub fn is_card(&self) -> bool {
        self.is_card
    }

    /// Checks if all the points of this contour are inside or on the border
    /// of the other contour.
    pub fn is_inside(&self, other: &CardContour) -> bool {
        if !other.bounds.contains(&self.bounds) {
            return false;
        }

        let outline = geometry::to_f64(&other.points);
        self.points
            .iter()
            .all(|p| geometry::polygon_test(&outline, [p.x as f64, p.y as f64]) >= 0)
    }
}

/// Finds cards contours in grayscale frames.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    config: LocatorConfig,
}

impl Locator {
    /// Creates a locator with the given configuration.
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// The locator configuration.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Binarizes a frame, card borders and the table around them become
    /// foreground.
    ///
    /// The result can be shared by the [Locator::locate_binary] calls for
    /// the regions of the frame.
    pub fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let blurred = binarize::gaussian_blur(gray, self.config.blur_sigma);
        binarize::adaptive_threshold_inv(
            &blurred,
            self.config.threshold_radius,
            self.config.threshold_offset,
        )
    }

    /// Finds the top level contours of a frame sorted by area, largest first.
    ///
    /// If a mask is given the foreground outside the mask is cleared before
    /// tracing the contours, so that cards across the mask border are cut at
    /// the border.
    pub fn find_candidates(&self, gray: &GrayImage, mask: Option<&GrayImage>) -> Vec<CardContour> {
        self.binary_candidates(&self.binarize(gray), mask)
    }

    /// Finds the top level contours of a binarized frame, see
    /// [Locator::find_candidates].
    pub fn binary_candidates(
        &self,
        binary: &GrayImage,
        mask: Option<&GrayImage>,
    ) -> Vec<CardContour> {
        if binary.width() == 0 || binary.height() == 0 {
            return Vec::new();
        }

        let masked;
        let binary = match mask {
            Some(mask) => {
                let mut image = binary.clone();
                binarize::apply_mask(&mut image, mask);
                masked = image;
                &masked
            }
            None => binary,
        };

        let mut candidates = find_contours::<i32>(binary)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter_map(|c| self.candidate(c.points))
            .collect::<Vec<_>>();

        candidates.sort_by(|a, b| b.area.total_cmp(&a.area));
        candidates
    }

    /// Finds the cards in a frame.
    ///
    /// Returns one contour for each card sorted by area, largest first.
    pub fn locate(&self, gray: &GrayImage, mask: Option<&GrayImage>) -> Vec<CardContour> {
        self.locate_binary(&self.binarize(gray), mask)
    }

    /// Finds the cards in a frame binarized with [Locator::binarize].
    pub fn locate_binary(&self, binary: &GrayImage, mask: Option<&GrayImage>) -> Vec<CardContour> {
        let mut cards = self
            .binary_candidates(binary, mask)
            .into_iter()
            .filter(CardContour::is_card)
            .collect::<Vec<_>>();

        remove_nested(&mut cards);

        debug!("Located {} cards", cards.len());
        cards
    }

    fn candidate(&self, points: Vec<Point<i32>>) -> Option<CardContour> {
        let bounds = Rect::bounding(&points)?;
        let area = contour_area(&points);

        let sized = area > self.config.min_area && area < self.config.max_area;
        let polygon = if sized {
            let epsilon = self.config.approx_tolerance * arc_length(&points, true);
            geometry::approx_polygon(&points, epsilon)
        } else {
            Vec::new()
        };

        let is_card = sized && polygon.len() == 4;
        trace!(
            "Contour at {:?} area {area} vertices {} card {is_card}",
            bounds.center(),
            polygon.len()
        );

        Some(CardContour {
            points,
            polygon,
            area,
            bounds,
            is_card,
        })
    }
}

/// Removes the contours that are inside another contour until none is left.
fn remove_nested(cards: &mut Vec<CardContour>) {
    loop {
        let nested = (0..cards.len()).find(|&i| {
            (0..cards.len()).any(|j| i != j && cards[i].is_inside(&cards[j]))
        });

        match nested {
            Some(idx) => {
                trace!("Removing nested contour at {:?}", cards[idx].bounds.center());
                cards.remove(idx);
            }
            None => break,
        }
    }
}
