// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Card rectification and symbols extraction.
//!
//! A located card is warped to a canonical upright image, then the rank and
//! the suit symbols are cut from the zoomed top left corner of the card.
use image::{
    GrayImage, Luma,
    imageops::{self, FilterType},
};
use imageproc::{
    contours::{BorderType, find_contours},
    geometric_transformations::{Interpolation, Projection, warp_into},
    geometry::contour_area,
    point::Point,
};
use log::trace;

use crate::{
    binarize,
    geometry::{self, Rect},
    locate::CardContour,
};

/// Size of the perspective corrected card.
pub const WARP_SIZE: (u32, u32) = (200, 300);

/// Size of the canonical card image.
pub const CARD_SIZE: (u32, u32) = (256, 360);

/// Size of the card corner with the rank and the suit symbols.
pub const CORNER_SIZE: (u32, u32) = (64, 160);

/// Corner zoom factor.
pub const CORNER_ZOOM: u32 = 4;

/// Size of a rank symbol.
pub const RANK_SIZE: (u32, u32) = (70, 125);

/// Size of a suit symbol.
pub const SUIT_SIZE: (u32, u32) = (70, 100);

/// Symbols are pixels darker than the card white level minus this offset.
pub const WHITE_OFFSET: u8 = 30;

/// How a card lies on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Long side vertical.
    Portrait,
    /// Long side horizontal.
    Landscape,
    /// Rotated about 45 degrees counterclockwise.
    TiltedLeft,
    /// Rotated about 45 degrees clockwise.
    TiltedRight,
}

impl Orientation {
    /// Classifies a card by the aspect ratio of its bounding rectangle.
    ///
    /// Cards that are neither clearly portrait nor landscape are tilted, the
    /// tilt side depends on the corners positions.
    fn from_bounds(bounds: &Rect, corners: &[[f32; 2]; 4]) -> Self {
        let (w, h) = (bounds.width as f32, bounds.height as f32);
        if w <= 0.8 * h {
            Orientation::Portrait
        } else if w >= 1.2 * h {
            Orientation::Landscape
        } else {
            let [_, right, _, left] = clockwise_from_top(corners);
            if left[1] <= right[1] {
                Orientation::TiltedLeft
            } else {
                Orientation::TiltedRight
            }
        }
    }
}

/// A card warped to the canonical size.
#[derive(Debug, Clone)]
pub struct RectifiedCard {
    /// The upright card image of [CARD_SIZE].
    pub image: GrayImage,
    /// The frame corners mapped to the card top left, top right, bottom
    /// right, and bottom left corners.
    pub corners: [[f32; 2]; 4],
    /// How the card lies on the table.
    pub orientation: Orientation,
}

impl RectifiedCard {
    /// Rectifies a located card.
    ///
    /// Returns `None` if the contour is not a quadrilateral or its corners
    /// don't define a valid perspective transform.
    pub fn new(gray: &GrayImage, contour: &CardContour) -> Option<Self> {
        let (corners, orientation) = order_corners(contour.polygon(), &contour.bounds())?;
        let image = warp_card(gray, &corners)?;
        Some(Self {
            image,
            corners,
            orientation,
        })
    }

    /// The card center in frame coordinates.
    pub fn center(&self) -> [f32; 2] {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), c| (sx + c[0], sy + c[1]));
        [sx / 4.0, sy / 4.0]
    }

    /// Extracts the rank and the suit symbols.
    pub fn symbols(&self) -> Symbols {
        Symbols::extract(&self.image)
    }
}

/// Orders the corners of a card quadrilateral.
///
/// Returns the frame points that map to the card top left, top right, bottom
/// right, and bottom left corners, or `None` if the polygon doesn't have 4
/// distinct corners.
pub fn order_corners(polygon: &[Point<i32>], bounds: &Rect) -> Option<([[f32; 2]; 4], Orientation)> {
    let points: [[f32; 2]; 4] = polygon
        .iter()
        .map(|p| [p.x as f32, p.y as f32])
        .collect::<Vec<_>>()
        .try_into()
        .ok()?;

    let orientation = Orientation::from_bounds(bounds, &points);
    let ordered = match orientation {
        Orientation::Portrait | Orientation::Landscape => {
            let sum = |p: &[f32; 2]| p[0] + p[1];
            let diff = |p: &[f32; 2]| p[1] - p[0];
            let tl = argmin(&points, sum);
            let br = argmin(&points, |p| -sum(p));
            let tr = argmin(&points, diff);
            let bl = argmin(&points, |p| -diff(p));

            let indices = [tl, tr, br, bl];
            if (1..4).any(|i| indices[..i].contains(&indices[i])) {
                return None;
            }

            let [tl, tr, br, bl] = indices.map(|i| points[i]);
            if orientation == Orientation::Portrait {
                [tl, tr, br, bl]
            } else {
                // Turn the card so that its long side is vertical.
                [bl, tl, tr, br]
            }
        }
        Orientation::TiltedLeft => {
            let [top, right, bottom, left] = clockwise_from_top(&points);
            [left, top, right, bottom]
        }
        Orientation::TiltedRight => clockwise_from_top(&points),
    };

    Some((ordered, orientation))
}

/// Warps the card corners to the canonical card image.
pub fn warp_card(gray: &GrayImage, corners: &[[f32; 2]; 4]) -> Option<GrayImage> {
    // A flat quadrilateral would collapse the card.
    let outline = corners.map(|[x, y]| [x as f64, y as f64]);
    if geometry::polygon_area(&outline) < 1.0 {
        return None;
    }

    let (w, h) = WARP_SIZE;
    let from = corners.map(|[x, y]| (x, y));
    let to = [
        (0.0, 0.0),
        ((w - 1) as f32, 0.0),
        ((w - 1) as f32, (h - 1) as f32),
        (0.0, (h - 1) as f32),
    ];

    let projection = Projection::from_control_points(from, to)?;
    let mut warped = GrayImage::new(w, h);
    warp_into(gray, &projection, Interpolation::Bilinear, Luma([0]), &mut warped);

    let (w, h) = CARD_SIZE;
    Some(imageops::resize(&warped, w, h, FilterType::Triangle))
}

/// The symbols cut from the corner of a card.
#[derive(Debug, Clone)]
pub struct Symbols {
    /// The binarized rank symbol of [RANK_SIZE].
    pub rank: Option<GrayImage>,
    /// The binarized suit symbol of [SUIT_SIZE].
    pub suit: Option<GrayImage>,
}

impl Symbols {
    /// Cuts the rank and the suit symbols from a canonical card image.
    ///
    /// The corner is zoomed and binarized with a level relative to the card
    /// white, the largest shape in the top half is the rank and the largest in
    /// the bottom half is the suit.
    pub fn extract(card: &GrayImage) -> Self {
        let (cw, ch) = CORNER_SIZE;
        let corner = imageops::crop_imm(card, 0, 0, cw, ch).to_image();
        let (zw, zh) = (corner.width() * CORNER_ZOOM, corner.height() * CORNER_ZOOM);
        if zw == 0 || zh == 0 {
            return Self {
                rank: None,
                suit: None,
            };
        }

        let zoomed = imageops::resize(&corner, zw, zh, FilterType::Triangle);

        // The bottom of the corner, below the suit, is the card white.
        let white = zoomed.get_pixel(zw / 2, zh - 1)[0];
        let level = white.saturating_sub(WHITE_OFFSET).max(1);
        let binary = binarize::threshold_inv(&zoomed, level);
        trace!("Card white {white} symbols level {level}");

        let half = zh / 2;
        Self {
            rank: largest_shape(&binary, 0, half, RANK_SIZE),
            suit: largest_shape(&binary, half, zh - half, SUIT_SIZE),
        }
    }
}

/// Crops the largest shape in a band of rows and resizes it.
fn largest_shape(binary: &GrayImage, y: u32, height: u32, size: (u32, u32)) -> Option<GrayImage> {
    let band = imageops::crop_imm(binary, 0, y, binary.width(), height).to_image();

    let (_, bounds) = find_contours::<i32>(&band)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .filter_map(|c| Some((contour_area(&c.points), Rect::bounding(&c.points)?)))
        .reduce(|best, next| if next.0 > best.0 { next } else { best })?;

    let shape = imageops::crop_imm(
        &band,
        bounds.x as u32,
        bounds.y as u32,
        bounds.width,
        bounds.height,
    )
    .to_image();

    Some(imageops::resize(&shape, size.0, size.1, FilterType::Triangle))
}

/// Index of the point with the smallest key, the first one on ties.
fn argmin(points: &[[f32; 2]; 4], key: impl Fn(&[f32; 2]) -> f32) -> usize {
    let mut best = 0;
    for idx in 1..points.len() {
        if key(&points[idx]) < key(&points[best]) {
            best = idx;
        }
    }

    best
}

/// Sorts the corners clockwise on screen starting from the topmost one.
fn clockwise_from_top(points: &[[f32; 2]; 4]) -> [[f32; 2]; 4] {
    let cx = points.iter().map(|p| p[0]).sum::<f32>() / 4.0;
    let cy = points.iter().map(|p| p[1]).sum::<f32>() / 4.0;

    // With y growing downwards increasing angles go clockwise on screen.
    let mut sorted = *points;
    sorted.sort_by(|a, b| {
        let ta = (a[1] - cy).atan2(a[0] - cx);
        let tb = (b[1] - cy).atan2(b[0] - cx);
        ta.total_cmp(&tb)
    });

    let top = argmin(&sorted, |p| p[1]);
    sorted.rotate_left(top);
    sorted
}
