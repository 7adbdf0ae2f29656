// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Synthetic table and card images for unit tests.
//!
//! Cards symbols are drawn as dark blocks with a pattern of holes, each rank
//! and suit gets a different pattern so that the templates matcher can tell
//! them apart.
use image::{GrayImage, Luma};
use imageproc::{
    drawing::draw_polygon_mut,
    geometric_transformations::{Interpolation, Projection, warp_into},
    point::Point,
};

use crate::{rectify::CARD_SIZE, templates::TemplateSet};
use pokevisor_cards::{Rank, Suit};

/// Table felt level.
pub const TABLE: u8 = 40;

/// Card white level.
pub const CARD: u8 = 230;

/// Symbols ink level.
pub const GLYPH: u8 = 30;

/// Rank symbol rectangle on the canonical card as (x, y, width, height).
const RANK_RECT: (u32, u32, u32, u32) = (12, 14, 40, 60);

/// Suit symbol rectangle on the canonical card.
const SUIT_RECT: (u32, u32, u32, u32) = (12, 90, 40, 60);

/// A uniform table image.
pub fn table_image(w: u32, h: u32) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([TABLE]))
}

/// Fills a quadrilateral with the card white.
pub fn draw_blank_card(image: &mut GrayImage, corners: [[f32; 2]; 4]) {
    draw_polygon_mut(image, &quad(corners), Luma([CARD]));
}

fn quad(corners: [[f32; 2]; 4]) -> [Point<i32>; 4] {
    corners.map(|[x, y]| Point::new(x.round() as i32, y.round() as i32))
}

/// Draws a canonical card image on a frame, `corners` are the frame points
/// of the card top left, top right, bottom right, and bottom left corners.
pub fn draw_card(frame: &mut GrayImage, card: &GrayImage, corners: [[f32; 2]; 4]) {
    let (w, h) = (card.width() as f32 - 1.0, card.height() as f32 - 1.0);
    let from = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
    let to = corners.map(|[x, y]| (x, y));
    let projection = Projection::from_control_points(from, to).unwrap();

    let mut warped = GrayImage::new(frame.width(), frame.height());
    warp_into(card, &projection, Interpolation::Bilinear, Luma([TABLE]), &mut warped);

    let mut mask = GrayImage::new(frame.width(), frame.height());
    draw_polygon_mut(&mut mask, &quad(corners), Luma([u8::MAX]));
    for ((pixel, warped), mask) in frame.pixels_mut().zip(warped.pixels()).zip(mask.pixels()) {
        if mask[0] != 0 {
            *pixel = *warped;
        }
    }
}

/// A canonical card image with the rank and suit symbols of the given
/// patterns.
pub fn card_image(rank_pattern: usize, suit_pattern: usize) -> GrayImage {
    let mut card = GrayImage::from_pixel(CARD_SIZE.0, CARD_SIZE.1, Luma([CARD]));
    draw_symbol(&mut card, RANK_RECT, pattern(rank_pattern));
    draw_symbol(&mut card, SUIT_RECT, pattern(suit_pattern));
    card
}

/// A canonical card image for a card.
pub fn card_for(rank: Rank, suit: Suit) -> GrayImage {
    card_image(rank_index(rank), suit_index(suit))
}

/// Templates extracted from synthetic cards.
pub fn templates() -> TemplateSet {
    let ranks = Rank::ranks().map(|rank| {
        let symbols = crate::Symbols::extract(&card_for(rank, Suit::Clubs));
        (rank, symbols.rank.unwrap())
    });

    let suits = Suit::suits().map(|suit| {
        let symbols = crate::Symbols::extract(&card_for(Rank::Deuce, suit));
        (suit, symbols.suit.unwrap())
    });

    TemplateSet::from_images(ranks, suits).unwrap()
}

fn rank_index(rank: Rank) -> usize {
    Rank::ranks().position(|r| r == rank).unwrap()
}

fn suit_index(suit: Suit) -> usize {
    Suit::suits().position(|s| s == suit).unwrap()
}

/// The nth 9 bits pattern with an even number of holes, two patterns differ
/// by at least two cells.
fn pattern(n: usize) -> u16 {
    (0u16..512).filter(|p| p.count_ones() % 2 == 0).nth(n).unwrap()
}

/// Draws a dark block with a solid border and a 3x3 grid of cells, cells with
/// the pattern bit set are holes.
fn draw_symbol(card: &mut GrayImage, rect: (u32, u32, u32, u32), pattern: u16) {
    const BORDER: u32 = 6;

    let (x0, y0, w, h) = rect;
    let cell_w = (w - 2 * BORDER) as f32 / 3.0;
    let cell_h = (h - 2 * BORDER) as f32 / 3.0;

    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let (dx, dy) = (x - x0, y - y0);
            let interior = dx >= BORDER && dx < w - BORDER && dy >= BORDER && dy < h - BORDER;

            let hole = interior && {
                let col = (((dx - BORDER) as f32 / cell_w) as u32).min(2);
                let row = (((dy - BORDER) as f32 / cell_h) as u32).min(2);
                pattern & (1 << (row * 3 + col)) != 0
            };

            if !hole {
                card.put_pixel(x, y, Luma([GLYPH]));
            }
        }
    }
}
