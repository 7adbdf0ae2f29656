// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Table layout.
//!
//! A [TableLayout] splits a camera frame into a community region at the
//! center of the table and one angular wedge for each player. Regions are
//! disjoint and together cover every pixel of the frame.
//!
//! Player wedges start at the positive x axis and advance clockwise on screen
//! (image y grows downwards), player `i` covers the angles in
//! `[i * 360 / n, (i + 1) * 360 / n)` degrees from the frame center. Two
//! players tables are split into the top and bottom half instead, as the 180
//! degrees wedges would be degenerate.
use image::{GrayImage, Luma};
use std::fmt;
use thiserror::Error;

use crate::geometry;

/// Mask value for pixels inside a region.
pub const INSIDE: u8 = 255;

/// Table layout errors.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The table needs at least two players.
    #[error("a table needs at least 2 players, got {0}")]
    TooFewPlayers(usize),
    /// The layout supports at most [TableLayout::MAX_PLAYERS] players.
    #[error("a table can have at most {max} players, got {0}", max = TableLayout::MAX_PLAYERS)]
    TooManyPlayers(usize),
    /// The frame has no pixels.
    #[error("empty frame {width}x{height}")]
    EmptyFrame {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },
    /// The community radius is not positive or larger than the frame.
    #[error("community radius {radius} must be in (0, {max}]")]
    InvalidRadius {
        /// The requested radius.
        radius: f32,
        /// The largest valid radius for the frame.
        max: f32,
    },
}

/// A region identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionId {
    /// The community cards region.
    Community,
    /// The region in front of a player.
    Player(usize),
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionId::Community => write!(f, "Community cards"),
            RegionId::Player(idx) => write!(f, "Player {}", idx + 1),
        }
    }
}

/// The geometry a layout is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutKey {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Number of players.
    pub players: usize,
    /// Community region radius in pixels.
    pub community_radius: f32,
}

/// A frame region.
#[derive(Debug, Clone)]
pub struct Region {
    id: RegionId,
    mask: GrayImage,
    outline: Vec<[f64; 2]>,
    area: usize,
    centroid: [f32; 2],
}

impl Region {
    /// This region identifier.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The region mask, pixels inside the region have value [INSIDE].
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Checks if a pixel is inside this region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.mask.width() && y < self.mask.height() && self.mask.get_pixel(x, y)[0] == INSIDE
    }

    /// The outline polygon of the wedge that defines this region.
    ///
    /// The outline contains every pixel of the region but may extend past the
    /// frame borders, and player outlines are not clipped by the community
    /// region.
    pub fn outline(&self) -> &[[f64; 2]] {
        &self.outline
    }

    /// Number of pixels in this region.
    pub fn area(&self) -> usize {
        self.area
    }

    /// The center of mass of the region pixels, used to place labels.
    pub fn centroid(&self) -> [f32; 2] {
        self.centroid
    }
}

/// The community and players regions for a frame geometry.
#[derive(Debug, Clone)]
pub struct TableLayout {
    key: LayoutKey,
    owners: Vec<u8>,
    community: Region,
    players: Vec<Region>,
}

impl TableLayout {
    /// Largest number of players.
    pub const MAX_PLAYERS: usize = 32;

    /// Owner value for the community region in the owners map.
    const COMMUNITY: u8 = u8::MAX;

    /// Partitions a frame into the community and players regions.
    pub fn new(
        width: u32,
        height: u32,
        players: usize,
        community_radius: f32,
    ) -> Result<Self, LayoutError> {
        if players < 2 {
            return Err(LayoutError::TooFewPlayers(players));
        }

        if players > Self::MAX_PLAYERS {
            return Err(LayoutError::TooManyPlayers(players));
        }

        if width == 0 || height == 0 {
            return Err(LayoutError::EmptyFrame { width, height });
        }

        let max = width.min(height) as f32 / 2.0;
        if !(community_radius > 0.0 && community_radius <= max) {
            return Err(LayoutError::InvalidRadius {
                radius: community_radius,
                max,
            });
        }

        let key = LayoutKey {
            width,
            height,
            players,
            community_radius,
        };

        let geometry = Geometry::new(&key);
        let owners = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| geometry.owner(x, y))
            .collect::<Vec<_>>();

        let community = Self::region(
            &key,
            &owners,
            RegionId::Community,
            Self::COMMUNITY,
            geometry.community_outline(),
        );

        let players = (0..players)
            .map(|idx| {
                Self::region(
                    &key,
                    &owners,
                    RegionId::Player(idx),
                    idx as u8,
                    geometry.wedge_outline(idx),
                )
            })
            .collect();

        Ok(Self {
            key,
            owners,
            community,
            players,
        })
    }

    /// The geometry this layout was computed from.
    pub fn key(&self) -> LayoutKey {
        self.key
    }

    /// Checks if this layout was computed for the given geometry.
    pub fn matches(&self, key: &LayoutKey) -> bool {
        self.key == *key
    }

    /// The community cards region.
    pub fn community(&self) -> &Region {
        &self.community
    }

    /// The players regions.
    pub fn players(&self) -> &[Region] {
        &self.players
    }

    /// All regions, the community region first.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        std::iter::once(&self.community).chain(self.players.iter())
    }

    /// Returns the region a pixel belongs to.
    ///
    /// Panics if the pixel is outside the frame.
    pub fn region_at(&self, x: u32, y: u32) -> RegionId {
        assert!(x < self.key.width && y < self.key.height);
        match self.owners[(y * self.key.width + x) as usize] {
            Self::COMMUNITY => RegionId::Community,
            idx => RegionId::Player(idx as usize),
        }
    }

    fn region(
        key: &LayoutKey,
        owners: &[u8],
        id: RegionId,
        owner: u8,
        outline: Vec<[f64; 2]>,
    ) -> Region {
        let mut mask = GrayImage::new(key.width, key.height);
        let mut area = 0usize;
        let (mut sx, mut sy) = (0f64, 0f64);

        for (idx, _) in owners.iter().enumerate().filter(|(_, o)| **o == owner) {
            let x = idx as u32 % key.width;
            let y = idx as u32 / key.width;
            mask.put_pixel(x, y, Luma([INSIDE]));
            area += 1;
            sx += x as f64;
            sy += y as f64;
        }

        let centroid = if area > 0 {
            [(sx / area as f64) as f32, (sy / area as f64) as f32]
        } else {
            [key.width as f32 / 2.0, key.height as f32 / 2.0]
        };

        Region {
            id,
            mask,
            outline,
            area,
            centroid,
        }
    }
}

/// Wedges geometry in continuous frame coordinates, pixel `(x, y)` is sampled
/// at its center `(x + 0.5, y + 0.5)`.
struct Geometry {
    width: f64,
    height: f64,
    center: [f64; 2],
    players: usize,
    radius: f64,
    /// Length of the wedges rays, long enough to leave the frame.
    ray: f64,
    step: f64,
}

impl Geometry {
    fn new(key: &LayoutKey) -> Self {
        let width = key.width as f64;
        let height = key.height as f64;
        Self {
            width,
            height,
            center: [width / 2.0, height / 2.0],
            players: key.players,
            radius: key.community_radius as f64,
            ray: width.max(height),
            step: 360.0 / key.players as f64,
        }
    }

    /// A round community region makes wedges boundaries unambiguous near the
    /// center, two players tables use a band across the frame.
    fn round_community(&self) -> bool {
        self.players > 2
    }

    fn owner(&self, x: u32, y: u32) -> u8 {
        let dx = x as f64 + 0.5 - self.center[0];
        let dy = y as f64 + 0.5 - self.center[1];

        let in_community = if self.round_community() {
            dx * dx + dy * dy <= self.radius * self.radius
        } else {
            dy.abs() < self.radius
        };

        if in_community {
            return TableLayout::COMMUNITY;
        }

        if self.players == 2 {
            return if dy < 0.0 { 0 } else { 1 };
        }

        let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
        let idx = (angle / self.step) as usize;
        idx.min(self.players - 1) as u8
    }

    fn edge_point(&self, angle: f64) -> [f64; 2] {
        let rad = angle.to_radians();
        [
            self.center[0] + self.ray * rad.cos(),
            self.center[1] + self.ray * rad.sin(),
        ]
    }

    fn wedge_outline(&self, idx: usize) -> Vec<[f64; 2]> {
        let (w, h) = (self.width, self.height);
        let e1 = self.edge_point(self.step * idx as f64);
        let e2 = self.edge_point(self.step * (idx + 1) as f64);

        match (self.players, idx) {
            // Half planes through the frame corners.
            (2, 0) => vec![self.center, e1, [w, 0.0], [0.0, 0.0], e2],
            (2, _) => vec![self.center, e2, [w, h], [0.0, h], e1],
            // The 120 degrees chords miss the right corners.
            (3, 0) => vec![self.center, e1, [w, h], e2],
            (3, 2) => vec![self.center, e1, [w, 0.0], e2],
            _ => vec![self.center, e1, e2],
        }
    }

    fn community_outline(&self) -> Vec<[f64; 2]> {
        if self.round_community() {
            geometry::circle_polygon(self.center, self.radius, 64)
        } else {
            let top = (self.center[1] - self.radius).max(0.0);
            let bottom = (self.center[1] + self.radius).min(self.height);
            vec![
                [0.0, top],
                [self.width, top],
                [self.width, bottom],
                [0.0, bottom],
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: [(u32, u32); 3] = [(160, 120), (120, 160), (200, 200)];

    #[test]
    fn invalid_geometry() {
        assert_eq!(
            TableLayout::new(160, 120, 1, 30.0).unwrap_err(),
            LayoutError::TooFewPlayers(1)
        );
        assert_eq!(
            TableLayout::new(160, 120, 33, 30.0).unwrap_err(),
            LayoutError::TooManyPlayers(33)
        );
        assert_eq!(
            TableLayout::new(0, 120, 4, 30.0).unwrap_err(),
            LayoutError::EmptyFrame {
                width: 0,
                height: 120
            }
        );
        assert!(matches!(
            TableLayout::new(160, 120, 4, 0.0),
            Err(LayoutError::InvalidRadius { .. })
        ));
        assert!(matches!(
            TableLayout::new(160, 120, 4, -5.0),
            Err(LayoutError::InvalidRadius { .. })
        ));
        assert!(matches!(
            TableLayout::new(160, 120, 4, 61.0),
            Err(LayoutError::InvalidRadius { max, .. }) if max == 60.0
        ));
        assert!(TableLayout::new(160, 120, 4, 60.0).is_ok());
    }

    #[test]
    fn regions_partition_frame() {
        for (width, height) in SIZES {
            for players in 2..=8 {
                let layout = TableLayout::new(width, height, players, 30.0).unwrap();
                assert_eq!(layout.players().len(), players);

                let mut total = 0;
                for y in 0..height {
                    for x in 0..width {
                        let owners = layout.regions().filter(|r| r.contains(x, y)).count();
                        assert_eq!(owners, 1, "pixel ({x}, {y}) players={players}");
                        assert!(layout.region_at(x, y) != RegionId::Player(players));
                        total += 1;
                    }
                }

                let area = layout.regions().map(Region::area).sum::<usize>();
                assert_eq!(area, total);
            }
        }
    }

    #[test]
    fn every_region_has_pixels() {
        for (width, height) in SIZES {
            for players in 2..=8 {
                let layout = TableLayout::new(width, height, players, 30.0).unwrap();
                for region in layout.regions() {
                    assert!(region.area() > 0, "{} players={players}", region.id());
                }
            }
        }
    }

    #[test]
    fn outlines_contain_regions() {
        for (width, height) in SIZES {
            for players in 2..=8 {
                let layout = TableLayout::new(width, height, players, 30.0).unwrap();
                for region in layout.players() {
                    for y in (0..height).step_by(3) {
                        for x in (0..width).step_by(3) {
                            if !region.contains(x, y) {
                                continue;
                            }

                            let p = [x as f64 + 0.5, y as f64 + 0.5];
                            assert!(
                                geometry::polygon_test(region.outline(), p) >= 0,
                                "pixel ({x}, {y}) outside {} players={players}",
                                region.id()
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn community_shape() {
        // Round community for more than 2 players.
        let layout = TableLayout::new(160, 120, 4, 30.0).unwrap();
        assert_eq!(layout.region_at(80, 60), RegionId::Community);
        assert_eq!(layout.region_at(80, 60 - 29), RegionId::Community);
        assert_ne!(layout.region_at(80 - 29, 60 - 29), RegionId::Community);
        assert_ne!(layout.region_at(0, 60), RegionId::Community);

        // A band across the frame for 2 players.
        let layout = TableLayout::new(160, 120, 2, 30.0).unwrap();
        assert_eq!(layout.region_at(0, 60), RegionId::Community);
        assert_eq!(layout.region_at(159, 31), RegionId::Community);
        assert_eq!(layout.region_at(159, 29), RegionId::Player(0));
        assert_eq!(layout.region_at(0, 119), RegionId::Player(1));
        assert_eq!(layout.community().area(), 160 * 60);
    }

    #[test]
    fn corners_ownership() {
        // Three players, wedge 0 takes the bottom right corner and wedge 2 the
        // top right corner.
        let layout = TableLayout::new(160, 120, 3, 30.0).unwrap();
        assert_eq!(layout.region_at(159, 119), RegionId::Player(0));
        assert_eq!(layout.region_at(0, 119), RegionId::Player(1));
        assert_eq!(layout.region_at(0, 0), RegionId::Player(1));
        assert_eq!(layout.region_at(159, 0), RegionId::Player(2));

        let layout = TableLayout::new(160, 120, 4, 30.0).unwrap();
        assert_eq!(layout.region_at(159, 119), RegionId::Player(0));
        assert_eq!(layout.region_at(0, 119), RegionId::Player(1));
        assert_eq!(layout.region_at(0, 0), RegionId::Player(2));
        assert_eq!(layout.region_at(159, 0), RegionId::Player(3));
    }

    #[test]
    fn layout_key() {
        let layout = TableLayout::new(160, 120, 5, 40.0).unwrap();
        let key = LayoutKey {
            width: 160,
            height: 120,
            players: 5,
            community_radius: 40.0,
        };

        assert!(layout.matches(&key));
        assert!(!layout.matches(&LayoutKey { players: 6, ..key }));
        assert!(!layout.matches(&LayoutKey { width: 161, ..key }));

        let centroid = layout.community().centroid();
        assert!((centroid[0] - 79.5).abs() < 0.5 && (centroid[1] - 59.5).abs() < 0.5);
    }
}
