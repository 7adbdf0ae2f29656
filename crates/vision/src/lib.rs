// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! PokeVisor table vision.
//!
//! This crate splits a table frame into regions and recognizes the cards in
//! each region:
//!
//! - [TableLayout] partitions the frame into the community and players
//!   regions.
//! - [Locator] finds card shaped contours.
//! - [RectifiedCard] warps a card upright and cuts its rank and suit symbols.
//! - [TemplateSet] matches the symbols against the reference images.
//!
//! [CardDetector] runs the whole recognition for a frame or a region:
//!
//! ```no_run
//! # use pokevisor_vision::*;
//! # use std::sync::Arc;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let templates = Arc::new(TemplateSet::load_dir("templates")?);
//! let detector = CardDetector::new(LocatorConfig::default(), MatchConfig::default(), templates);
//!
//! let frame = image::open("table.jpg")?.to_luma8();
//! let layout = TableLayout::new(frame.width(), frame.height(), 4, 180.0)?;
//! for region in layout.regions() {
//!     for detection in detector.detect(&frame, Some(region.mask())) {
//!         println!("{}: {}", region.id(), detection.card);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod binarize;
pub mod geometry;

mod detector;
pub use detector::{CardDetector, Detection, identify};

mod layout;
pub use layout::{LayoutError, LayoutKey, Region, RegionId, TableLayout};

mod locate;
pub use locate::{CardContour, Locator, LocatorConfig};

pub mod rectify;
pub use rectify::{Orientation, RectifiedCard, Symbols};

mod templates;
pub use templates::{MatchConfig, NO_MATCH, SymbolsMatch, TemplateError, TemplateSet, difference};

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;
