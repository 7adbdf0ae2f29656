// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Frames read from image files.
use anyhow::{Context, Result, bail};
use log::info;
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    time::Duration,
};

use pokevisor_core::{FrameSource, SourceEvent};

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A source that loads frames from a list of image files.
#[derive(Debug)]
pub struct ImageFiles {
    paths: VecDeque<PathBuf>,
}

impl ImageFiles {
    /// Creates a source for the given paths, a directory path adds all the
    /// images in the directory sorted by name.
    pub fn new(paths: &[PathBuf]) -> Result<Self> {
        let mut files = VecDeque::new();
        for path in paths {
            if path.is_dir() {
                files.extend(Self::read_dir(path)?);
            } else {
                files.push_back(path.clone());
            }
        }

        if files.is_empty() {
            bail!("No frames found");
        }

        info!("Loaded {} frames paths", files.len());
        Ok(Self { paths: files })
    }

    /// Number of frames left.
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }

    fn read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("Reading {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

impl FrameSource for ImageFiles {
    fn next_frame(&mut self, _timeout: Duration) -> Result<SourceEvent> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(SourceEvent::Closed);
        };

        let frame = image::open(&path)
            .with_context(|| format!("Loading frame {}", path.display()))?
            .to_luma8();
        Ok(SourceEvent::Frame(frame))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn frames_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pokevisor-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn directory_frames_in_order() {
        let dir = frames_dir("order");
        for (name, w) in [("b.png", 3), ("a.png", 2), ("c.png", 4)] {
            GrayImage::from_pixel(w, 2, Luma([10]))
                .save(dir.join(name))
                .unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageFiles::new(&[dir.clone()]).unwrap();
        assert_eq!(source.remaining(), 3);

        let timeout = Duration::from_millis(1);
        for w in [2, 3, 4] {
            match source.next_frame(timeout).unwrap() {
                SourceEvent::Frame(frame) => assert_eq!(frame.width(), w),
                event => panic!("unexpected {event:?}"),
            }
        }
        assert!(matches!(source.next_frame(timeout).unwrap(), SourceEvent::Closed));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_frames() {
        let dir = frames_dir("empty");
        assert!(ImageFiles::new(&[dir.clone()]).is_err());

        let mut source = ImageFiles::new(&[dir.join("missing.png")]).unwrap();
        assert!(source.next_frame(Duration::from_millis(1)).is_err());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
