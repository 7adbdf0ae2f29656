// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Frame sources.
use anyhow::Result;
use image::GrayImage;
use std::time::Duration;

/// The result of waiting for a frame.
#[derive(Debug)]
pub enum SourceEvent {
    /// A new frame.
    Frame(GrayImage),
    /// No frame arrived before the timeout.
    Timeout,
    /// The source has no more frames.
    Closed,
}

/// A source of grayscale frames, like a camera or a list of images.
pub trait FrameSource {
    /// Waits for the next frame for at most `timeout`.
    fn next_frame(&mut self, timeout: Duration) -> Result<SourceEvent>;
}

/// A source that replays frames from memory.
#[derive(Debug, Default)]
pub struct FramesQueue {
    frames: std::collections::VecDeque<GrayImage>,
}

impl FramesQueue {
    /// Creates a queue with the given frames.
    pub fn new(frames: impl IntoIterator<Item = GrayImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Adds a frame at the end of the queue.
    pub fn push(&mut self, frame: GrayImage) {
        self.frames.push_back(frame);
    }
}

impl FrameSource for FramesQueue {
    fn next_frame(&mut self, _timeout: Duration) -> Result<SourceEvent> {
        Ok(match self.frames.pop_front() {
            Some(frame) => SourceEvent::Frame(frame),
            None => SourceEvent::Closed,
        })
    }
}

/// Time left to wait for the next frame, at least one millisecond.
pub fn frame_timeout(interval: Duration, elapsed: Duration) -> Duration {
    interval
        .saturating_sub(elapsed)
        .max(Duration::from_millis(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_clamp() {
        let interval = Duration::from_millis(16);
        assert_eq!(
            frame_timeout(interval, Duration::from_millis(6)),
            Duration::from_millis(10)
        );
        assert_eq!(
            frame_timeout(interval, Duration::from_millis(16)),
            Duration::from_millis(1)
        );
        assert_eq!(
            frame_timeout(interval, Duration::from_millis(40)),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn queue_source() {
        let mut queue = FramesQueue::new([GrayImage::new(2, 2)]);
        queue.push(GrayImage::new(3, 3));

        let timeout = Duration::from_millis(1);
        assert!(matches!(queue.next_frame(timeout).unwrap(), SourceEvent::Frame(f) if f.width() == 2));
        assert!(matches!(queue.next_frame(timeout).unwrap(), SourceEvent::Frame(f) if f.width() == 3));
        assert!(matches!(queue.next_frame(timeout).unwrap(), SourceEvent::Closed));
    }
}
