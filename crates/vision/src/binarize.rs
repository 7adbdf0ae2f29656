// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Grayscale smoothing and thresholding.
//!
//! Binary images use 255 for foreground and 0 for background. All thresholds
//! are inverted: dark pixels, like the table felt around a card or the ink of
//! a symbol, become foreground.
use image::{GrayImage, Luma};
use imageproc::{
    contrast::{ThresholdType, threshold},
    filter::gaussian_blur_f32,
    integral_image::{integral_image, sum_image_pixels},
};

/// Foreground value in binary images.
pub const FOREGROUND: u8 = 255;

/// Smooths an image with a Gaussian kernel.
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    gaussian_blur_f32(image, sigma)
}

/// Marks pixels darker than their neighborhood mean by more than `offset`.
///
/// The neighborhood is a `(2 * radius + 1)` square window clipped at the image
/// borders.
pub fn adaptive_threshold_inv(image: &GrayImage, radius: u32, offset: i32) -> GrayImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return GrayImage::new(w, h);
    }

    let integral = integral_image::<_, u64>(image);

    GrayImage::from_fn(w, h, |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(w - 1);
        let y1 = (y + radius).min(h - 1);

        let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;
        let mean = sum_image_pixels(&integral, x0, y0, x1, y1)[0] as f64 / count;
        let pixel = image.get_pixel(x, y)[0] as f64;

        if pixel <= mean.round() - offset as f64 {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Marks pixels with a value less or equal than `level`.
pub fn threshold_inv(image: &GrayImage, level: u8) -> GrayImage {
    threshold(image, level, ThresholdType::BinaryInverted)
}

/// Clears the foreground pixels that are outside the mask.
///
/// The mask must have the same size of the image, pixels with value 0 are
/// outside the mask.
pub fn apply_mask(binary: &mut GrayImage, mask: &GrayImage) {
    debug_assert_eq!(binary.dimensions(), mask.dimensions());
    for (pixel, mask) in binary.pixels_mut().zip(mask.pixels()) {
        if mask[0] == 0 {
            pixel[0] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_marks_dark_edges() {
        // A bright square on a dark background, the dark side of the edge
        // becomes foreground, flat areas stay background.
        let image = GrayImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Luma([220])
            } else {
                Luma([40])
            }
        });

        let binary = adaptive_threshold_inv(&image, 2, 2);
        assert_eq!(binary.get_pixel(9, 20)[0], FOREGROUND);
        assert_eq!(binary.get_pixel(8, 20)[0], FOREGROUND);
        assert_eq!(binary.get_pixel(10, 20)[0], 0);
        assert_eq!(binary.get_pixel(20, 20)[0], 0);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn adaptive_matches_window_mean() {
        let image = GrayImage::from_fn(9, 7, |x, y| Luma([((x * 37 + y * 91) % 251) as u8]));
        let binary = adaptive_threshold_inv(&image, 2, 2);

        for (x, y, pixel) in binary.enumerate_pixels() {
            let xs = x.saturating_sub(2)..=(x + 2).min(8);
            let ys = y.saturating_sub(2)..=(y + 2).min(6);
            let window = ys
                .flat_map(|wy| xs.clone().map(move |wx| (wx, wy)))
                .map(|(wx, wy)| image.get_pixel(wx, wy)[0] as f64)
                .collect::<Vec<_>>();
            let mean = window.iter().sum::<f64>() / window.len() as f64;

            let dark = image.get_pixel(x, y)[0] as f64 <= mean.round() - 2.0;
            assert_eq!(pixel[0] == FOREGROUND, dark, "({x}, {y})");
        }
    }

    #[test]
    fn threshold_and_mask() {
        let image = GrayImage::from_fn(4, 1, |x, _| Luma([x as u8 * 50]));
        let mut binary = threshold_inv(&image, 50);
        assert_eq!(
            binary.pixels().map(|p| p[0]).collect::<Vec<_>>(),
            [255, 255, 0, 0]
        );

        let mask = GrayImage::from_fn(4, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        apply_mask(&mut binary, &mask);
        assert_eq!(
            binary.pixels().map(|p| p[0]).collect::<Vec<_>>(),
            [0, 255, 0, 0]
        );
    }

    #[test]
    fn blur_keeps_flat_images() {
        let image = GrayImage::from_pixel(16, 16, Luma([120]));
        let blurred = gaussian_blur(&image, 0.8);
        assert!(blurred.pixels().all(|p| p[0].abs_diff(120) <= 1));
        assert_eq!(gaussian_blur(&image, 0.0), image);
    }
}
