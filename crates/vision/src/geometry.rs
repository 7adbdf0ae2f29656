// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Polygon helpers for contours and regions outlines.
use imageproc::{geometry::approximate_polygon_dp, point::Point};

/// An axis aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Smallest rectangle that contains all the points.
    pub fn bounding(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }

        Some(Self {
            x: x0,
            y: y0,
            width: (x1 - x0 + 1) as u32,
            height: (y1 - y0 + 1) as u32,
        })
    }

    /// Checks if this rectangle contains the other one.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width as i32 <= self.x + self.width as i32
            && other.y + other.height as i32 <= self.y + self.height as i32
    }

    /// The rectangle center.
    pub fn center(&self) -> [f32; 2] {
        [
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        ]
    }
}

/// Converts contour points to floating point coordinates.
pub fn to_f64(points: &[Point<i32>]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.x as f64, p.y as f64]).collect()
}

/// Area enclosed by a closed polygon with floating point vertices.
pub fn polygon_area(points: &[[f64; 2]]) -> f64 {
    let twice = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum::<f64>();

    twice.abs() / 2.0
}

/// Simplifies a closed contour with the Douglas-Peucker algorithm.
///
/// Vertices of the simplified polygon that are within `epsilon` of the line
/// through their neighbors are dropped, this removes the contour start point
/// when it lies along an edge. Returns the contour unchanged if `epsilon` is
/// not positive.
pub fn approx_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let mut polygon = approximate_polygon_dp(points, epsilon, true);
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    while polygon.len() > 3 {
        let n = polygon.len();
        let flattest = (0..n)
            .map(|i| {
                let (prev, next) = (&polygon[(i + n - 1) % n], &polygon[(i + 1) % n]);
                (i, line_distance(&polygon[i], prev, next))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match flattest {
            Some((idx, d)) if d <= epsilon => {
                polygon.remove(idx);
            }
            _ => break,
        }
    }

    polygon
}

/// Distance from `p` to the line through `a` and `b`.
fn line_distance(p: &Point<i32>, a: &Point<i32>, b: &Point<i32>) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return ((p.x - a.x) as f64).hypot((p.y - a.y) as f64);
    }

    (dx * (p.y - a.y) as f64 - dy * (p.x - a.x) as f64).abs() / len
}

/// Locates a point relative to a closed polygon.
///
/// Returns 1 if the point is inside, 0 if it is on an edge, and -1 if it is
/// outside.
pub fn polygon_test(polygon: &[[f64; 2]], p: [f64; 2]) -> i32 {
    const EPS: f64 = 1e-9;

    let mut inside = false;
    for (a, b) in polygon.iter().zip(polygon.iter().cycle().skip(1)) {
        let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
        let within_x = p[0] >= a[0].min(b[0]) - EPS && p[0] <= a[0].max(b[0]) + EPS;
        let within_y = p[1] >= a[1].min(b[1]) - EPS && p[1] <= a[1].max(b[1]) + EPS;
        if cross.abs() <= EPS && within_x && within_y {
            return 0;
        }

        // Even-odd rule on a ray going right.
        if (a[1] > p[1]) != (b[1] > p[1]) {
            let x = a[0] + (p[1] - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
            if p[0] < x {
                inside = !inside;
            }
        }
    }

    if inside { 1 } else { -1 }
}

/// Approximates a circle with a regular polygon.
pub fn circle_polygon(center: [f64; 2], radius: f64, sides: usize) -> Vec<[f64; 2]> {
    (0..sides)
        .map(|idx| {
            let angle = std::f64::consts::TAU * idx as f64 / sides as f64;
            [
                center[0] + radius * angle.cos(),
                center[1] + radius * angle.sin(),
            ]
        })
        .collect()
}
