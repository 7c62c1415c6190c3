// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan (2D) geometry helpers: directions, line intersection and
//! perpendicular offsetting of chord paths.
//!
//! X is east, Y is north. Angles are radians measured counter-clockwise from
//! the +X axis.

use std::f64::consts::{PI, TAU};

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Parallel-line threshold for [`intersect_lines`].
const PARALLEL_EPS: f64 = 1e-12;

/// A plan bearing, normalized to `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction(f64);

impl Direction {
    /// Creates a direction from an angle in radians.
    pub fn new(angle: f64) -> Self {
        Self(angle.rem_euclid(TAU))
    }

    /// Direction of a (non-zero) vector.
    pub fn from_vector(v: &Vector2<f64>) -> Self {
        Self::new(v.y.atan2(v.x))
    }

    /// Angle in radians, in `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.0
    }

    /// Unit vector pointing in this direction.
    pub fn vector(&self) -> Vector2<f64> {
        Vector2::new(self.0.cos(), self.0.sin())
    }

    /// Rotates counter-clockwise by `delta` radians.
    pub fn rotated(&self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }

    /// The opposite direction.
    pub fn reversed(&self) -> Self {
        self.rotated(PI)
    }

    /// Direction 90° clockwise (to the right when walking this direction).
    pub fn right_normal(&self) -> Self {
        self.rotated(-PI / 2.0)
    }

    /// Signed angle from `self` to `other`, in `(-π, π]`.
    pub fn angle_between(&self, other: &Direction) -> f64 {
        let mut a = (other.0 - self.0).rem_euclid(TAU);
        if a > PI {
            a -= TAU;
        }
        a
    }
}

/// Intersects the line through `p0` along `d0` with the line through `p1`
/// along `d1`. Returns `None` when the lines are parallel.
pub fn intersect_lines(
    p0: &Point2<f64>,
    d0: &Vector2<f64>,
    p1: &Point2<f64>,
    d1: &Vector2<f64>,
) -> Option<Point2<f64>> {
    let denom = d0.perp(d1);
    if denom.abs() < PARALLEL_EPS * d0.norm() * d1.norm() {
        return None;
    }
    let t = (p1 - p0).perp(d1) / denom;
    Some(*p0 + d0 * t)
}

/// Offsets an open chord path perpendicular to itself.
///
/// Positive `distance` moves the path to the right of its walking direction.
/// Interior vertices are mitred by intersecting the adjacent offset segments;
/// collinear neighbours keep the plain perpendicular offset.
pub fn offset_path(path: &[Point2<f64>], distance: f64) -> Option<Vec<Point2<f64>>> {
    if path.len() < 2 {
        return None;
    }
    if distance == 0.0 {
        return Some(path.to_vec());
    }

    let mut normals = Vec::with_capacity(path.len() - 1);
    for w in path.windows(2) {
        let d = w[1] - w[0];
        let len = d.norm();
        if len < PARALLEL_EPS {
            return None;
        }
        // right-hand normal
        normals.push(Vector2::new(d.y, -d.x) / len);
    }

    let mut out = Vec::with_capacity(path.len());
    out.push(path[0] + normals[0] * distance);
    for i in 1..path.len() - 1 {
        let a0 = path[i - 1] + normals[i - 1] * distance;
        let b0 = path[i] + normals[i] * distance;
        let da = path[i] - path[i - 1];
        let db = path[i + 1] - path[i];
        match intersect_lines(&a0, &da, &b0, &db) {
            Some(p) => out.push(p),
            None => out.push(b0),
        }
    }
    let last = path.len() - 1;
    out.push(path[last] + normals[last - 1] * distance);
    Some(out)
}
