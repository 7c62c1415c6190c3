// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roadway alignment queries.
//!
//! The geometry builder only ever talks to an alignment through the
//! [`Alignment`] trait: station/offset conversions, tangent and normal
//! directions, and roadway surface elevations. Two concrete alignments are
//! provided for hosts without a COGO engine of their own:
//!
//! - [`StraightAlignment`]: a single tangent run.
//! - [`PolylineAlignment`]: tangent runs joined at angle points (zero-radius
//!   curves).
//!
//! Offsets are positive to the right of the alignment looking ahead on
//! station, and [`Alignment::normal`] points to the right.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::plan::Direction;

/// Deflection below which an angle point is treated as a straight run.
const ANGLE_POINT_EPS: f64 = 1e-12;

/// Horizontal alignment plus roadway surface, queried read-only.
pub trait Alignment {
    /// Forward tangent direction at `station`.
    fn direction(&self, station: f64) -> Direction;

    /// Direction normal to the alignment at `station`, pointing right.
    fn normal(&self, station: f64) -> Direction {
        self.direction(station).right_normal()
    }

    /// Station and signed offset of a plan point.
    fn station_and_offset(&self, point: &Point2<f64>) -> (f64, f64);

    /// Plan point at `station`, `offset` measured normal to the alignment.
    fn locate_point(&self, station: f64, offset: f64) -> Point2<f64>;

    /// Roadway surface elevation.
    fn elevation(&self, station: f64, offset: f64) -> f64;

    /// Surface slope (rise per unit offset, positive rising to the right).
    fn cross_slope(&self, station: f64, offset: f64) -> f64;

    /// Whether a zero-radius direction change lies in `[start, end]`.
    fn has_angle_points(&self, _start: f64, _end: f64) -> bool {
        false
    }
}

/// Profile grade line and crowned cross section.
///
/// `left_slope` and `right_slope` are measured outward from the crown point,
/// so a normal crown falling away from the centerline has both negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadwaySurface {
    pub profile_station: f64,
    pub profile_elevation: f64,
    pub grade: f64,
    pub crown_offset: f64,
    pub left_slope: f64,
    pub right_slope: f64,
}

impl Default for RoadwaySurface {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

impl RoadwaySurface {
    /// Level surface at a constant elevation.
    pub fn flat(elevation: f64) -> Self {
        Self {
            profile_station: 0.0,
            profile_elevation: elevation,
            grade: 0.0,
            crown_offset: 0.0,
            left_slope: 0.0,
            right_slope: 0.0,
        }
    }

    /// Symmetric crown at `crown_offset`, falling away at `slope` each side.
    pub fn crowned(elevation: f64, crown_offset: f64, slope: f64) -> Self {
        Self {
            crown_offset,
            left_slope: -slope.abs(),
            right_slope: -slope.abs(),
            ..Self::flat(elevation)
        }
    }

    /// Single slope across the full width (positive rises to the right).
    pub fn superelevated(elevation: f64, slope: f64) -> Self {
        Self {
            left_slope: -slope,
            right_slope: slope,
            ..Self::flat(elevation)
        }
    }

    pub fn with_grade(mut self, grade: f64) -> Self {
        self.grade = grade;
        self
    }

    pub fn elevation(&self, station: f64, offset: f64) -> f64 {
        let profile = self.profile_elevation + self.grade * (station - self.profile_station);
        if offset < self.crown_offset {
            profile + self.left_slope * (self.crown_offset - offset)
        } else {
            profile + self.right_slope * (offset - self.crown_offset)
        }
    }

    pub fn cross_slope(&self, offset: f64) -> f64 {
        if offset < self.crown_offset {
            -self.left_slope
        } else {
            self.right_slope
        }
    }
}

/// How a support line is oriented in plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SupportOrientation {
    /// Normal to the alignment.
    Normal,
    /// Alignment normal rotated counter-clockwise by the angle (radians).
    Skew(f64),
    /// Fixed plan bearing (radians, counter-clockwise from east).
    Bearing(f64),
}

impl Default for SupportOrientation {
    fn default() -> Self {
        SupportOrientation::Normal
    }
}

/// Direction of a support line at `station`, always pointing to the right
/// side of the alignment.
pub fn support_direction<A: Alignment + ?Sized>(
    alignment: &A,
    station: f64,
    orientation: &SupportOrientation,
) -> Direction {
    let normal = alignment.normal(station);
    match orientation {
        SupportOrientation::Normal => normal,
        SupportOrientation::Skew(angle) => normal.rotated(*angle),
        SupportOrientation::Bearing(bearing) => {
            let dir = Direction::new(*bearing);
            if dir.vector().dot(&normal.vector()) < 0.0 {
                dir.reversed()
            } else {
                dir
            }
        }
    }
}

/// Signed angle from the alignment normal at `station` to `direction`.
pub fn skew_angle<A: Alignment + ?Sized>(alignment: &A, station: f64, direction: &Direction) -> f64 {
    alignment.normal(station).angle_between(direction)
}

/// A single tangent run.
#[derive(Debug, Clone, PartialEq)]
pub struct StraightAlignment {
    origin: Point2<f64>,
    bearing: Direction,
    start_station: f64,
    surface: RoadwaySurface,
}

impl StraightAlignment {
    /// Alignment through `origin` (at `start_station`) heading along `bearing`.
    pub fn new(origin: Point2<f64>, bearing: Direction, start_station: f64) -> Self {
        Self {
            origin,
            bearing,
            start_station,
            surface: RoadwaySurface::default(),
        }
    }

    /// East-running alignment with station 0 at the origin.
    pub fn east() -> Self {
        Self::new(Point2::origin(), Direction::new(0.0), 0.0)
    }

    pub fn with_surface(mut self, surface: RoadwaySurface) -> Self {
        self.surface = surface;
        self
    }
}

impl Alignment for StraightAlignment {
    fn direction(&self, _station: f64) -> Direction {
        self.bearing
    }

    fn station_and_offset(&self, point: &Point2<f64>) -> (f64, f64) {
        let d = point - self.origin;
        let t = self.bearing.vector();
        let n = self.bearing.right_normal().vector();
        (self.start_station + d.dot(&t), d.dot(&n))
    }

    fn locate_point(&self, station: f64, offset: f64) -> Point2<f64> {
        let t = self.bearing.vector();
        let n = self.bearing.right_normal().vector();
        self.origin + t * (station - self.start_station) + n * offset
    }

    fn elevation(&self, station: f64, offset: f64) -> f64 {
        self.surface.elevation(station, offset)
    }

    fn cross_slope(&self, _station: f64, offset: f64) -> f64 {
        self.surface.cross_slope(offset)
    }
}

/// Tangent runs joined at angle points.
///
/// Stations past either end extrapolate along the first or last tangent. At
/// an angle point the ahead tangent governs.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineAlignment {
    vertices: Vec<Point2<f64>>,
    tangents: Vec<Vector2<f64>>,
    cumulative: Vec<f64>,
    start_station: f64,
    surface: RoadwaySurface,
}

impl PolylineAlignment {
    /// Builds the alignment through `vertices`. Returns `None` with fewer
    /// than two vertices or when two consecutive vertices coincide.
    pub fn new(vertices: Vec<Point2<f64>>, start_station: f64) -> Option<Self> {
        if vertices.len() < 2 {
            return None;
        }

        let mut tangents = Vec::with_capacity(vertices.len() - 1);
        let mut cumulative = Vec::with_capacity(vertices.len());
        cumulative.push(0.0);
        for w in vertices.windows(2) {
            let d = w[1] - w[0];
            let len = d.norm();
            if len < 1e-12 {
                return None;
            }
            tangents.push(d / len);
            let last = cumulative[cumulative.len() - 1];
            cumulative.push(last + len);
        }

        Some(Self {
            vertices,
            tangents,
            cumulative,
            start_station,
            surface: RoadwaySurface::default(),
        })
    }

    pub fn with_surface(mut self, surface: RoadwaySurface) -> Self {
        self.surface = surface;
        self
    }

    /// Total length of the tangent runs.
    pub fn length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    fn segment_at(&self, station: f64) -> usize {
        let rel = station - self.start_station;
        let last = self.tangents.len() - 1;
        (0..last)
            .find(|&i| rel < self.cumulative[i + 1])
            .unwrap_or(last)
    }

    fn right_normal(t: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(t.y, -t.x)
    }
}

impl Alignment for PolylineAlignment {
    fn direction(&self, station: f64) -> Direction {
        Direction::from_vector(&self.tangents[self.segment_at(station)])
    }

    fn station_and_offset(&self, point: &Point2<f64>) -> (f64, f64) {
        let last = self.tangents.len() - 1;
        let mut best: Option<(f64, f64, f64)> = None; // (distance, station, offset)

        for (i, t) in self.tangents.iter().enumerate() {
            let seg_len = self.cumulative[i + 1] - self.cumulative[i];
            let mut u = (point - self.vertices[i]).dot(t);
            if i > 0 {
                u = u.max(0.0);
            }
            if i < last {
                u = u.min(seg_len);
            }
            let foot = self.vertices[i] + t * u;
            let diff = point - foot;
            let dist = diff.norm();
            let offset = if diff.dot(&Self::right_normal(t)) < 0.0 {
                -dist
            } else {
                dist
            };
            let station = self.start_station + self.cumulative[i] + u;
            if best.map_or(true, |(d, _, _)| dist < d - 1e-12) {
                best = Some((dist, station, offset));
            }
        }

        best.map(|(_, s, o)| (s, o)).unwrap_or((self.start_station, 0.0))
    }

    fn locate_point(&self, station: f64, offset: f64) -> Point2<f64> {
        let i = self.segment_at(station);
        let t = &self.tangents[i];
        let u = station - self.start_station - self.cumulative[i];
        self.vertices[i] + t * u + Self::right_normal(t) * offset
    }

    fn elevation(&self, station: f64, offset: f64) -> f64 {
        self.surface.elevation(station, offset)
    }

    fn cross_slope(&self, _station: f64, offset: f64) -> f64 {
        self.surface.cross_slope(offset)
    }

    fn has_angle_points(&self, start: f64, end: f64) -> bool {
        (1..self.vertices.len() - 1).any(|k| {
            let station = self.start_station + self.cumulative[k];
            let deflection = Direction::from_vector(&self.tangents[k - 1])
                .angle_between(&Direction::from_vector(&self.tangents[k]));
            station >= start && station <= end && deflection.abs() > ANGLE_POINT_EPS
        })
    }
}
