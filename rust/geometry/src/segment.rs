// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment end resolution.
//!
//! A precast segment spans two support lines, each carrying its own spacing
//! rule. The rules are applied at their measurement location (support line
//! or centerline of bearing) in their measurement direction, and each
//! girder's chord between the two measurement points is then extended or
//! trimmed back onto the support centerlines.

use bridge_lite_core::{
    plan::intersect_lines, skew_angle, Alignment, HalfWidths, MeasurementLocation, MeasurementType,
    PierFaceType, Point2, SpacingRule, SpacingSemantics, Vector2,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::spacing::{self, Basis, SpacingContext};
use crate::support::SupportLine;

/// Where and how a girder end was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementConvention {
    pub kind: MeasurementType,
    pub location: MeasurementLocation,
}

/// One end of a segment.
#[derive(Debug, Clone)]
pub struct SegmentEnd<'a> {
    pub support: &'a SupportLine,
    pub rule: &'a SpacingRule,
    /// Face of the support the segment frames into.
    pub face: PierFaceType,
    /// Flange half widths at this end, left to right.
    pub half_widths: Vec<HalfWidths>,
}

impl SegmentEnd<'_> {
    /// Temporary supports are always measured at their centerline.
    pub fn convention(&self) -> MeasurementConvention {
        let location = if self.support.id.is_temporary_support() {
            MeasurementLocation::AtSupportLine
        } else {
            self.rule.measurement_location
        };
        MeasurementConvention {
            kind: self.rule.measurement_type,
            location,
        }
    }

    /// Station of the line the rule is measured along.
    pub fn measurement_station(&self) -> Result<f64> {
        match self.convention().location {
            MeasurementLocation::AtSupportLine => Ok(self.support.station),
            MeasurementLocation::AtBearingLine => self.support.bearing_station(self.face),
        }
    }
}

/// Girder end points of one segment, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout {
    pub start_points: SmallVec<[Point2<f64>; 8]>,
    pub end_points: SmallVec<[Point2<f64>; 8]>,
    pub start_measurement: MeasurementConvention,
    pub end_measurement: MeasurementConvention,
}

impl SegmentLayout {
    pub fn girder_count(&self) -> usize {
        self.start_points.len()
    }
}

/// Chord directions whose cosine against the measurement line falls below
/// this cannot carry a joint.
const MIN_JOINT_COS: f64 = 1e-9;

/// Re-centering passes allowed before the joint walk is taken as settled.
const MAX_WALK_PASSES: usize = 8;

/// The line a rule is measured along at one segment end.
struct MeasurementFrame<'r> {
    origin: Point2<f64>,
    direction: Vector2<f64>,
    /// Offset of the rule's reference position along `direction`.
    anchor: f64,
    /// Centerline to centerline spacing assuming girders along the alignment.
    gaps: SmallVec<[f64; 8]>,
    rule: &'r SpacingRule,
    half_widths: &'r [HalfWidths],
}

impl MeasurementFrame<'_> {
    fn point(&self, offset: f64) -> Point2<f64> {
        self.origin + self.direction * offset
    }

    /// Offset of girder 0 that puts the reference girder on the anchor.
    fn leftmost(&self, gaps: &[f64]) -> f64 {
        self.anchor - spacing::reference_distance(self.rule.reference_girder, gaps)
    }

    /// Distance from girder `i` to girder `i + 1` along the measurement line,
    /// given the plan chord of girder `i`.
    fn gap_after(&self, i: usize, chord: &Vector2<f64>) -> Result<f64> {
        match self.rule.semantics {
            SpacingSemantics::GirderSpacing => Ok(self.gaps[i]),
            SpacingSemantics::JointSpacing => {
                let normal = Vector2::new(chord.y, -chord.x) / chord.norm();
                let cos = normal.dot(&self.direction).abs();
                if cos < MIN_JOINT_COS {
                    return Err(Error::InvariantViolation(format!(
                        "girder {i} runs along its own measurement line"
                    )));
                }
                let flanges = self.half_widths[i].right + self.half_widths[i + 1].left;
                Ok(self.rule.gaps[i] + flanges / cos)
            }
        }
    }
}

/// One pass over the girders of a segment.
struct Walk {
    start_points: SmallVec<[Point2<f64>; 8]>,
    end_points: SmallVec<[Point2<f64>; 8]>,
    start_gaps: SmallVec<[f64; 8]>,
    end_gaps: SmallVec<[f64; 8]>,
}

/// Resolves segment end points from the spacing rules at both ends.
pub struct SegmentSpacingResolver<'a> {
    alignment: &'a dyn Alignment,
    alignment_offset: f64,
    tolerance: f64,
}

impl<'a> SegmentSpacingResolver<'a> {
    pub fn new(alignment: &'a dyn Alignment, alignment_offset: f64, tolerance: f64) -> Self {
        Self {
            alignment,
            alignment_offset,
            tolerance,
        }
    }

    pub fn resolve(&self, start: &SegmentEnd<'_>, end: &SegmentEnd<'_>) -> Result<SegmentLayout> {
        let n = start.rule.girder_count();
        if end.rule.girder_count() != n {
            return Err(Error::IncompatibleSpacingCounts(format!(
                "segment from {} to {} has {} girders at its start and {} at its end",
                start.support.id,
                end.support.id,
                n,
                end.rule.girder_count()
            )));
        }

        let s = self.frame(start)?;
        let e = self.frame(end)?;

        // Joint corrections follow the walked chords; re-center until the
        // offsets of girder 0 agree with the gaps actually walked.
        let mut walk = self.walk(&s, &e, &s.gaps, &e.gaps, start, end)?;
        for _ in 1..MAX_WALK_PASSES {
            let next = self.walk(&s, &e, &walk.start_gaps, &walk.end_gaps, start, end)?;
            let settled = next
                .start_points
                .iter()
                .zip(&walk.start_points)
                .chain(next.end_points.iter().zip(&walk.end_points))
                .all(|(a, b)| (a - b).norm() <= self.tolerance);
            walk = next;
            if settled {
                break;
            }
        }

        Ok(SegmentLayout {
            start_points: walk.start_points,
            end_points: walk.end_points,
            start_measurement: start.convention(),
            end_measurement: end.convention(),
        })
    }

    /// Walks girders left to right from the girder 0 offsets implied by the
    /// given gaps, recording the gaps each chord actually produced.
    fn walk(
        &self,
        s: &MeasurementFrame<'_>,
        e: &MeasurementFrame<'_>,
        start_gaps: &[f64],
        end_gaps: &[f64],
        start: &SegmentEnd<'_>,
        end: &SegmentEnd<'_>,
    ) -> Result<Walk> {
        let n = start.rule.girder_count();
        let mut walk = Walk {
            start_points: SmallVec::with_capacity(n),
            end_points: SmallVec::with_capacity(n),
            start_gaps: SmallVec::with_capacity(n.saturating_sub(1)),
            end_gaps: SmallVec::with_capacity(n.saturating_sub(1)),
        };
        let (mut off_s, mut off_e) = (s.leftmost(start_gaps), e.leftmost(end_gaps));

        for i in 0..n {
            let ms = s.point(off_s);
            let me = e.point(off_e);
            let chord = me - ms;
            if chord.norm() <= self.tolerance {
                return Err(Error::InvalidTopologyConfiguration(format!(
                    "girder {i} from {} to {} has zero plan length",
                    start.support.id, end.support.id
                )));
            }

            walk.start_points.push(project_onto_support(&ms, &chord, start.support, i)?);
            walk.end_points.push(project_onto_support(&ms, &chord, end.support, i)?);

            if i + 1 < n {
                let (gap_s, gap_e) = (s.gap_after(i, &chord)?, e.gap_after(i, &chord)?);
                walk.start_gaps.push(gap_s);
                walk.end_gaps.push(gap_e);
                off_s += gap_s;
                off_e += gap_e;
            }
        }
        Ok(walk)
    }

    fn frame<'r>(&self, end: &'r SegmentEnd<'_>) -> Result<MeasurementFrame<'r>> {
        let station = end.measurement_station()?;
        let direction = match end.rule.measurement_type {
            MeasurementType::NormalToAlignment => self.alignment.normal(station).vector(),
            MeasurementType::AlongSupportLine => end.support.direction.vector(),
        };
        let skew = skew_angle(self.alignment, station, &end.support.direction);
        let ctx = SpacingContext::new(skew, self.alignment_offset, &end.half_widths);
        let resolved = spacing::resolve(end.rule, &ctx, Basis::Native)?;
        let gaps = spacing::center_to_center_gaps(end.rule, &ctx)?;

        Ok(MeasurementFrame {
            origin: self.alignment.locate_point(station, 0.0),
            direction,
            anchor: resolved.leftmost_offset + spacing::reference_distance(end.rule.reference_girder, &gaps),
            gaps,
            rule: end.rule,
            half_widths: &end.half_widths,
        })
    }
}

/// Extends the chord through `through` onto the centerline of `support`.
pub(crate) fn project_onto_support(
    through: &Point2<f64>,
    chord: &Vector2<f64>,
    support: &SupportLine,
    girder: usize,
) -> Result<Point2<f64>> {
    let (p, d) = support.centerline();
    intersect_lines(through, chord, &p, &d).ok_or_else(|| {
        Error::InvalidTopologyConfiguration(format!(
            "girder {girder} runs parallel to support {}",
            support.id
        ))
    })
}
