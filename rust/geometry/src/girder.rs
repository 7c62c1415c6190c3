// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Girder line layout.
//!
//! Two strategies locate the girder ends of every segment:
//!
//! - **Uniform**: one bridge-wide rule measured normal to a straight
//!   alignment, so each girder sits at a fixed offset and its chord runs
//!   between the measurement points at either end.
//! - **General**: every segment is resolved from the rules at its two ends
//!   with [`SegmentSpacingResolver`].
//!
//! Orientation and the layout line shift are applied afterwards, the same way
//! for both.

use bridge_lite_core::{
    plan::offset_path, Alignment, BridgeDescription, Direction, EndType, GirderGroup,
    GirderLineId, GirderOrientation, MeasurementType, PierFaceType, Point2, SegmentBoundary,
    SegmentKey, SpacingSemantics, SpacingTopology, SupportLineId, TemporarySupportKind,
    WorkPointLocation,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::{BuilderConfig, StrategyPreference};
use crate::error::{Error, Result};
use crate::orientation::{GirderOrientationShift, GirderSpan, OrientationResolver};
use crate::segment::{
    project_onto_support, MeasurementConvention, SegmentEnd, SegmentLayout, SegmentSpacingResolver,
};
use crate::spacing::{self, Basis, SpacingContext};
use crate::support::SupportLineSet;

/// Which strategy produced the girder lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutStrategy {
    Uniform,
    General,
}

/// Plan construction line of one girder segment.
#[derive(Debug, Clone, PartialEq)]
pub struct GirderLine {
    pub id: GirderLineId,
    pub key: SegmentKey,
    /// Chord path from the start support to the end support.
    pub path: Vec<Point2<f64>>,
    pub start_support: SupportLineId,
    pub end_support: SupportLineId,
    pub start_measurement: MeasurementConvention,
    pub end_measurement: MeasurementConvention,
}

impl GirderLine {
    pub fn start_point(&self) -> Point2<f64> {
        self.path[0]
    }

    pub fn end_point(&self) -> Point2<f64> {
        self.path[self.path.len() - 1]
    }

    /// Plan length along the path.
    pub fn length(&self) -> f64 {
        self.path.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// Direction from the start point to the end point.
    pub fn direction(&self) -> Direction {
        Direction::from_vector(&(self.end_point() - self.start_point()))
    }
}

/// Locates girder end points for one segment.
pub trait SegmentLayoutStrategy {
    fn layout_segment(&self, start: &SegmentEnd<'_>, end: &SegmentEnd<'_>) -> Result<SegmentLayout>;
}

impl SegmentLayoutStrategy for SegmentSpacingResolver<'_> {
    fn layout_segment(&self, start: &SegmentEnd<'_>, end: &SegmentEnd<'_>) -> Result<SegmentLayout> {
        self.resolve(start, end)
    }
}

/// Fixed girder offsets normal to the alignment.
pub struct UniformLayout<'a> {
    alignment: &'a dyn Alignment,
    offsets: SmallVec<[f64; 8]>,
}

impl<'a> UniformLayout<'a> {
    pub fn new(alignment: &'a dyn Alignment, offsets: SmallVec<[f64; 8]>) -> Self {
        Self { alignment, offsets }
    }
}

impl SegmentLayoutStrategy for UniformLayout<'_> {
    fn layout_segment(&self, start: &SegmentEnd<'_>, end: &SegmentEnd<'_>) -> Result<SegmentLayout> {
        let station_s = start.measurement_station()?;
        let station_e = end.measurement_station()?;

        let mut start_points = SmallVec::with_capacity(self.offsets.len());
        let mut end_points = SmallVec::with_capacity(self.offsets.len());
        for (i, &offset) in self.offsets.iter().enumerate() {
            let ms = self.alignment.locate_point(station_s, offset);
            let me = self.alignment.locate_point(station_e, offset);
            let chord = me - ms;
            start_points.push(project_onto_support(&ms, &chord, start.support, i)?);
            end_points.push(project_onto_support(&ms, &chord, end.support, i)?);
        }

        Ok(SegmentLayout {
            start_points,
            end_points,
            start_measurement: start.convention(),
            end_measurement: end.convention(),
        })
    }
}

/// Girder lines plus the orientation of every segment.
#[derive(Debug, Clone)]
pub struct GirderLayout {
    pub lines: Vec<GirderLine>,
    pub orientation: Vec<(SegmentKey, GirderOrientationShift)>,
    pub strategy: LayoutStrategy,
}

pub struct GirderLineLayoutEngine<'a> {
    desc: &'a BridgeDescription,
    alignment: &'a dyn Alignment,
    supports: &'a SupportLineSet,
    config: &'a BuilderConfig,
}

impl<'a> GirderLineLayoutEngine<'a> {
    pub fn new(
        desc: &'a BridgeDescription,
        alignment: &'a dyn Alignment,
        supports: &'a SupportLineSet,
        config: &'a BuilderConfig,
    ) -> Self {
        Self {
            desc,
            alignment,
            supports,
            config,
        }
    }

    /// Lays out every girder segment of every group.
    pub fn layout(&self) -> Result<GirderLayout> {
        match self.select_strategy() {
            Some(offsets) => {
                let uniform = UniformLayout::new(self.alignment, offsets);
                self.layout_with(&uniform, LayoutStrategy::Uniform)
            }
            None => {
                let general = SegmentSpacingResolver::new(
                    self.alignment,
                    self.desc.alignment_offset,
                    self.config.tolerance,
                );
                self.layout_with(&general, LayoutStrategy::General)
            }
        }
    }

    /// Uniform girder offsets when the fast path applies.
    fn select_strategy(&self) -> Option<SmallVec<[f64; 8]>> {
        if self.desc.spacing_topology != SpacingTopology::Uniform
            || self.config.strategy == StrategyPreference::GeneralOnly
        {
            return None;
        }
        match self.uniform_offsets() {
            Ok(offsets) => Some(offsets),
            Err(reason) => {
                tracing::warn!(reason = %reason, "Uniform girder layout not applicable, using general layout");
                None
            }
        }
    }

    /// Checks the uniform preconditions and returns the girder offsets, or
    /// the first violated precondition.
    pub fn uniform_offsets(&self) -> std::result::Result<SmallVec<[f64; 8]>, String> {
        let desc = self.desc;
        let first_group = desc.groups.first().ok_or("bridge has no girder groups")?;
        if desc.groups.iter().any(|g| g.girders != first_group.girders) {
            return Err("girder count or type varies between groups".into());
        }

        let mut rules = desc.spacing_rules();
        let rule = rules.next().ok_or("bridge has no spacing rules")?;
        if rules.any(|r| r != rule) {
            return Err("spacing varies between supports".into());
        }
        if rule.measurement_type != MeasurementType::NormalToAlignment {
            return Err("spacing is not measured normal to the alignment".into());
        }
        if rule.semantics != SpacingSemantics::GirderSpacing {
            return Err("spacing is given as joint widths".into());
        }
        if rule.girder_count() != first_group.girder_count() {
            return Err(format!(
                "spacing defines {} girders but groups have {}",
                rule.girder_count(),
                first_group.girder_count()
            ));
        }
        if let Some(&gap) = rule.gaps.first() {
            if rule.gaps.iter().any(|g| (g - gap).abs() > self.config.tolerance) {
                return Err("girder spacing is not constant".into());
            }
        }

        let (first, last) = match (desc.piers.first(), desc.piers.last()) {
            (Some(f), Some(l)) => (f.station, l.station),
            _ => return Err("bridge has no piers".into()),
        };
        if self.alignment.has_angle_points(first, last) {
            return Err("alignment has angle points within the bridge".into());
        }
        if desc.work_point != WorkPointLocation::TopGirder && desc.girder_orientation != GirderOrientation::Plumb {
            return Err("rotated girders are located at their bottom".into());
        }

        let ctx = SpacingContext::new(0.0, desc.alignment_offset, &[]);
        spacing::girder_offsets(rule, &ctx, Basis::Native).map_err(|e| e.to_string())
    }

    fn layout_with(&self, strategy: &dyn SegmentLayoutStrategy, kind: LayoutStrategy) -> Result<GirderLayout> {
        let orientation = OrientationResolver::new(self.alignment, self.config.tolerance);
        let mut out = GirderLayout {
            lines: Vec::new(),
            orientation: Vec::new(),
            strategy: kind,
        };

        for (group_idx, group) in self.desc.groups.iter().enumerate() {
            let boundaries = group.segment_boundaries();
            let mut segments = Vec::with_capacity(boundaries.len() - 1);
            for pair in boundaries.windows(2) {
                let start = self.segment_end(group, pair[0], PierFaceType::Ahead)?;
                let end = self.segment_end(group, pair[1], PierFaceType::Back)?;
                let layout = strategy.layout_segment(&start, &end)?;
                if layout.girder_count() != group.girder_count() {
                    return Err(Error::IncompatibleSpacingCounts(format!(
                        "group {group_idx} has {} girders but spacing from {} to {} defines {}",
                        group.girder_count(),
                        start.support.id,
                        end.support.id,
                        layout.girder_count()
                    )));
                }
                tracing::debug!(
                    group = group_idx,
                    segment = segments.len(),
                    start = %start.support.id,
                    end = %end.support.id,
                    "Resolved segment ends"
                );
                segments.push((start.support.id, end.support.id, layout));
            }

            let (first, last) = match (segments.first(), segments.last()) {
                (Some(f), Some(l)) => (&f.2, &l.2),
                _ => {
                    return Err(Error::InvariantViolation(format!(
                        "group {group_idx} has no segments"
                    )))
                }
            };

            for (girder_idx, section) in group.girders.iter().enumerate() {
                let span = GirderSpan {
                    group: group_idx,
                    girder: girder_idx,
                    section,
                    start: first.start_points[girder_idx],
                    end: last.end_points[girder_idx],
                };
                let shift = orientation.resolve(self.desc.girder_orientation, self.desc.work_point, &span)?;

                for (segment_idx, (start_support, end_support, layout)) in segments.iter().enumerate() {
                    let key = SegmentKey::new(group_idx, girder_idx, segment_idx);
                    let chord = [layout.start_points[girder_idx], layout.end_points[girder_idx]];
                    let path = offset_path(&chord, shift.layout_line_shift).ok_or_else(|| {
                        Error::InvalidTopologyConfiguration(format!("girder segment {key} has zero plan length"))
                    })?;

                    out.lines.push(GirderLine {
                        id: key.girder_line_id()?,
                        key,
                        path,
                        start_support: *start_support,
                        end_support: *end_support,
                        start_measurement: layout.start_measurement,
                        end_measurement: layout.end_measurement,
                    });
                    out.orientation.push((key, shift));
                }
            }
        }

        Ok(out)
    }

    /// The support, rule and half widths at one end of a segment.
    ///
    /// Segments start on the ahead face of a pier and end on its back face;
    /// closure joints carry a single rule for both.
    fn segment_end(&self, group: &GirderGroup, boundary: SegmentBoundary, face: PierFaceType) -> Result<SegmentEnd<'a>> {
        let (id, rule) = match boundary {
            SegmentBoundary::Pier(p) => {
                let pier = self.desc.piers.get(p).ok_or_else(|| {
                    Error::InvalidTopologyConfiguration(format!("segment boundary names missing pier {p}"))
                })?;
                let face_spacing = pier.face(face).ok_or_else(|| {
                    Error::InvalidTopologyConfiguration(format!("pier {p} has no {face:?} face for a segment to frame into"))
                })?;
                (SupportLineId::pier(p)?, &face_spacing.spacing)
            }
            SegmentBoundary::TemporarySupport(t) => {
                let ts = self.desc.temporary_supports.get(t).ok_or_else(|| {
                    Error::InvalidTopologyConfiguration(format!(
                        "segment boundary names missing temporary support {t}"
                    ))
                })?;
                let rule = match &ts.kind {
                    TemporarySupportKind::ClosureJoint { spacing } => spacing,
                    TemporarySupportKind::ContinuousSegment => {
                        return Err(Error::InvalidTopologyConfiguration(format!(
                            "temporary support {t} carries a continuous segment and cannot end one"
                        )))
                    }
                };
                (SupportLineId::temporary_support(t)?, rule)
            }
        };

        let end = match face {
            PierFaceType::Ahead => EndType::Start,
            PierFaceType::Back => EndType::End,
        };
        Ok(SegmentEnd {
            support: self.supports.require(id)?,
            rule,
            face,
            half_widths: group.half_widths(end),
        })
    }
}
