// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Support line layout.
//!
//! Every pier and temporary support becomes a [`SupportLine`]: a straight
//! construction line through the alignment at the support station, running
//! in the support direction, long enough to carry the widest girder group
//! framing into it. Width and offset are measured along the line.

use bridge_lite_core::{
    skew_angle, support_direction, Alignment, BearingOffsetMeasure, BridgeDescription,
    ConnectionSpec, Direction, EndDistanceMeasure, EndType, HalfWidths, PierFaceType, Point2,
    SpacingRule, SupportLineId, SupportOrientation, TemporarySupportKind, Vector2,
};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::spacing::{self, checked_cos, Basis, ResolvedSpacing, SpacingContext};

/// What a support line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportKind {
    Pier(usize),
    TemporarySupport(usize),
}

/// Canonical measurement direction for connection dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionMeasure {
    AlongItem,
    Normal,
}

/// Canonical datum for girder end distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndDistanceLocation {
    CenterlineBearing,
    PierLine,
}

/// Bearing and end-distance parameters on one face of a support line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceConnection {
    pub bearing_offset: f64,
    pub bearing_offset_measure: ConnectionMeasure,
    pub end_distance: f64,
    pub end_distance_location: EndDistanceLocation,
    pub end_distance_measure: ConnectionMeasure,
}

impl From<&ConnectionSpec> for FaceConnection {
    fn from(spec: &ConnectionSpec) -> Self {
        let bearing_offset_measure = match spec.bearing_offset_measure {
            BearingOffsetMeasure::AlongGirder => ConnectionMeasure::AlongItem,
            BearingOffsetMeasure::NormalToPier => ConnectionMeasure::Normal,
        };
        let (end_distance_location, end_distance_measure) = match spec.end_distance_measure {
            EndDistanceMeasure::FromBearingAlongGirder => {
                (EndDistanceLocation::CenterlineBearing, ConnectionMeasure::AlongItem)
            }
            EndDistanceMeasure::FromBearingNormalToPier => {
                (EndDistanceLocation::CenterlineBearing, ConnectionMeasure::Normal)
            }
            EndDistanceMeasure::FromPierAlongGirder => {
                (EndDistanceLocation::PierLine, ConnectionMeasure::AlongItem)
            }
            EndDistanceMeasure::FromPierNormalToPier => {
                (EndDistanceLocation::PierLine, ConnectionMeasure::Normal)
            }
        };
        Self {
            bearing_offset: spec.bearing_offset,
            bearing_offset_measure,
            end_distance: spec.end_distance,
            end_distance_location,
            end_distance_measure,
        }
    }
}

/// Construction line of a pier or temporary support.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportLine {
    pub id: SupportLineId,
    pub kind: SupportKind,
    pub station: f64,
    /// Points to the right side of the alignment.
    pub direction: Direction,
    /// Angle from the alignment normal to `direction`.
    pub skew: f64,
    /// Where the line crosses the alignment.
    pub alignment_point: Point2<f64>,
    /// Width carried by the support, along the line.
    pub length: f64,
    /// Alignment to the left end of the line, along the line.
    pub offset: f64,
    pub back: Option<FaceConnection>,
    pub ahead: Option<FaceConnection>,
}

impl SupportLine {
    /// Point at `offset` along the line from the alignment.
    pub fn point_at(&self, offset: f64) -> Point2<f64> {
        self.alignment_point + self.direction.vector() * offset
    }

    pub fn left_end(&self) -> Point2<f64> {
        self.point_at(self.offset)
    }

    pub fn right_end(&self) -> Point2<f64> {
        self.point_at(self.offset + self.length)
    }

    /// A point on the line and its direction vector.
    pub fn centerline(&self) -> (Point2<f64>, Vector2<f64>) {
        (self.alignment_point, self.direction.vector())
    }

    pub fn connection(&self, face: PierFaceType) -> Option<&FaceConnection> {
        match face {
            PierFaceType::Back => self.back.as_ref(),
            PierFaceType::Ahead => self.ahead.as_ref(),
        }
    }

    /// Station of the centerline of bearing on `face`.
    ///
    /// A bearing offset measured normal to the support is stretched by the
    /// skew before being applied along the alignment.
    pub fn bearing_station(&self, face: PierFaceType) -> Result<f64> {
        let conn = self.connection(face).ok_or_else(|| {
            Error::InvalidTopologyConfiguration(format!(
                "support {} has no {:?} face to measure a bearing line on",
                self.id, face
            ))
        })?;
        let mut offset = conn.bearing_offset;
        if conn.bearing_offset_measure == ConnectionMeasure::Normal {
            offset /= checked_cos(self.skew)?;
        }
        Ok(match face {
            PierFaceType::Back => self.station - offset,
            PierFaceType::Ahead => self.station + offset,
        })
    }
}

/// Support lines in creation order, indexed by ID.
#[derive(Debug, Clone, Default)]
pub struct SupportLineSet {
    lines: Vec<SupportLine>,
    index: FxHashMap<SupportLineId, usize>,
}

impl SupportLineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: SupportLine) -> Result<()> {
        if self.index.contains_key(&line.id) {
            return Err(Error::InvariantViolation(format!(
                "support line {} created twice",
                line.id
            )));
        }
        self.index.insert(line.id, self.lines.len());
        self.lines.push(line);
        Ok(())
    }

    pub fn get(&self, id: SupportLineId) -> Option<&SupportLine> {
        self.index.get(&id).map(|&i| &self.lines[i])
    }

    /// Like [`get`](Self::get), for lines the builder itself created.
    pub(crate) fn require(&self, id: SupportLineId) -> Result<&SupportLine> {
        self.get(id)
            .ok_or_else(|| Error::InvariantViolation(format!("support line {} was never laid out", id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SupportLine> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[SupportLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A support a continuous-segment temporary support takes its spacing from.
#[derive(Debug, Clone, Copy)]
enum Neighbor<'a> {
    Pier(usize),
    ClosureJoint(usize, &'a SpacingRule),
}

/// Lays out pier and temporary support lines.
pub struct SupportLineLayoutEngine<'a> {
    desc: &'a BridgeDescription,
    alignment: &'a dyn Alignment,
}

impl<'a> SupportLineLayoutEngine<'a> {
    pub fn new(desc: &'a BridgeDescription, alignment: &'a dyn Alignment) -> Self {
        Self { desc, alignment }
    }

    /// One support line per pier, in pier order.
    pub fn layout_piers(&self) -> Result<Vec<SupportLine>> {
        let mut lines = Vec::with_capacity(self.desc.piers.len());

        for (pier_idx, pier) in self.desc.piers.iter().enumerate() {
            let has_back = self.desc.has_prev_span(pier_idx);
            let has_ahead = self.desc.has_next_span(pier_idx);
            if !has_back && !has_ahead {
                return Err(Error::InvalidTopologyConfiguration(format!(
                    "pier {pier_idx} has no adjacent span"
                )));
            }

            let (direction, skew) = self.orient(pier.station, &pier.orientation, || format!("pier {pier_idx}"))?;

            let back = if has_back {
                Some(self.resolve_pier_face(pier_idx, PierFaceType::Back, skew)?)
            } else {
                None
            };
            let ahead = if has_ahead {
                Some(self.resolve_pier_face(pier_idx, PierFaceType::Ahead, skew)?)
            } else {
                None
            };

            let governing = match (back, ahead) {
                (Some(b), Some(a)) if b.support_width < a.support_width => a,
                (Some(b), _) => b,
                (None, Some(a)) => a,
                (None, None) => {
                    return Err(Error::InvariantViolation(format!(
                        "pier {pier_idx} resolved no face spacing"
                    )))
                }
            };

            let connection = |face: PierFaceType| pier.face(face).map(|f| FaceConnection::from(&f.connection));

            let line = SupportLine {
                id: SupportLineId::pier(pier_idx)?,
                kind: SupportKind::Pier(pier_idx),
                station: pier.station,
                direction,
                skew,
                alignment_point: self.alignment.locate_point(pier.station, 0.0),
                length: governing.support_width,
                offset: governing.left_end_offset(),
                back: if has_back { connection(PierFaceType::Back) } else { None },
                ahead: if has_ahead { connection(PierFaceType::Ahead) } else { None },
            };

            tracing::debug!(
                id = %line.id,
                station = line.station,
                skew = line.skew,
                length = line.length,
                offset = line.offset,
                "Laid out pier line"
            );
            lines.push(line);
        }

        Ok(lines)
    }

    /// One support line per temporary support, in description order.
    pub fn layout_temporary_supports(&self) -> Result<Vec<SupportLine>> {
        let mut lines = Vec::with_capacity(self.desc.temporary_supports.len());

        for (ts_idx, ts) in self.desc.temporary_supports.iter().enumerate() {
            let (direction, skew) = self.orient(ts.station, &ts.orientation, || {
                format!("temporary support {ts_idx}")
            })?;

            let span = self.desc.span_at_station(ts.station).ok_or_else(|| {
                Error::InvalidTopologyConfiguration(format!(
                    "temporary support {ts_idx} at station {} does not fall inside a span",
                    ts.station
                ))
            })?;

            let (length, offset) = match &ts.kind {
                TemporarySupportKind::ContinuousSegment => self.interpolate_between_neighbors(span, ts.station, ts_idx)?,
                TemporarySupportKind::ClosureJoint { spacing } => {
                    let resolved = self.resolve_closure_joint(spacing, span, skew)?;
                    (resolved.support_width, resolved.left_end_offset())
                }
            };

            let connection = FaceConnection::from(&ts.connection);
            let line = SupportLine {
                id: SupportLineId::temporary_support(ts_idx)?,
                kind: SupportKind::TemporarySupport(ts_idx),
                station: ts.station,
                direction,
                skew,
                alignment_point: self.alignment.locate_point(ts.station, 0.0),
                length,
                offset,
                back: Some(connection),
                ahead: Some(connection),
            };

            tracing::debug!(
                id = %line.id,
                station = line.station,
                length = line.length,
                offset = line.offset,
                "Laid out temporary support line"
            );
            lines.push(line);
        }

        Ok(lines)
    }

    /// Width and left-end offset at `station`, interpolated between the
    /// nearest supports on either side that carry their own spacing: the
    /// piers bounding `span` or a closure joint inside it. Each neighbor is
    /// resolved at its own skew.
    fn interpolate_between_neighbors(&self, span: usize, station: f64, ts_idx: usize) -> Result<(f64, f64)> {
        let mut prev = (Neighbor::Pier(span), self.desc.piers[span].station);
        let mut next = (Neighbor::Pier(span + 1), self.desc.piers[span + 1].station);

        for (idx, other) in self.desc.temporary_supports.iter().enumerate() {
            let TemporarySupportKind::ClosureJoint { spacing } = &other.kind else {
                continue;
            };
            if other.station < station && other.station > prev.1 {
                prev = (Neighbor::ClosureJoint(idx, spacing), other.station);
            } else if other.station > station && other.station < next.1 {
                next = (Neighbor::ClosureJoint(idx, spacing), other.station);
            }
        }

        let start = self.resolve_neighbor(prev.0, PierFaceType::Ahead, span, ts_idx)?;
        let end = self.resolve_neighbor(next.0, PierFaceType::Back, span, ts_idx)?;

        let fraction = (station - prev.1) / (next.1 - prev.1);
        let lerp = |a: f64, b: f64| a + fraction * (b - a);
        Ok((
            lerp(start.support_width, end.support_width),
            lerp(start.left_end_offset(), end.left_end_offset()),
        ))
    }

    /// Resolves the spacing `neighbor` presents toward temporary support `ts_idx`.
    fn resolve_neighbor(
        &self,
        neighbor: Neighbor<'_>,
        face: PierFaceType,
        span: usize,
        ts_idx: usize,
    ) -> Result<ResolvedSpacing> {
        match neighbor {
            Neighbor::Pier(pier_idx) => {
                let pier = &self.desc.piers[pier_idx];
                if pier.face(face).is_none() {
                    return Err(Error::InvalidTopologyConfiguration(format!(
                        "temporary support {ts_idx} cannot interpolate spacing: pier {pier_idx} has no face toward span {span}"
                    )));
                }
                let (_, skew) = self.orient(pier.station, &pier.orientation, || format!("pier {pier_idx}"))?;
                self.resolve_pier_face(pier_idx, face, skew)
            }
            Neighbor::ClosureJoint(idx, spacing) => {
                let ts = &self.desc.temporary_supports[idx];
                let (_, skew) = self.orient(ts.station, &ts.orientation, || format!("temporary support {idx}"))?;
                self.resolve_closure_joint(spacing, span, skew)
            }
        }
    }

    fn resolve_closure_joint(&self, spacing: &SpacingRule, span: usize, skew: f64) -> Result<ResolvedSpacing> {
        let widths = self.span_half_widths(span, EndType::Start);
        self.resolve_rule(spacing, skew, &widths)
    }

    fn resolve_pier_face(&self, pier_idx: usize, face: PierFaceType, skew: f64) -> Result<ResolvedSpacing> {
        let pier_face = self.desc.piers[pier_idx].face(face).ok_or_else(|| {
            Error::InvalidTopologyConfiguration(format!(
                "pier {pier_idx} frames a span on its {face:?} side but has no {face:?} face spacing"
            ))
        })?;

        let (span, end) = match face {
            PierFaceType::Back => (pier_idx.wrapping_sub(1), EndType::End),
            PierFaceType::Ahead => (pier_idx, EndType::Start),
        };
        let widths = self.span_half_widths(span, end);

        self.resolve_rule(&pier_face.spacing, skew, &widths).map_err(|e| match e {
            Error::InvalidSpacingConfiguration(msg) => {
                Error::InvalidSpacingConfiguration(format!("pier {pier_idx} {face:?} face: {msg}"))
            }
            other => other,
        })
    }

    fn resolve_rule(&self, rule: &SpacingRule, skew: f64, widths: &[HalfWidths]) -> Result<ResolvedSpacing> {
        let ctx = SpacingContext::new(skew, self.desc.alignment_offset, widths);
        spacing::resolve(rule, &ctx, Basis::AlongSupportLine)
    }

    /// Flange half widths of the group framing `span`, empty when no group does.
    fn span_half_widths(&self, span: usize, end: EndType) -> Vec<HalfWidths> {
        self.desc
            .group_for_span(span)
            .map(|g| self.desc.groups[g].half_widths(end))
            .unwrap_or_default()
    }

    fn orient(
        &self,
        station: f64,
        orientation: &SupportOrientation,
        name: impl Fn() -> String,
    ) -> Result<(Direction, f64)> {
        let direction = support_direction(self.alignment, station, orientation);
        let skew = skew_angle(self.alignment, station, &direction);
        if checked_cos(skew).is_err() {
            return Err(Error::InvalidTopologyConfiguration(format!(
                "{} at station {station} runs parallel to the alignment",
                name()
            )));
        }
        Ok((direction, skew))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bridge_lite_core::{
        GirderSection, Pier, PierFace, SegmentBoundary, SpacingSemantics, StraightAlignment, TemporarySupport,
        TopWidth,
    };
    use std::f64::consts::FRAC_PI_6;

    fn girder() -> GirderSection {
        GirderSection::prismatic("WF42G", TopWidth::Symmetric(4.0), 3.5)
    }

    #[test]
    fn normal_piers_carry_the_group_width() {
        let desc = BridgeDescription::continuous(&[0.0, 100.0, 200.0], girder(), SpacingRule::uniform(4, 8.0));
        let alignment = StraightAlignment::east();
        let lines = SupportLineLayoutEngine::new(&desc, &alignment).layout_piers().unwrap();

        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_relative_eq!(line.length, 24.0);
            assert_relative_eq!(line.offset, -12.0);
            assert_relative_eq!(line.skew, 0.0, epsilon = 1e-12);
        }
        assert!(lines[0].back.is_none());
        assert!(lines[1].back.is_some() && lines[1].ahead.is_some());
        assert_eq!(lines[2].id, SupportLineId(2));
        assert_relative_eq!(lines[2].left_end().x, 200.0, epsilon = 1e-12);
        assert_relative_eq!(lines[2].left_end().y, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn skewed_pier_stretches_normal_spacing() {
        let mut desc = BridgeDescription::continuous(&[0.0, 100.0], girder(), SpacingRule::uniform(3, 10.0));
        desc.piers[1].orientation = SupportOrientation::Skew(FRAC_PI_6);
        let alignment = StraightAlignment::east();
        let lines = SupportLineLayoutEngine::new(&desc, &alignment).layout_piers().unwrap();
        assert_relative_eq!(lines[1].length, 20.0 / FRAC_PI_6.cos(), epsilon = 1e-9);
        assert_relative_eq!(lines[0].length, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn wider_face_governs() {
        let mut desc = BridgeDescription::simple_spans(&[0.0, 100.0, 200.0], girder(), SpacingRule::uniform(4, 8.0));
        desc.piers[1].ahead = Some(PierFace::new(SpacingRule::uniform(4, 9.0)));
        let alignment = StraightAlignment::east();
        let lines = SupportLineLayoutEngine::new(&desc, &alignment).layout_piers().unwrap();
        assert_relative_eq!(lines[1].length, 27.0);
        assert_relative_eq!(lines[1].offset, -13.5);
    }

    #[test]
    fn joint_spacing_support_width_is_out_to_out() {
        let rule = SpacingRule::uniform(4, 2.0 / 12.0).with_semantics(SpacingSemantics::JointSpacing);
        let desc = BridgeDescription::continuous(&[0.0, 100.0, 200.0], girder(), rule);
        let alignment = StraightAlignment::east();
        let lines = SupportLineLayoutEngine::new(&desc, &alignment).layout_piers().unwrap();
        assert_relative_eq!(lines[1].length, 16.5, epsilon = 1e-12);
    }

    #[test]
    fn isolated_pier_is_rejected() {
        let desc = BridgeDescription {
            piers: vec![Pier {
                station: 0.0,
                orientation: SupportOrientation::Normal,
                back: None,
                ahead: Some(PierFace::new(SpacingRule::uniform(2, 8.0))),
            }],
            ..BridgeDescription::default()
        };
        let alignment = StraightAlignment::east();
        assert!(matches!(
            SupportLineLayoutEngine::new(&desc, &alignment).layout_piers(),
            Err(Error::InvalidTopologyConfiguration(_))
        ));
    }

    #[test]
    fn missing_face_is_rejected() {
        let mut desc = BridgeDescription::continuous(&[0.0, 100.0], girder(), SpacingRule::uniform(2, 8.0));
        desc.piers[1].back = None;
        let alignment = StraightAlignment::east();
        assert!(matches!(
            SupportLineLayoutEngine::new(&desc, &alignment).layout_piers(),
            Err(Error::InvalidTopologyConfiguration(_))
        ));
    }

    #[test]
    fn continuous_segment_temporary_support_interpolates() {
        let mut desc = BridgeDescription::continuous(&[0.0, 100.0, 200.0], girder(), SpacingRule::uniform(2, 10.0));
        desc.piers[2].back = Some(PierFace::new(SpacingRule::uniform(2, 14.0)));
        desc.temporary_supports.push(TemporarySupport {
            station: 150.0,
            orientation: SupportOrientation::Normal,
            kind: TemporarySupportKind::ContinuousSegment,
            connection: ConnectionSpec::default(),
        });
        let alignment = StraightAlignment::east();
        let lines = SupportLineLayoutEngine::new(&desc, &alignment)
            .layout_temporary_supports()
            .unwrap();
        assert_eq!(lines[0].id, SupportLineId(-1));
        assert_relative_eq!(lines[0].length, 12.0);
        assert_relative_eq!(lines[0].offset, -6.0);
    }

    #[test]
    fn continuous_segment_interpolates_from_an_abutting_closure_joint() {
        let mut desc = BridgeDescription::continuous(&[0.0, 200.0], girder(), SpacingRule::uniform(2, 10.0));
        desc.temporary_supports.push(TemporarySupport {
            station: 100.0,
            orientation: SupportOrientation::Normal,
            kind: TemporarySupportKind::ClosureJoint {
                spacing: SpacingRule::uniform(2, 20.0),
            },
            connection: ConnectionSpec::default(),
        });
        desc.temporary_supports.push(TemporarySupport {
            station: 150.0,
            orientation: SupportOrientation::Normal,
            kind: TemporarySupportKind::ContinuousSegment,
            connection: ConnectionSpec::default(),
        });
        desc.groups[0].interior_boundaries = vec![SegmentBoundary::TemporarySupport(0)];

        let alignment = StraightAlignment::east();
        let lines = SupportLineLayoutEngine::new(&desc, &alignment)
            .layout_temporary_supports()
            .unwrap();
        assert_relative_eq!(lines[0].length, 20.0);
        assert_relative_eq!(lines[1].length, 15.0);
        assert_relative_eq!(lines[1].offset, -7.5);
    }

    #[test]
    fn temporary_support_outside_the_bridge_is_rejected() {
        let mut desc = BridgeDescription::continuous(&[0.0, 100.0], girder(), SpacingRule::uniform(2, 10.0));
        desc.temporary_supports.push(TemporarySupport {
            station: 250.0,
            orientation: SupportOrientation::Normal,
            kind: TemporarySupportKind::ContinuousSegment,
            connection: ConnectionSpec::default(),
        });
        let alignment = StraightAlignment::east();
        assert!(matches!(
            SupportLineLayoutEngine::new(&desc, &alignment).layout_temporary_supports(),
            Err(Error::InvalidTopologyConfiguration(_))
        ));
    }

    #[test]
    fn connection_measures_are_canonicalized() {
        let spec = ConnectionSpec {
            bearing_offset: 1.0,
            bearing_offset_measure: BearingOffsetMeasure::NormalToPier,
            end_distance: 0.5,
            end_distance_measure: EndDistanceMeasure::FromPierAlongGirder,
        };
        let conn = FaceConnection::from(&spec);
        assert_eq!(conn.bearing_offset_measure, ConnectionMeasure::Normal);
        assert_eq!(conn.end_distance_location, EndDistanceLocation::PierLine);
        assert_eq!(conn.end_distance_measure, ConnectionMeasure::AlongItem);
    }

    #[test]
    fn bearing_station_on_a_skewed_pier() {
        let mut desc = BridgeDescription::continuous(&[0.0, 100.0], girder(), SpacingRule::uniform(2, 8.0));
        desc.piers[1].orientation = SupportOrientation::Skew(FRAC_PI_6);
        if let Some(face) = desc.piers[1].back.as_mut() {
            face.connection.bearing_offset = 1.0;
            face.connection.bearing_offset_measure = BearingOffsetMeasure::NormalToPier;
        }
        let alignment = StraightAlignment::east();
        let lines = SupportLineLayoutEngine::new(&desc, &alignment).layout_piers().unwrap();
        let station = lines[1].bearing_station(PierFaceType::Back).unwrap();
        assert_relative_eq!(station, 100.0 - 1.0 / FRAC_PI_6.cos(), epsilon = 1e-12);
        assert!(lines[0].bearing_station(PierFaceType::Back).is_err());
    }
}
