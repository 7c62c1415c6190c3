// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only bridge description snapshot.
//!
//! A [`BridgeDescription`] lists piers and temporary supports in station
//! order, the girder groups framing between piers, and the bridge-wide
//! girder orientation policy. Piers are addressed by index: span `i` runs
//! from pier `i` to pier `i + 1`.

use serde::{Deserialize, Serialize};

use crate::alignment::SupportOrientation;
use crate::spacing::SpacingRule;

/// Start or end of a girder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndType {
    Start,
    End,
}

/// Back (station-decreasing) or ahead face of a pier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PierFaceType {
    Back,
    Ahead,
}

/// Top flange width of a girder section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TopWidth {
    /// Flange split evenly about the girder centerline.
    Symmetric(f64),
    /// Flange centered on the section's center of gravity.
    CenteredCg(f64),
    /// Independent left and right widths from the centerline.
    Asymmetric { left: f64, right: f64 },
}

impl TopWidth {
    pub fn half_widths(&self) -> HalfWidths {
        match *self {
            TopWidth::Symmetric(w) | TopWidth::CenteredCg(w) => HalfWidths {
                left: w / 2.0,
                right: w / 2.0,
            },
            TopWidth::Asymmetric { left, right } => HalfWidths { left, right },
        }
    }
}

/// Distances from a girder centerline to its left and right flange tips.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HalfWidths {
    pub left: f64,
    pub right: f64,
}

impl HalfWidths {
    pub fn total(&self) -> f64 {
        self.left + self.right
    }

    /// Average of two half-width pairs, side by side.
    pub fn average(a: &HalfWidths, b: &HalfWidths) -> HalfWidths {
        HalfWidths {
            left: (a.left + b.left) / 2.0,
            right: (a.right + b.right) / 2.0,
        }
    }
}

/// Girder cross-section properties used for plan layout and orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderSection {
    pub name: String,
    /// Top width at the start and end of the girder.
    pub top_width: [TopWidth; 2],
    /// Overall height at the start and end of the girder.
    pub height: [f64; 2],
}

impl GirderSection {
    /// Constant-depth girder with the same top flange at both ends.
    pub fn prismatic(name: impl Into<String>, top_width: TopWidth, height: f64) -> Self {
        Self {
            name: name.into(),
            top_width: [top_width; 2],
            height: [height; 2],
        }
    }

    pub fn with_end_top_width(mut self, top_width: TopWidth) -> Self {
        self.top_width[1] = top_width;
        self
    }

    pub fn with_end_height(mut self, height: f64) -> Self {
        self.height[1] = height;
        self
    }

    pub fn top_flange_half_widths(&self, end: EndType) -> HalfWidths {
        self.top_width[end_slot(end)].half_widths()
    }

    pub fn height(&self, end: EndType) -> f64 {
        self.height[end_slot(end)]
    }

    pub fn is_variable_depth(&self) -> bool {
        (self.height[0] - self.height[1]).abs() > 1e-9
    }
}

fn end_slot(end: EndType) -> usize {
    match end {
        EndType::Start => 0,
        EndType::End => 1,
    }
}

/// How the bearing offset from the support centerline is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BearingOffsetMeasure {
    AlongGirder,
    NormalToPier,
}

/// How the girder end distance is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndDistanceMeasure {
    FromBearingAlongGirder,
    FromBearingNormalToPier,
    FromPierAlongGirder,
    FromPierNormalToPier,
}

/// Bearing and girder-end geometry on one side of a support.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub bearing_offset: f64,
    pub bearing_offset_measure: BearingOffsetMeasure,
    pub end_distance: f64,
    pub end_distance_measure: EndDistanceMeasure,
}

impl Default for ConnectionSpec {
    fn default() -> Self {
        Self {
            bearing_offset: 0.0,
            bearing_offset_measure: BearingOffsetMeasure::AlongGirder,
            end_distance: 0.0,
            end_distance_measure: EndDistanceMeasure::FromBearingAlongGirder,
        }
    }
}

/// One face of a pier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierFace {
    pub spacing: SpacingRule,
    #[serde(default)]
    pub connection: ConnectionSpec,
}

impl PierFace {
    pub fn new(spacing: SpacingRule) -> Self {
        Self {
            spacing,
            connection: ConnectionSpec::default(),
        }
    }

    pub fn with_connection(mut self, connection: ConnectionSpec) -> Self {
        self.connection = connection;
        self
    }
}

/// A permanent support. `back` is present when a span precedes the pier,
/// `ahead` when one follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pier {
    pub station: f64,
    #[serde(default)]
    pub orientation: SupportOrientation,
    pub back: Option<PierFace>,
    pub ahead: Option<PierFace>,
}

impl Pier {
    pub fn face(&self, face: PierFaceType) -> Option<&PierFace> {
        match face {
            PierFaceType::Back => self.back.as_ref(),
            PierFaceType::Ahead => self.ahead.as_ref(),
        }
    }
}

/// How segments frame into a temporary support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemporarySupportKind {
    /// A segment runs continuously over the support; spacing at the support
    /// is interpolated from the neighboring piers.
    ContinuousSegment,
    /// Segments end at the support and are joined by a closure joint; the
    /// support carries its own spacing, always measured at its centerline.
    ClosureJoint { spacing: SpacingRule },
}

/// A temporary (erection) support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporarySupport {
    pub station: f64,
    #[serde(default)]
    pub orientation: SupportOrientation,
    pub kind: TemporarySupportKind,
    #[serde(default)]
    pub connection: ConnectionSpec,
}

/// A support that ends a precast segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentBoundary {
    Pier(usize),
    TemporarySupport(usize),
}

/// Girders framing from `start_pier` to `end_pier`.
///
/// Every girder of a group is cut into the same segments; `interior_boundaries`
/// lists the supports between segments in station order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderGroup {
    pub start_pier: usize,
    pub end_pier: usize,
    pub girders: Vec<GirderSection>,
    #[serde(default)]
    pub interior_boundaries: Vec<SegmentBoundary>,
}

impl GirderGroup {
    pub fn new(start_pier: usize, end_pier: usize, girders: Vec<GirderSection>) -> Self {
        Self {
            start_pier,
            end_pier,
            girders,
            interior_boundaries: Vec::new(),
        }
    }

    pub fn girder_count(&self) -> usize {
        self.girders.len()
    }

    pub fn segment_count(&self) -> usize {
        self.interior_boundaries.len() + 1
    }

    /// All segment boundaries: start pier, interior supports, end pier.
    pub fn segment_boundaries(&self) -> Vec<SegmentBoundary> {
        let mut out = Vec::with_capacity(self.interior_boundaries.len() + 2);
        out.push(SegmentBoundary::Pier(self.start_pier));
        out.extend(self.interior_boundaries.iter().copied());
        out.push(SegmentBoundary::Pier(self.end_pier));
        out
    }

    /// Left-to-right flange half widths of the girders at one end.
    pub fn half_widths(&self, end: EndType) -> Vec<HalfWidths> {
        self.girders
            .iter()
            .map(|g| g.top_flange_half_widths(end))
            .collect()
    }

    pub fn contains_span(&self, span: usize) -> bool {
        self.start_pier <= span && span < self.end_pier
    }
}

/// Girder rotation policy about the longitudinal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GirderOrientation {
    #[default]
    Plumb,
    StartNormal,
    MidspanNormal,
    EndNormal,
    Balanced,
}

/// Reference point on the girder section that the layout line locates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkPointLocation {
    #[default]
    TopGirder,
    BottomGirder,
}

/// Whether spacing is declared once for the whole bridge or per support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpacingTopology {
    Uniform,
    #[default]
    General,
}

/// The complete input snapshot for one geometry build.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BridgeDescription {
    /// Offset from the alignment to the bridge line, normal to the alignment.
    #[serde(default)]
    pub alignment_offset: f64,
    pub piers: Vec<Pier>,
    #[serde(default)]
    pub temporary_supports: Vec<TemporarySupport>,
    pub groups: Vec<GirderGroup>,
    #[serde(default)]
    pub spacing_topology: SpacingTopology,
    #[serde(default)]
    pub girder_orientation: GirderOrientation,
    #[serde(default)]
    pub work_point: WorkPointLocation,
}

impl BridgeDescription {
    /// One continuous girder group over piers at `stations`, every pier face
    /// using `spacing`.
    pub fn continuous(stations: &[f64], girder: GirderSection, spacing: SpacingRule) -> Self {
        let piers = piers_at(stations, &spacing);
        let groups = if stations.len() > 1 {
            vec![GirderGroup::new(
                0,
                stations.len() - 1,
                vec![girder; spacing.girder_count()],
            )]
        } else {
            Vec::new()
        };
        Self {
            piers,
            groups,
            spacing_topology: SpacingTopology::Uniform,
            ..Self::default()
        }
    }

    /// One simple-span girder group per span.
    pub fn simple_spans(stations: &[f64], girder: GirderSection, spacing: SpacingRule) -> Self {
        let piers = piers_at(stations, &spacing);
        let groups = (0..stations.len().saturating_sub(1))
            .map(|span| GirderGroup::new(span, span + 1, vec![girder.clone(); spacing.girder_count()]))
            .collect();
        Self {
            piers,
            groups,
            spacing_topology: SpacingTopology::Uniform,
            ..Self::default()
        }
    }


    pub fn has_prev_span(&self, pier: usize) -> bool {
        pier > 0 && pier < self.piers.len()
    }

    pub fn has_next_span(&self, pier: usize) -> bool {
        pier + 1 < self.piers.len()
    }

    /// Index of the girder group framing span `span`.
    pub fn group_for_span(&self, span: usize) -> Option<usize> {
        self.groups.iter().position(|g| g.contains_span(span))
    }

    /// Span containing `station`, strictly between its two piers.
    pub fn span_at_station(&self, station: f64) -> Option<usize> {
        self.piers
            .windows(2)
            .position(|w| w[0].station < station && station < w[1].station)
    }

    /// Every spacing rule in the description, piers first.
    pub fn spacing_rules(&self) -> impl Iterator<Item = &SpacingRule> {
        let pier_rules = self
            .piers
            .iter()
            .flat_map(|p| [p.back.as_ref(), p.ahead.as_ref()])
            .flatten()
            .map(|f| &f.spacing);
        let ts_rules = self.temporary_supports.iter().filter_map(|ts| match &ts.kind {
            TemporarySupportKind::ClosureJoint { spacing } => Some(spacing),
            TemporarySupportKind::ContinuousSegment => None,
        });
        pier_rules.chain(ts_rules)
    }
}

fn piers_at(stations: &[f64], spacing: &SpacingRule) -> Vec<Pier> {
    let n = stations.len();
    stations
        .iter()
        .enumerate()
        .map(|(i, &station)| Pier {
            station,
            orientation: SupportOrientation::Normal,
            back: (i > 0).then(|| PierFace::new(spacing.clone())),
            ahead: (i + 1 < n).then(|| PierFace::new(spacing.clone())),
        })
        .collect()
}
