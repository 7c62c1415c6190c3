// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Girder spacing rules attached to support faces.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// How the gap widths of a [`SpacingRule`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpacingSemantics {
    /// Centerline-to-centerline girder spacing.
    GirderSpacing,
    /// Clear gap between the top flange edges of adjacent girders.
    JointSpacing,
}

/// The girder whose position the reference offset locates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceGirder {
    /// A specific girder, 0-based from the left.
    Index(usize),
    /// The center of the girder group.
    Centered,
}

/// Line the reference offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OffsetDatum {
    Alignment,
    BridgeLine,
}

/// Direction along which spacing is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementType {
    AlongSupportLine,
    NormalToAlignment,
}

/// Where along the girder spacing is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementLocation {
    AtSupportLine,
    AtBearingLine,
}

/// Girder spacing at one support face.
///
/// `gaps` holds `N - 1` widths for `N` girders, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingRule {
    pub gaps: SmallVec<[f64; 8]>,
    pub semantics: SpacingSemantics,
    pub reference_girder: ReferenceGirder,
    pub reference_offset: f64,
    pub offset_datum: OffsetDatum,
    pub measurement_type: MeasurementType,
    pub measurement_location: MeasurementLocation,
}

impl SpacingRule {
    /// `girder_count` girders at a constant center-to-center `spacing`,
    /// centered on the alignment and measured normal to it at the support
    /// line.
    pub fn uniform(girder_count: usize, spacing: f64) -> Self {
        Self::from_gaps(std::iter::repeat(spacing).take(girder_count.saturating_sub(1)))
    }

    /// Rule with explicit gap widths and the same defaults as [`uniform`](Self::uniform).
    pub fn from_gaps(gaps: impl IntoIterator<Item = f64>) -> Self {
        Self {
            gaps: gaps.into_iter().collect(),
            semantics: SpacingSemantics::GirderSpacing,
            reference_girder: ReferenceGirder::Centered,
            reference_offset: 0.0,
            offset_datum: OffsetDatum::Alignment,
            measurement_type: MeasurementType::NormalToAlignment,
            measurement_location: MeasurementLocation::AtSupportLine,
        }
    }

    pub fn with_semantics(mut self, semantics: SpacingSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn with_reference(mut self, girder: ReferenceGirder, offset: f64, datum: OffsetDatum) -> Self {
        self.reference_girder = girder;
        self.reference_offset = offset;
        self.offset_datum = datum;
        self
    }

    pub fn with_measurement(mut self, kind: MeasurementType, location: MeasurementLocation) -> Self {
        self.measurement_type = kind;
        self.measurement_location = location;
        self
    }

    /// Number of girders the rule lays out.
    pub fn girder_count(&self) -> usize {
        self.gaps.len() + 1
    }
}
