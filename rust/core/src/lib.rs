// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Bridge-Lite Core
//!
//! Inputs for bridge geometry layout: the read-only [`BridgeDescription`]
//! snapshot (piers, temporary supports, girder groups and their spacing
//! rules), the [`Alignment`] query trait with two concrete alignments, plan
//! geometry helpers, and the stable line identifiers shared with downstream
//! geometry code.

pub mod alignment;
pub mod description;
pub mod error;
pub mod ids;
pub mod plan;
pub mod spacing;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use alignment::{
    skew_angle, support_direction, Alignment, PolylineAlignment, RoadwaySurface,
    StraightAlignment, SupportOrientation,
};
pub use description::{
    BearingOffsetMeasure, BridgeDescription, ConnectionSpec, EndDistanceMeasure, EndType,
    GirderGroup, GirderOrientation, GirderSection, HalfWidths, Pier, PierFace, PierFaceType,
    SegmentBoundary, SpacingTopology, TemporarySupport, TemporarySupportKind, TopWidth,
    WorkPointLocation,
};
pub use error::{Error, Result};
pub use ids::{GirderLineId, SegmentKey, SupportLineId};
pub use plan::Direction;
pub use spacing::{
    MeasurementLocation, MeasurementType, OffsetDatum, ReferenceGirder, SpacingRule,
    SpacingSemantics,
};
