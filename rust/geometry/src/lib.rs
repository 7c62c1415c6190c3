// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Bridge-Lite Geometry
//!
//! Turns a declarative [`BridgeDescription`](bridge_lite_core::BridgeDescription)
//! into plan construction geometry: one support line per pier and temporary
//! support, and one girder line per precast segment, addressable by stable
//! integer IDs.
//!
//! ```ignore
//! use bridge_lite_core::{BridgeDescription, GirderSection, SpacingRule, StraightAlignment, TopWidth};
//! use bridge_lite_geometry::build_bridge_geometry_model;
//!
//! let girder = GirderSection::prismatic("WF42G", TopWidth::Symmetric(4.0), 3.5);
//! let bridge = BridgeDescription::continuous(&[0.0, 100.0, 200.0], girder, SpacingRule::uniform(4, 8.0));
//! let model = build_bridge_geometry_model(&bridge, &StraightAlignment::east())?;
//! for line in model.girder_lines() {
//!     println!("{} {:.3}", line.key, line.length());
//! }
//! ```

pub mod config;
pub mod error;
pub mod girder;
pub mod model;
pub mod orientation;
pub mod segment;
pub mod spacing;
pub mod support;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use config::{AlignmentBinding, BuilderConfig, StrategyPreference};
pub use error::{Error, Result};
pub use girder::{GirderLayout, GirderLine, GirderLineLayoutEngine, LayoutStrategy, SegmentLayoutStrategy, UniformLayout};
pub use model::{build_bridge_geometry_model, BridgeGeometryModel, BridgeGeometryModelBuilder};
pub use orientation::{GirderOrientationShift, GirderSpan, OrientationResolver};
pub use segment::{MeasurementConvention, SegmentEnd, SegmentLayout, SegmentSpacingResolver};
pub use spacing::{resolve_leftmost_offset, Basis, ResolvedSpacing, SpacingContext};
pub use support::{
    ConnectionMeasure, EndDistanceLocation, FaceConnection, SupportKind, SupportLine,
    SupportLineLayoutEngine, SupportLineSet,
};
