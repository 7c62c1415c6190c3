// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge geometry model and its builder.
//!
//! The builder runs support line layout over every pier, then every
//! temporary support, then lays out the girder lines. Any failure aborts the
//! build; a model is only returned complete.

use bridge_lite_core::{
    Alignment, BridgeDescription, GirderLineId, SegmentBoundary, SegmentKey, SupportLineId,
};
use rustc_hash::FxHashMap;

use crate::config::{AlignmentBinding, BuilderConfig};
use crate::error::{Error, Result};
use crate::girder::{GirderLine, GirderLineLayoutEngine, LayoutStrategy};
use crate::orientation::GirderOrientationShift;
use crate::support::{SupportKind, SupportLine, SupportLineLayoutEngine, SupportLineSet};

/// Support and girder lines of one bridge, addressable by ID.
#[derive(Debug, Clone)]
pub struct BridgeGeometryModel {
    binding: AlignmentBinding,
    supports: SupportLineSet,
    girder_lines: Vec<GirderLine>,
    girder_index: FxHashMap<GirderLineId, usize>,
    orientation: FxHashMap<SegmentKey, GirderOrientationShift>,
    strategy: LayoutStrategy,
}

impl BridgeGeometryModel {
    pub fn find_support_line(&self, id: SupportLineId) -> Option<&SupportLine> {
        self.supports.get(id)
    }

    pub fn find_girder_line(&self, id: GirderLineId) -> Option<&GirderLine> {
        self.girder_index.get(&id).map(|&i| &self.girder_lines[i])
    }

    pub fn girder_orientation(&self, key: &SegmentKey) -> Option<&GirderOrientationShift> {
        self.orientation.get(key)
    }

    pub fn orientation_shifts(&self) -> &FxHashMap<SegmentKey, GirderOrientationShift> {
        &self.orientation
    }

    /// Pier lines followed by temporary support lines.
    pub fn support_lines(&self) -> &[SupportLine] {
        self.supports.as_slice()
    }

    pub fn pier_lines(&self) -> impl Iterator<Item = &SupportLine> {
        self.supports
            .iter()
            .filter(|l| matches!(l.kind, SupportKind::Pier(_)))
    }

    pub fn temporary_support_lines(&self) -> impl Iterator<Item = &SupportLine> {
        self.supports
            .iter()
            .filter(|l| matches!(l.kind, SupportKind::TemporarySupport(_)))
    }

    /// Girder lines ordered by group, girder, then segment.
    pub fn girder_lines(&self) -> &[GirderLine] {
        &self.girder_lines
    }

    pub fn strategy(&self) -> LayoutStrategy {
        self.strategy
    }

    pub fn binding(&self) -> &AlignmentBinding {
        &self.binding
    }
}

/// Builds [`BridgeGeometryModel`]s from bridge descriptions.
#[derive(Debug, Clone, Default)]
pub struct BridgeGeometryModelBuilder {
    config: BuilderConfig,
}

impl BridgeGeometryModelBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn build(&self, desc: &BridgeDescription, alignment: &dyn Alignment) -> Result<BridgeGeometryModel> {
        validate_topology(desc)?;

        let support_engine = SupportLineLayoutEngine::new(desc, alignment);
        let mut supports = SupportLineSet::new();
        for line in support_engine.layout_piers()? {
            supports.insert(line)?;
        }
        for line in support_engine.layout_temporary_supports()? {
            supports.insert(line)?;
        }
        tracing::info!(
            piers = desc.piers.len(),
            temporary_supports = desc.temporary_supports.len(),
            "Laid out support lines"
        );

        let layout = GirderLineLayoutEngine::new(desc, alignment, &supports, &self.config).layout()?;

        let mut girder_index = FxHashMap::default();
        for (i, line) in layout.lines.iter().enumerate() {
            if girder_index.insert(line.id, i).is_some() {
                return Err(Error::InvariantViolation(format!(
                    "girder line {} created twice",
                    line.key
                )));
            }
        }
        let orientation: FxHashMap<_, _> = layout.orientation.into_iter().collect();

        tracing::info!(
            groups = desc.groups.len(),
            girder_lines = layout.lines.len(),
            strategy = ?layout.strategy,
            "Laid out girder lines"
        );

        Ok(BridgeGeometryModel {
            binding: self.config.binding,
            supports,
            girder_lines: layout.lines,
            girder_index,
            orientation,
            strategy: layout.strategy,
        })
    }
}

/// Builds a model with the default configuration.
pub fn build_bridge_geometry_model(
    desc: &BridgeDescription,
    alignment: &dyn Alignment,
) -> Result<BridgeGeometryModel> {
    BridgeGeometryModelBuilder::default().build(desc, alignment)
}

/// Structural checks on the description that the layout engines rely on.
fn validate_topology(desc: &BridgeDescription) -> Result<()> {
    if desc.piers.len() < 2 {
        return Err(Error::InvalidTopologyConfiguration(format!(
            "a bridge needs at least two piers, found {}",
            desc.piers.len()
        )));
    }
    if let Some(i) = desc
        .piers
        .windows(2)
        .position(|w| !(w[0].station < w[1].station))
    {
        return Err(Error::InvalidTopologyConfiguration(format!(
            "pier {} is not ahead of pier {i}",
            i + 1
        )));
    }

    for (g, group) in desc.groups.iter().enumerate() {
        if group.start_pier >= group.end_pier || group.end_pier >= desc.piers.len() {
            return Err(Error::InvalidTopologyConfiguration(format!(
                "group {g} runs from pier {} to pier {} of {}",
                group.start_pier,
                group.end_pier,
                desc.piers.len()
            )));
        }
        if group.girders.is_empty() {
            return Err(Error::InvalidTopologyConfiguration(format!("group {g} has no girders")));
        }

        let start = desc.piers[group.start_pier].station;
        let end = desc.piers[group.end_pier].station;
        let mut last = start;
        for boundary in &group.interior_boundaries {
            let station = match *boundary {
                SegmentBoundary::Pier(p) => desc.piers.get(p).map(|pier| pier.station),
                SegmentBoundary::TemporarySupport(t) => desc.temporary_supports.get(t).map(|ts| ts.station),
            }
            .ok_or_else(|| {
                Error::InvalidTopologyConfiguration(format!("group {g} names a missing boundary {boundary:?}"))
            })?;
            if !(last < station && station < end) {
                return Err(Error::InvalidTopologyConfiguration(format!(
                    "group {g} boundary {boundary:?} at station {station} is out of order"
                )));
            }
            last = station;
        }
    }
    Ok(())
}
