// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder configuration.

use serde::{Deserialize, Serialize};

/// Identifiers under which the alignment, profile and roadway surface are
/// registered with the host's geometry model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentBinding {
    pub alignment_id: u32,
    pub profile_id: u32,
    pub surface_id: u32,
}

impl Default for AlignmentBinding {
    fn default() -> Self {
        Self {
            alignment_id: 999,
            profile_id: 0,
            surface_id: 0,
        }
    }
}

/// Which girder layout strategies the builder may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrategyPreference {
    /// Use the uniform fast path when its preconditions hold.
    #[default]
    Auto,
    /// Always use the general strategy.
    GeneralOnly,
}

/// Configuration for [`BridgeGeometryModelBuilder`](crate::BridgeGeometryModelBuilder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub binding: AlignmentBinding,
    /// Geometric tolerance in model length units.
    pub tolerance: f64,
    pub strategy: StrategyPreference,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            binding: AlignmentBinding::default(),
            tolerance: 1e-6,
            strategy: StrategyPreference::Auto,
        }
    }
}

impl BuilderConfig {
    pub fn general_only() -> Self {
        Self {
            strategy: StrategyPreference::GeneralOnly,
            ..Self::default()
        }
    }
}
