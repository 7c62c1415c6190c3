// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry model construction
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a bridge geometry build.
///
/// All of these are deterministic input-consistency failures except
/// [`Error::InvariantViolation`], which signals a programming error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid spacing configuration: {0}")]
    InvalidSpacingConfiguration(String),

    #[error("Invalid topology configuration: {0}")]
    InvalidTopologyConfiguration(String),

    #[error("Incompatible spacing counts: {0}")]
    IncompatibleSpacingCounts(String),

    #[error("Girder orientation with a bottom work point requires a constant-depth girder (group {group}, girder {girder})")]
    UnsupportedOrientationForVariableDepth { group: usize, girder: usize },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Core error: {0}")]
    CoreError(#[from] bridge_lite_core::Error),
}
