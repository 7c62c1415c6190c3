// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for bridge description queries.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the bridge description layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An index does not fit in the bit field reserved for it in a line ID.
    #[error("{field} index {index} does not fit in the {bits}-bit field of a line identifier")]
    IdEncodingOverflow {
        field: &'static str,
        index: usize,
        bits: u32,
    },
}
