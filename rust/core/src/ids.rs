// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable identifiers for support lines and girder lines.
//!
//! Pier lines use the pier index directly. Temporary support lines live in
//! the negative range (`-(index + 1)`) so the two ID spaces never collide.
//!
//! Girder line IDs pack a [`SegmentKey`] into a `u32`:
//!
//! ```text
//!  31            16 15      8 7       0
//! +----------------+---------+---------+
//! |     group      | girder  | segment |
//! +----------------+---------+---------+
//! ```
//!
//! Every narrowing is checked; an index that exceeds its field is reported as
//! [`Error::IdEncodingOverflow`] instead of being truncated.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bits reserved for the girder group index.
pub const GROUP_BITS: u32 = 16;
/// Bits reserved for the girder index within a group.
pub const GIRDER_BITS: u32 = 8;
/// Bits reserved for the segment index within a girder.
pub const SEGMENT_BITS: u32 = 8;

/// Identifier of a pier line or temporary support line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SupportLineId(pub i32);

impl SupportLineId {
    /// Line ID for the pier at `pier_index`.
    pub fn pier(pier_index: usize) -> Result<Self> {
        i32::try_from(pier_index)
            .map(SupportLineId)
            .map_err(|_| Error::IdEncodingOverflow {
                field: "pier",
                index: pier_index,
                bits: 31,
            })
    }

    /// Line ID for the temporary support at `ts_index`.
    pub fn temporary_support(ts_index: usize) -> Result<Self> {
        i32::try_from(ts_index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .map(|i| SupportLineId(-i))
            .ok_or(Error::IdEncodingOverflow {
                field: "temporary support",
                index: ts_index,
                bits: 31,
            })
    }

    /// Returns `true` if this ID belongs to a temporary support line.
    pub fn is_temporary_support(&self) -> bool {
        self.0 < 0
    }

    /// Recovers the pier or temporary support index from the ID.
    pub fn index(&self) -> usize {
        if self.0 < 0 {
            (-(self.0 as i64) - 1) as usize
        } else {
            self.0 as usize
        }
    }
}

impl std::fmt::Display for SupportLineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_temporary_support() {
            write!(f, "TS{}", self.index())
        } else {
            write!(f, "P{}", self.index())
        }
    }
}

/// Identifier of a girder line, derived from its [`SegmentKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GirderLineId(pub u32);

/// Identifies one precast segment: `(group, girder, segment)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey {
    pub group: usize,
    pub girder: usize,
    pub segment: usize,
}

impl SegmentKey {
    pub fn new(group: usize, girder: usize, segment: usize) -> Self {
        Self {
            group,
            girder,
            segment,
        }
    }

    /// Packs the key into a girder line ID.
    pub fn girder_line_id(&self) -> Result<GirderLineId> {
        let group = narrow("group", self.group, GROUP_BITS)?;
        let girder = narrow("girder", self.girder, GIRDER_BITS)?;
        let segment = narrow("segment", self.segment, SEGMENT_BITS)?;
        Ok(GirderLineId(
            (group << (GIRDER_BITS + SEGMENT_BITS)) | (girder << SEGMENT_BITS) | segment,
        ))
    }
}

impl std::fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "group {} girder {} segment {}",
            self.group, self.girder, self.segment
        )
    }
}

impl GirderLineId {
    /// Unpacks the ID back into its segment key.
    pub fn segment_key(&self) -> SegmentKey {
        let segment_mask = (1u32 << SEGMENT_BITS) - 1;
        let girder_mask = (1u32 << GIRDER_BITS) - 1;
        SegmentKey {
            group: (self.0 >> (GIRDER_BITS + SEGMENT_BITS)) as usize,
            girder: ((self.0 >> SEGMENT_BITS) & girder_mask) as usize,
            segment: (self.0 & segment_mask) as usize,
        }
    }
}

fn narrow(field: &'static str, index: usize, bits: u32) -> Result<u32> {
    if (index as u64) < (1u64 << bits) {
        Ok(index as u32)
    } else {
        Err(Error::IdEncodingOverflow { field, index, bits })
    }
}
