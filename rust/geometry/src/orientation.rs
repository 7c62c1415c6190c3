// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Girder rotation about the longitudinal axis.
//!
//! Orientation is a slope: rise of the left flange tip over the right one,
//! divided by the top flange width. A girder kept normal to a deck that rises
//! to the right therefore has a negative orientation, matching the negated
//! cross slope.

use bridge_lite_core::{
    Alignment, EndType, GirderOrientation, GirderSection, HalfWidths, Point2, WorkPointLocation,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Orientation of one girder and the plan shift of its layout line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GirderOrientationShift {
    pub orientation: f64,
    /// Plan offset from the top-of-girder line to the work point line,
    /// positive to the right.
    pub layout_line_shift: f64,
}

/// A girder from the first support it frames into to the last.
#[derive(Debug, Clone, Copy)]
pub struct GirderSpan<'a> {
    pub group: usize,
    pub girder: usize,
    pub section: &'a GirderSection,
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

pub struct OrientationResolver<'a> {
    alignment: &'a dyn Alignment,
    tolerance: f64,
}

impl<'a> OrientationResolver<'a> {
    pub fn new(alignment: &'a dyn Alignment, tolerance: f64) -> Self {
        Self { alignment, tolerance }
    }

    pub fn resolve(
        &self,
        policy: GirderOrientation,
        work_point: WorkPointLocation,
        span: &GirderSpan<'_>,
    ) -> Result<GirderOrientationShift> {
        if policy == GirderOrientation::Plumb {
            return Ok(GirderOrientationShift::default());
        }

        let start_hw = span.section.top_flange_half_widths(EndType::Start);
        let end_hw = span.section.top_flange_half_widths(EndType::End);

        let orientation = match policy {
            GirderOrientation::Plumb => 0.0,
            GirderOrientation::StartNormal => self.normal_at(&span.start, &start_hw),
            GirderOrientation::EndNormal => self.normal_at(&span.end, &end_hw),
            GirderOrientation::MidspanNormal => {
                let mid = nalgebra::center(&span.start, &span.end);
                self.normal_at(&mid, &HalfWidths::average(&start_hw, &end_hw))
            }
            GirderOrientation::Balanced => self.balanced(span, &start_hw, &end_hw),
        };

        let layout_line_shift = match work_point {
            WorkPointLocation::TopGirder => 0.0,
            WorkPointLocation::BottomGirder => {
                if span.section.is_variable_depth() {
                    return Err(Error::UnsupportedOrientationForVariableDepth {
                        group: span.group,
                        girder: span.girder,
                    });
                }
                orientation * span.section.height(EndType::Start)
            }
        };

        Ok(GirderOrientationShift {
            orientation,
            layout_line_shift,
        })
    }

    /// Orientation that keeps the flange normal to the deck at `point`.
    fn normal_at(&self, point: &Point2<f64>, hw: &HalfWidths) -> f64 {
        let (station, offset) = self.alignment.station_and_offset(point);
        if hw.total() <= self.tolerance {
            return -self.alignment.cross_slope(station, offset);
        }
        let z_left = self.alignment.elevation(station, offset - hw.left);
        let z_right = self.alignment.elevation(station, offset + hw.right);
        (z_left - z_right) / hw.total()
    }

    /// Balances the haunch at both ends: each flange tip follows the lower of
    /// its two end elevations, with the half widths averaged along the girder.
    fn balanced(&self, span: &GirderSpan<'_>, start_hw: &HalfWidths, end_hw: &HalfWidths) -> f64 {
        let hw = HalfWidths::average(start_hw, end_hw);
        if hw.total() <= self.tolerance {
            let mid = nalgebra::center(&span.start, &span.end);
            let (station, offset) = self.alignment.station_and_offset(&mid);
            return -self.alignment.cross_slope(station, offset);
        }

        let tips = |point: &Point2<f64>| {
            let (station, offset) = self.alignment.station_and_offset(point);
            (
                self.alignment.elevation(station, offset - hw.left),
                self.alignment.elevation(station, offset + hw.right),
            )
        };
        let (left_s, right_s) = tips(&span.start);
        let (left_e, right_e) = tips(&span.end);

        (left_s.min(left_e) - right_s.min(right_e)) / hw.total()
    }
}
