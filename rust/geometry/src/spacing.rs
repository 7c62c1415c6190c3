// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spacing rule resolution.
//!
//! Turns one [`SpacingRule`] into the offset from the alignment to the
//! left-most girder and the overall width of the girder group, expressed
//! either along the support line or in the rule's own measurement direction.

use bridge_lite_core::{
    HalfWidths, MeasurementType, OffsetDatum, ReferenceGirder, SpacingRule, SpacingSemantics,
};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Skews whose cosine falls below this are treated as parallel to the alignment.
const MIN_COS_SKEW: f64 = 1e-9;

/// Widths below this are treated as zero.
const ZERO_WIDTH: f64 = 1e-12;

/// Basis the resolved offsets and widths are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Along the support centerline.
    AlongSupportLine,
    /// Along the rule's own measurement direction.
    Native,
}

/// Inputs a rule is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct SpacingContext<'a> {
    /// Angle between the support line and the alignment normal.
    pub skew: f64,
    /// Alignment to bridge line offset, normal to the alignment.
    pub alignment_offset: f64,
    /// Flange half widths of the girders, left to right. Only joint spacing
    /// reads them.
    pub half_widths: &'a [HalfWidths],
}

impl<'a> SpacingContext<'a> {
    pub fn new(skew: f64, alignment_offset: f64, half_widths: &'a [HalfWidths]) -> Self {
        Self {
            skew,
            alignment_offset,
            half_widths,
        }
    }
}

/// A rule resolved into alignment-relative offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSpacing {
    /// Offset from the alignment to the centerline of girder 0.
    pub leftmost_offset: f64,
    /// Centerline of girder 0 to centerline of the last girder.
    pub girder_width: f64,
    /// Width the support must carry; out-to-out for joint spacing.
    pub support_width: f64,
    /// Girder 0 centerline to the left end of the support width.
    pub left_overhang: f64,
}

impl ResolvedSpacing {
    /// Offset from the alignment to the left end of the support width.
    pub fn left_end_offset(&self) -> f64 {
        self.leftmost_offset - self.left_overhang
    }
}

/// Resolves a rule into the offset to girder 0 and the group widths.
pub fn resolve(rule: &SpacingRule, ctx: &SpacingContext<'_>, basis: Basis) -> Result<ResolvedSpacing> {
    let gaps = center_to_center_gaps(rule, ctx)?;
    let total: f64 = gaps.iter().sum();
    if rule.girder_count() > 1 && total <= ZERO_WIDTH {
        return Err(Error::InvalidSpacingConfiguration(format!(
            "{} girders resolve to a zero-width layout",
            rule.girder_count()
        )));
    }

    let mut leftmost = rule.reference_offset - reference_distance(rule.reference_girder, &gaps);

    if rule.offset_datum == OffsetDatum::BridgeLine {
        let mut bridge_line = ctx.alignment_offset;
        if rule.measurement_type == MeasurementType::AlongSupportLine {
            bridge_line /= checked_cos(ctx.skew)?;
        }
        leftmost += bridge_line;
    }

    let scale = basis_scale(rule, ctx, basis)?;
    let (left_overhang, right_overhang) = match rule.semantics {
        SpacingSemantics::GirderSpacing => (0.0, 0.0),
        SpacingSemantics::JointSpacing => {
            let n = ctx.half_widths.len();
            let projection = flange_projection(rule, ctx.skew)?;
            (
                ctx.half_widths[0].left * projection,
                ctx.half_widths[n - 1].right * projection,
            )
        }
    };

    Ok(ResolvedSpacing {
        leftmost_offset: leftmost * scale,
        girder_width: total * scale,
        support_width: (total + left_overhang + right_overhang) * scale,
        left_overhang: left_overhang * scale,
    })
}

/// Offset from the alignment to the left-most girder, along the support line.
pub fn resolve_leftmost_offset(rule: &SpacingRule, ctx: &SpacingContext<'_>) -> Result<f64> {
    resolve(rule, ctx, Basis::AlongSupportLine).map(|r| r.leftmost_offset)
}

/// Offsets from the alignment to every girder centerline, left to right.
pub fn girder_offsets(
    rule: &SpacingRule,
    ctx: &SpacingContext<'_>,
    basis: Basis,
) -> Result<SmallVec<[f64; 8]>> {
    let resolved = resolve(rule, ctx, basis)?;
    let scale = basis_scale(rule, ctx, basis)?;

    let mut offsets = SmallVec::with_capacity(rule.girder_count());
    let mut running = resolved.leftmost_offset;
    offsets.push(running);
    for gap in center_to_center_gaps(rule, ctx)? {
        running += gap * scale;
        offsets.push(running);
    }
    Ok(offsets)
}

/// Gap widths converted to centerline-to-centerline spacing, in the rule's
/// own units. Validates the rule along the way.
///
/// Flange widths are taken normal to the girders, which at a support are
/// assumed to run along the alignment tangent; joint spacing measured along
/// a skewed support therefore sees each flange stretched by `1 / cos(skew)`.
pub fn center_to_center_gaps(rule: &SpacingRule, ctx: &SpacingContext<'_>) -> Result<SmallVec<[f64; 8]>> {
    let half_widths = ctx.half_widths;
    validate(rule, half_widths)?;
    Ok(match rule.semantics {
        SpacingSemantics::GirderSpacing => rule.gaps.clone(),
        SpacingSemantics::JointSpacing => {
            let projection = flange_projection(rule, ctx.skew)?;
            rule.gaps
                .iter()
                .enumerate()
                .map(|(i, joint)| joint + (half_widths[i].right + half_widths[i + 1].left) * projection)
                .collect()
        }
    })
}

/// Distance from girder 0 to the reference position, given c-c gaps.
pub(crate) fn reference_distance(reference: ReferenceGirder, gaps: &[f64]) -> f64 {
    match reference {
        ReferenceGirder::Centered => gaps.iter().sum::<f64>() / 2.0,
        ReferenceGirder::Index(k) => gaps.iter().take(k).sum(),
    }
}

/// Factor taking a flange width, normal to the alignment, into the rule's
/// measurement direction.
fn flange_projection(rule: &SpacingRule, skew: f64) -> Result<f64> {
    match rule.measurement_type {
        MeasurementType::NormalToAlignment => Ok(1.0),
        MeasurementType::AlongSupportLine => Ok(1.0 / checked_cos(skew)?),
    }
}

fn basis_scale(rule: &SpacingRule, ctx: &SpacingContext<'_>, basis: Basis) -> Result<f64> {
    match (rule.measurement_type, basis) {
        (MeasurementType::NormalToAlignment, Basis::AlongSupportLine) => Ok(1.0 / checked_cos(ctx.skew)?),
        _ => Ok(1.0),
    }
}

/// Checks gap widths, the reference girder and, for joint spacing, that a
/// half width is available for every girder.
pub fn validate(rule: &SpacingRule, half_widths: &[HalfWidths]) -> Result<()> {
    if let Some(bad) = rule.gaps.iter().find(|g| !g.is_finite() || **g < 0.0) {
        return Err(Error::InvalidSpacingConfiguration(format!(
            "gap width {bad} is negative or not finite"
        )));
    }

    let n = rule.girder_count();
    if let ReferenceGirder::Index(k) = rule.reference_girder {
        if k >= n {
            return Err(Error::InvalidSpacingConfiguration(format!(
                "reference girder {k} is out of range for {n} girders"
            )));
        }
    }

    if rule.semantics == SpacingSemantics::JointSpacing && half_widths.len() != n {
        return Err(Error::InvalidSpacingConfiguration(format!(
            "joint spacing for {n} girders needs {n} girder widths, found {}",
            half_widths.len()
        )));
    }
    Ok(())
}

/// Converts a width between measurement bases at a support with the given skew.
pub fn convert_width(value: f64, from: MeasurementType, to: MeasurementType, skew: f64) -> Result<f64> {
    Ok(match (from, to) {
        (MeasurementType::NormalToAlignment, MeasurementType::AlongSupportLine) => value / checked_cos(skew)?,
        (MeasurementType::AlongSupportLine, MeasurementType::NormalToAlignment) => value * checked_cos(skew)?,
        _ => value,
    })
}

pub(crate) fn checked_cos(skew: f64) -> Result<f64> {
    let c = skew.cos();
    if c.abs() < MIN_COS_SKEW {
        return Err(Error::InvalidTopologyConfiguration(format!(
            "skew angle {:.6} rad leaves the support parallel to the alignment",
            skew
        )));
    }
    Ok(c)
}
