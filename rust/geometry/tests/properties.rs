// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property-based tests for spacing resolution and girder layout.
//!
//! Run with: cargo test -p bridge-lite-geometry --test properties

use bridge_lite_core::{
    BridgeDescription, GirderSection, MeasurementType, OffsetDatum, ReferenceGirder, SpacingRule,
    StraightAlignment, SupportOrientation, TopWidth,
};
use bridge_lite_geometry::spacing::{convert_width, resolve, Basis, SpacingContext};
use bridge_lite_geometry::{BridgeGeometryModelBuilder, BuilderConfig, LayoutStrategy};
use proptest::prelude::*;

/// Skews well inside (-90°, 90°).
fn arb_skew() -> impl Strategy<Value = f64> {
    -1.4..1.4f64
}

/// A girder-spacing rule centered on `offset`, with 2 to 10 girders.
fn arb_centered_rule() -> impl Strategy<Value = SpacingRule> {
    (prop::collection::vec(0.5..20.0f64, 1..10), -50.0..50.0f64).prop_map(|(gaps, offset)| {
        SpacingRule::from_gaps(gaps).with_reference(ReferenceGirder::Centered, offset, OffsetDatum::Alignment)
    })
}

proptest! {
    #[test]
    fn centering_round_trips(rule in arb_centered_rule(), skew in arb_skew()) {
        let ctx = SpacingContext::new(skew, 0.0, &[]);
        let r = resolve(&rule, &ctx, Basis::Native).unwrap();
        prop_assert!((r.leftmost_offset + r.girder_width / 2.0 - rule.reference_offset).abs() < 1e-9);

        // Along the support line everything scales by the same factor.
        let along = resolve(&rule, &ctx, Basis::AlongSupportLine).unwrap();
        let expected = rule.reference_offset / skew.cos();
        prop_assert!((along.leftmost_offset + along.girder_width / 2.0 - expected).abs() < 1e-6);
    }

    #[test]
    fn skew_conversion_round_trips(width in 0.0..200.0f64, skew in arb_skew()) {
        let along = convert_width(width, MeasurementType::NormalToAlignment, MeasurementType::AlongSupportLine, skew).unwrap();
        let back = convert_width(along, MeasurementType::AlongSupportLine, MeasurementType::NormalToAlignment, skew).unwrap();
        prop_assert!((back - width).abs() <= 1e-9 * width.max(1.0));
    }

    #[test]
    fn uniform_layout_matches_general(
        girders in 2usize..8,
        spacing in 4.0..12.0f64,
        skews in prop::array::uniform3(-0.8..0.8f64),
        span in 60.0..180.0f64,
    ) {
        let girder = GirderSection::prismatic("BT54", TopWidth::Symmetric(3.5), 4.5);
        let mut desc = BridgeDescription::continuous(
            &[0.0, span, 2.0 * span],
            girder,
            SpacingRule::uniform(girders, spacing),
        );
        for (pier, skew) in desc.piers.iter_mut().zip(skews) {
            pier.orientation = SupportOrientation::Skew(skew);
        }
        let alignment = StraightAlignment::east();

        let uniform = BridgeGeometryModelBuilder::new(BuilderConfig::default()).build(&desc, &alignment).unwrap();
        let general = BridgeGeometryModelBuilder::new(BuilderConfig::general_only()).build(&desc, &alignment).unwrap();
        prop_assert_eq!(uniform.strategy(), LayoutStrategy::Uniform);
        prop_assert_eq!(general.strategy(), LayoutStrategy::General);

        for (u, g) in uniform.girder_lines().iter().zip(general.girder_lines()) {
            prop_assert_eq!(u.id, g.id);
            prop_assert!((u.start_point() - g.start_point()).norm() < 1e-6);
            prop_assert!((u.end_point() - g.end_point()).norm() < 1e-6);
        }
    }
}
