// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use bridge_lite_core::{
    BearingOffsetMeasure, BridgeDescription, ConnectionSpec, GirderOrientation, GirderSection,
    MeasurementLocation, MeasurementType, OffsetDatum, PierFace, Point2, ReferenceGirder,
    RoadwaySurface, SegmentBoundary, SegmentKey, SpacingRule, SpacingSemantics, StraightAlignment,
    SupportLineId, SupportOrientation, TemporarySupport, TemporarySupportKind, TopWidth,
    WorkPointLocation,
};
use bridge_lite_geometry::spacing::convert_width;
use bridge_lite_geometry::{
    build_bridge_geometry_model, BridgeGeometryModel, BridgeGeometryModelBuilder, BuilderConfig,
    Error, LayoutStrategy,
};
use std::f64::consts::FRAC_PI_6;

const TOL: f64 = 1e-6;

fn wf_girder() -> GirderSection {
    GirderSection::prismatic("WF42G", TopWidth::Symmetric(4.0), 3.5)
}

fn two_span(rule: SpacingRule) -> BridgeDescription {
    BridgeDescription::continuous(&[0.0, 100.0, 200.0], wf_girder(), rule)
}

fn assert_same_geometry(a: &BridgeGeometryModel, b: &BridgeGeometryModel) {
    assert_eq!(a.girder_lines().len(), b.girder_lines().len());
    for (x, y) in a.girder_lines().iter().zip(b.girder_lines()) {
        assert_eq!(x.id, y.id);
        assert_relative_eq!(x.start_point().x, y.start_point().x, epsilon = TOL);
        assert_relative_eq!(x.start_point().y, y.start_point().y, epsilon = TOL);
        assert_relative_eq!(x.end_point().x, y.end_point().x, epsilon = TOL);
        assert_relative_eq!(x.end_point().y, y.end_point().y, epsilon = TOL);
    }
}

fn uniform_and_general(desc: &BridgeDescription, alignment: &StraightAlignment) {
    let uniform = build_bridge_geometry_model(desc, alignment).unwrap();
    let general = BridgeGeometryModelBuilder::new(BuilderConfig::general_only())
        .build(desc, alignment)
        .unwrap();
    assert_eq!(uniform.strategy(), LayoutStrategy::Uniform);
    assert_eq!(general.strategy(), LayoutStrategy::General);
    assert_same_geometry(&uniform, &general);
}

#[test]
fn scenario_a_two_span_normal_bridge() {
    let desc = two_span(SpacingRule::uniform(4, 8.0));
    let alignment = StraightAlignment::east();
    let model = build_bridge_geometry_model(&desc, &alignment).unwrap();

    let g0 = model.girder_lines()[0].clone();
    let g3 = model.girder_lines()[3].clone();
    for line in [&g0, &g3] {
        assert_eq!(line.path.len(), 2);
        assert_eq!(line.start_support, SupportLineId(0));
        assert_eq!(line.end_support, SupportLineId(2));
        assert_relative_eq!(line.length(), 200.0, epsilon = TOL);
    }
    // Offsets are positive right; an eastbound alignment has its right side south.
    let (_, offset0) = bridge_lite_core::Alignment::station_and_offset(&alignment, &g0.start_point());
    let (_, offset3) = bridge_lite_core::Alignment::station_and_offset(&alignment, &g3.end_point());
    assert_relative_eq!(offset0, -12.0, epsilon = TOL);
    assert_relative_eq!(offset3, 12.0, epsilon = TOL);

    let pier1 = model.find_support_line(SupportLineId(1)).unwrap();
    assert_relative_eq!(pier1.length, 24.0, epsilon = TOL);
}

#[test]
fn scenario_b_joint_spacing_width() {
    let rule = SpacingRule::uniform(4, 2.0 / 12.0).with_semantics(SpacingSemantics::JointSpacing);
    let model = build_bridge_geometry_model(&two_span(rule), &StraightAlignment::east()).unwrap();

    let pier1 = model.find_support_line(SupportLineId(1)).unwrap();
    assert_relative_eq!(pier1.length, 16.5, epsilon = TOL);

    let lines = model.girder_lines();
    let spacing = lines[0].start_point().y - lines[1].start_point().y;
    assert_relative_eq!(spacing, 4.0 + 2.0 / 12.0, epsilon = TOL);
}

#[test]
fn scenario_c_along_support_spacing_on_a_skewed_pier() {
    let rule = SpacingRule::uniform(3, 8.0)
        .with_measurement(MeasurementType::AlongSupportLine, MeasurementLocation::AtSupportLine);
    let mut desc = BridgeDescription::continuous(&[0.0, 100.0], wf_girder(), rule);
    for pier in &mut desc.piers {
        pier.orientation = SupportOrientation::Skew(FRAC_PI_6);
    }
    let model = build_bridge_geometry_model(&desc, &StraightAlignment::east()).unwrap();

    let pier0 = model.find_support_line(SupportLineId(0)).unwrap();
    assert_relative_eq!(pier0.skew, FRAC_PI_6, epsilon = 1e-12);
    assert_relative_eq!(pier0.length, 16.0, epsilon = TOL);

    let normal = convert_width(
        8.0,
        MeasurementType::AlongSupportLine,
        MeasurementType::NormalToAlignment,
        pier0.skew,
    )
    .unwrap();
    assert_relative_eq!(normal, 6.928_203_230_275_509, epsilon = 1e-9);

    let lines = model.girder_lines();
    let normal_spacing = lines[0].start_point().y - lines[1].start_point().y;
    assert_relative_eq!(normal_spacing, normal, epsilon = TOL);
}

#[test]
fn scenario_d_balanced_girder_over_a_symmetric_crown() {
    let mut desc = two_span(SpacingRule::uniform(3, 8.0));
    desc.girder_orientation = GirderOrientation::Balanced;
    let alignment = StraightAlignment::east().with_surface(RoadwaySurface::crowned(100.0, 0.0, 0.02));
    let model = build_bridge_geometry_model(&desc, &alignment).unwrap();

    let center = model.girder_orientation(&SegmentKey::new(0, 1, 0)).unwrap();
    assert_relative_eq!(center.orientation, 0.0, epsilon = 1e-12);
    assert_relative_eq!(center.layout_line_shift, 0.0);

    let left = model.girder_orientation(&SegmentKey::new(0, 0, 0)).unwrap();
    let right = model.girder_orientation(&SegmentKey::new(0, 2, 0)).unwrap();
    assert_relative_eq!(left.orientation, -0.02, epsilon = 1e-12);
    assert_relative_eq!(right.orientation, 0.02, epsilon = 1e-12);

    desc.girder_orientation = GirderOrientation::Plumb;
    let plumb = build_bridge_geometry_model(&desc, &alignment).unwrap();
    assert_relative_eq!(
        plumb.girder_orientation(&SegmentKey::new(0, 1, 0)).unwrap().orientation,
        center.orientation,
        epsilon = 1e-12
    );
}

#[test]
fn scenario_e_continuous_segment_temporary_support() {
    let mut desc = BridgeDescription::continuous(&[0.0, 100.0, 200.0], wf_girder(), SpacingRule::uniform(2, 10.0));
    desc.piers[2].back = Some(PierFace::new(SpacingRule::uniform(2, 14.0)));
    desc.temporary_supports.push(TemporarySupport {
        station: 150.0,
        orientation: SupportOrientation::Normal,
        kind: TemporarySupportKind::ContinuousSegment,
        connection: ConnectionSpec::default(),
    });

    let model = build_bridge_geometry_model(&desc, &StraightAlignment::east()).unwrap();
    assert_eq!(model.temporary_support_lines().count(), 1);
    let ts = model.find_support_line(SupportLineId::temporary_support(0).unwrap()).unwrap();
    assert_relative_eq!(ts.length, 12.0, epsilon = TOL);
    assert_relative_eq!(ts.offset, -6.0, epsilon = TOL);
    assert_eq!(model.strategy(), LayoutStrategy::General);
}

#[test]
fn skewed_joint_spacing_keeps_girders_on_their_support() {
    let rule = SpacingRule::uniform(4, 2.0 / 12.0)
        .with_semantics(SpacingSemantics::JointSpacing)
        .with_measurement(MeasurementType::AlongSupportLine, MeasurementLocation::AtSupportLine);
    let mut desc = BridgeDescription::continuous(&[0.0, 100.0], wf_girder(), rule);
    for pier in &mut desc.piers {
        pier.orientation = SupportOrientation::Skew(FRAC_PI_6);
    }
    let model = build_bridge_geometry_model(&desc, &StraightAlignment::east()).unwrap();

    let pier0 = model.find_support_line(SupportLineId(0)).unwrap();
    let dir = pier0.direction.vector();
    let along = |p: Point2<f64>| (p - pier0.alignment_point).dot(&dir);

    let lines = model.girder_lines();
    let first = along(lines[0].start_point());
    let last = along(lines[3].start_point());
    assert_relative_eq!((first + last) / 2.0, 0.0, epsilon = TOL);

    // A 2 ft half flange crosses the 30 degree support over 2 / cos(30) ft.
    let flange = 2.0 / FRAC_PI_6.cos();
    assert!(first - flange >= along(pier0.left_end()) - TOL);
    assert!(last + flange <= along(pier0.right_end()) + TOL);
    assert_relative_eq!(last + flange, along(pier0.right_end()), epsilon = TOL);
}

#[test]
fn continuous_segment_support_next_to_a_closure_joint_carries_the_girders() {
    let mut desc = BridgeDescription::continuous(&[0.0, 200.0], wf_girder(), SpacingRule::uniform(2, 10.0));
    desc.temporary_supports.push(TemporarySupport {
        station: 100.0,
        orientation: SupportOrientation::Normal,
        kind: TemporarySupportKind::ClosureJoint {
            spacing: SpacingRule::uniform(2, 20.0),
        },
        connection: ConnectionSpec::default(),
    });
    desc.temporary_supports.push(TemporarySupport {
        station: 150.0,
        orientation: SupportOrientation::Normal,
        kind: TemporarySupportKind::ContinuousSegment,
        connection: ConnectionSpec::default(),
    });
    desc.groups[0].interior_boundaries = vec![SegmentBoundary::TemporarySupport(0)];

    let model = build_bridge_geometry_model(&desc, &StraightAlignment::east()).unwrap();
    let ts = model.find_support_line(SupportLineId::temporary_support(1).unwrap()).unwrap();
    assert_relative_eq!(ts.length, 15.0, epsilon = TOL);

    let ahead = model
        .girder_lines()
        .iter()
        .find(|l| l.key == SegmentKey::new(0, 0, 1))
        .unwrap();
    let mid = nalgebra::center(&ahead.start_point(), &ahead.end_point());
    let edge = ts.left_end();
    assert_relative_eq!(mid.x, edge.x, epsilon = TOL);
    assert_relative_eq!(mid.y, edge.y, epsilon = TOL);
}

#[test]
fn build_is_idempotent() {
    let mut desc = two_span(SpacingRule::uniform(5, 7.0));
    desc.piers[1].orientation = SupportOrientation::Skew(-0.3);
    desc.girder_orientation = GirderOrientation::MidspanNormal;
    let alignment = StraightAlignment::east().with_surface(RoadwaySurface::superelevated(10.0, 0.03));

    let a = build_bridge_geometry_model(&desc, &alignment).unwrap();
    let b = build_bridge_geometry_model(&desc, &alignment).unwrap();

    assert_eq!(a.support_lines(), b.support_lines());
    assert_eq!(a.girder_lines(), b.girder_lines());
    assert_eq!(a.orientation_shifts(), b.orientation_shifts());
}

#[test]
fn uniform_matches_general_on_normal_piers() {
    uniform_and_general(&two_span(SpacingRule::uniform(4, 8.0)), &StraightAlignment::east());
}

#[test]
fn uniform_matches_general_on_skewed_piers() {
    let mut desc = two_span(SpacingRule::uniform(6, 6.5));
    desc.piers[0].orientation = SupportOrientation::Skew(0.4);
    desc.piers[1].orientation = SupportOrientation::Skew(-0.2);
    desc.piers[2].orientation = SupportOrientation::Bearing(-1.2);
    let alignment = StraightAlignment::new(
        bridge_lite_core::Point2::new(500.0, 200.0),
        bridge_lite_core::Direction::new(0.7),
        1000.0,
    );
    for pier in desc.piers.iter_mut() {
        pier.station += 1000.0;
    }
    uniform_and_general(&desc, &alignment);
}

#[test]
fn uniform_matches_general_measured_at_bearing_lines() {
    let rule = SpacingRule::uniform(4, 9.0)
        .with_measurement(MeasurementType::NormalToAlignment, MeasurementLocation::AtBearingLine)
        .with_reference(ReferenceGirder::Index(1), 2.0, OffsetDatum::BridgeLine);
    let mut desc = two_span(rule);
    desc.alignment_offset = -3.0;
    for pier in desc.piers.iter_mut() {
        pier.orientation = SupportOrientation::Skew(0.35);
        for face in [pier.back.as_mut(), pier.ahead.as_mut()].into_iter().flatten() {
            face.connection = ConnectionSpec {
                bearing_offset: 0.75,
                bearing_offset_measure: BearingOffsetMeasure::NormalToPier,
                ..ConnectionSpec::default()
            };
        }
    }
    uniform_and_general(&desc, &StraightAlignment::east());
}

#[test]
fn isolated_pier_is_a_topology_error() {
    let desc = BridgeDescription::continuous(&[0.0], wf_girder(), SpacingRule::uniform(4, 8.0));
    assert!(matches!(
        build_bridge_geometry_model(&desc, &StraightAlignment::east()),
        Err(Error::InvalidTopologyConfiguration(_))
    ));
}

#[test]
fn reference_girder_out_of_range_is_a_spacing_error() {
    let rule = SpacingRule::uniform(4, 8.0).with_reference(ReferenceGirder::Index(4), 0.0, OffsetDatum::Alignment);
    assert!(matches!(
        build_bridge_geometry_model(&two_span(rule), &StraightAlignment::east()),
        Err(Error::InvalidSpacingConfiguration(_))
    ));
}

#[test]
fn zero_width_layout_is_a_spacing_error() {
    assert!(matches!(
        build_bridge_geometry_model(&two_span(SpacingRule::uniform(3, 0.0)), &StraightAlignment::east()),
        Err(Error::InvalidSpacingConfiguration(_))
    ));
}

#[test]
fn bottom_work_point_on_a_variable_depth_girder_is_rejected() {
    let girder = wf_girder().with_end_height(5.0);
    let mut desc = BridgeDescription::continuous(&[0.0, 100.0], girder, SpacingRule::uniform(3, 8.0));
    desc.girder_orientation = GirderOrientation::EndNormal;
    desc.work_point = WorkPointLocation::BottomGirder;
    assert_eq!(
        build_bridge_geometry_model(&desc, &StraightAlignment::east()).unwrap_err(),
        Error::UnsupportedOrientationForVariableDepth { group: 0, girder: 0 }
    );
}

#[test]
fn girder_index_beyond_the_id_encoding_is_reported() {
    let desc = BridgeDescription::continuous(&[0.0, 100.0], wf_girder(), SpacingRule::uniform(300, 1.0));
    assert!(matches!(
        build_bridge_geometry_model(&desc, &StraightAlignment::east()),
        Err(Error::CoreError(bridge_lite_core::Error::IdEncodingOverflow { .. }))
    ));
}

#[test]
fn config_round_trips_with_defaults() {
    let config = BuilderConfig::default();
    assert_eq!(config.binding.alignment_id, 999);
    assert_eq!(config.binding.profile_id, 0);
    assert_eq!(config.binding.surface_id, 0);
    assert_relative_eq!(config.tolerance, 1e-6);
}
