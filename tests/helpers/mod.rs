// Shared test utilities for the visibility tests.

#![allow(dead_code)]

use std::f32::consts::TAU;

use shadowcast2d::geometry::{segments_properly_intersect, Point2, Segment2};
use shadowcast2d::intersection::{Ray, RayIntersection};
use shadowcast2d::{OccluderRegistry, SweepConfig, VisibilityEngine, VisibilityPolygon};

/// Tolerance for comparing output vertices against hand-computed positions.
pub const VERTEX_TOLERANCE: f32 = 1e-2;

/// Tolerance for "does this edge cut through that occluder" checks.
pub const CROSSING_TOLERANCE: f32 = 1e-3;

/// The 100x100 map with a 10 unit margin: walls at x/y = 10 and 90.
pub fn boxed_registry() -> OccluderRegistry {
    let mut registry = OccluderRegistry::new();
    registry.load_boundary(100.0, 10.0).expect("boundary");
    registry
}

pub fn engine_with(occluders: &[(f32, f32, f32, f32)]) -> VisibilityEngine {
    let mut registry = boxed_registry();
    registry.register_occluders(occluders).expect("occluders");
    VisibilityEngine::new(registry, SweepConfig::default()).expect("engine")
}

pub fn assert_vertices_approx(actual: &[Point2], expected: &[Point2]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "vertex count differs: got {:?}, expected {:?}",
        actual,
        expected
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            a.approx_eq(e, VERTEX_TOLERANCE),
            "vertex {}: expected {:?}, got {:?} (polygon {:?})",
            i,
            e,
            a,
            actual
        );
    }
}

/// No polygon edge may cut through the interior of an occluder.
pub fn assert_no_edge_crosses_occluders(polygon: &VisibilityPolygon, registry: &OccluderRegistry) {
    for edge in polygon.edges() {
        for segment in registry.segments() {
            let occluder = segment.as_segment2();
            assert!(
                !segments_properly_intersect(&edge, &occluder, CROSSING_TOLERANCE),
                "edge {:?} crosses occluder {:?}",
                edge,
                occluder
            );
        }
    }
}

/// Vertices must go around the light in non-decreasing angle, wrapping exactly once.
pub fn assert_angularly_ordered(polygon: &VisibilityPolygon) {
    let origin = polygon.origin();
    let angles: Vec<f32> = polygon
        .vertices()
        .iter()
        .filter_map(|v| v.angle_from(&origin))
        .collect();
    let descents = angles
        .windows(2)
        .filter(|w| w[1] + 1e-3 < w[0])
        .count();
    assert!(descents <= 1, "vertices wrap {} times: {:?}", descents, angles);
}

// Rays closer than this to a blocker endpoint are skipped: there the hit jumps between the near
// and the far segment.
const RAY_CAST_ANGLE_MARGIN: f32 = 1e-3;

fn first_hit(ray: &Ray, segments: &[Segment2]) -> Option<f32> {
    segments
        .iter()
        .filter_map(|s| RayIntersection::ray_segment(ray, s))
        .min_by(|a, b| a.total_cmp(b))
}

fn angular_gap(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

/// Casts `rays` rays from the light and checks each leaves the polygon where it first meets one
/// of `blockers`.
pub fn assert_matches_ray_casts(polygon: &VisibilityPolygon, blockers: &[Segment2], rays: usize) {
    let origin = polygon.origin();
    let endpoint_angles: Vec<f32> = blockers
        .iter()
        .flat_map(|s| [s.a, s.b])
        .filter_map(|p| p.angle_from(&origin))
        .collect();
    let edges: Vec<Segment2> = polygon.edges().collect();

    for i in 0..rays {
        let angle = (i as f32 + 0.37) * TAU / rays as f32;
        if endpoint_angles.iter().any(|&a| angular_gap(a, angle) < RAY_CAST_ANGLE_MARGIN) {
            continue;
        }
        let ray = Ray::from_angle(origin, angle);
        let expected = first_hit(&ray, blockers).expect("blockers close off every direction");
        let actual = first_hit(&ray, &edges)
            .unwrap_or_else(|| panic!("ray at {} escapes the polygon {:?}", angle, polygon.vertices()));
        assert!(
            (actual - expected).abs() <= 1e-2 * expected.max(1.0),
            "ray at {}: polygon boundary at {}, nearest blocker at {} (polygon {:?})",
            angle,
            actual,
            expected,
            polygon.vertices()
        );
    }
}
