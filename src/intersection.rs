// src/intersection.rs

use glam::Vec2;
use crate::geometry::{Point2, Segment2, EPSILON, PARALLEL_EPSILON};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
}

impl Ray {
    pub fn new(origin: Point2, direction: Vec2) -> Self {
        Self { origin: origin.into(), direction }
    }

    pub fn from_angle(origin: Point2, angle: f32) -> Self {
        Self::new(origin, Vec2::from_angle(angle))
    }

    pub fn point_at(&self, t: f32) -> Point2 {
        (self.origin + self.direction * t).into()
    }
}

pub struct RayIntersection;

impl RayIntersection {
    // Returns (t along the ray, u along the segment) for the supporting lines, or None if parallel.
    #[inline(always)]
    fn line_parameters(ray: &Ray, segment: &Segment2) -> Option<(f32, f32)> {
        let a: Vec2 = segment.a.into();
        let b: Vec2 = segment.b.into();
        let seg_dir = b - a;

        let denominator = ray.direction.perp_dot(seg_dir);
        if denominator.abs() < PARALLEL_EPSILON {
            return None;
        }

        let to_seg = a - ray.origin;
        let t = to_seg.perp_dot(seg_dir) / denominator;
        let u = to_seg.perp_dot(ray.direction) / denominator;
        Some((t, u))
    }

    /// Distance along `ray` to its crossing with `segment`, or `None` when the ray is parallel
    /// to it, points away from it, or passes beyond either end.
    ///
    /// The extent check is tolerant by `EPSILON` (in world units) at both ends so a ray aimed
    /// exactly at an endpoint still registers a hit despite rounding.
    pub fn ray_segment(ray: &Ray, segment: &Segment2) -> Option<f32> {
        let (t, u) = Self::line_parameters(ray, segment)?;
        let seg_len = segment.length().max(PARALLEL_EPSILON);
        let u_eps = EPSILON / seg_len;
        let t_eps = EPSILON / ray.direction.length().max(PARALLEL_EPSILON);

        if t < -t_eps || u < -u_eps || u > 1.0 + u_eps {
            return None;
        }
        Some(t.max(0.0))
    }

    /// Like `ray_segment` but against the segment's infinite supporting line, and allowing
    /// negative `t`. Used to order segments already known to span the ray's angle.
    pub fn ray_line(ray: &Ray, segment: &Segment2) -> Option<f32> {
        Self::line_parameters(ray, segment).map(|(t, _)| t)
    }

    /// Point where `ray` meets the line through `segment`. Falls back to the segment endpoint
    /// nearest the ray origin when the two are parallel.
    pub fn ray_line_point(ray: &Ray, segment: &Segment2) -> Point2 {
        match Self::ray_line(ray, segment) {
            Some(t) => ray.point_at(t),
            None => {
                let origin: Point2 = ray.origin.into();
                if origin.distance_squared(&segment.a) <= origin.distance_squared(&segment.b) {
                    segment.a
                } else {
                    segment.b
                }
            }
        }
    }
}

/// Clips segments against a convex polygon whose vertices run counter-clockwise.
pub struct ConvexClip;

impl ConvexClip {
    // Positive on the inner (left) side of the edge.
    #[inline(always)]
    fn side(point: &Point2, edge_start: &Point2, edge_end: &Point2) -> f32 {
        edge_end.sub(edge_start).cross(&point.sub(edge_start))
    }

    /// The part of `segment` inside `convex`, or `None` when less than `EPSILON` of it is left.
    pub fn clip_segment(segment: &Segment2, convex: &[Point2]) -> Option<Segment2> {
        let (mut a, mut b) = (segment.a, segment.b);
        for (i, edge_start) in convex.iter().enumerate() {
            let edge_end = &convex[(i + 1) % convex.len()];
            let side_a = Self::side(&a, edge_start, edge_end);
            let side_b = Self::side(&b, edge_start, edge_end);
            match (side_a >= 0.0, side_b >= 0.0) {
                (true, true) => {}
                (false, false) => return None,
                (a_inside, _) => {
                    let t = side_a / (side_a - side_b);
                    let crossing = Point2::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
                    if a_inside {
                        b = crossing;
                    } else {
                        a = crossing;
                    }
                }
            }
        }
        let clipped = Segment2::new(a, b);
        (!clipped.is_degenerate()).then_some(clipped)
    }
}
