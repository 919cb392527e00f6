// src/geometry.rs

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::f32::consts::TAU;

/// Tolerance for point coincidence and segment-parameter checks.
pub const EPSILON: f32 = 1e-4;
/// Two sweep events closer than this (radians) share one angle group.
pub const ANGLE_EPSILON: f32 = 1e-5;
/// Below this the ray and the segment are treated as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-9;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn sub(&self, other: &Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }

    pub fn add(&self, other: &Point2) -> Point2 {
        Point2::new(self.x + other.x, self.y + other.y)
    }

    pub fn dot(&self, other: &Point2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    // z component of the 3D cross product; positive when `other` is counter-clockwise of `self`
    pub fn cross(&self, other: &Point2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance_squared(&self, other: &Point2) -> f32 {
        let d = self.sub(other);
        d.dot(&d)
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(&self, other: &Point2, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    /// Polar angle of `self` around `origin`, normalized to `[0, 2π)`.
    ///
    /// Returns `None` when the two points coincide, since the angle is undefined there.
    pub fn angle_from(&self, origin: &Point2) -> Option<f32> {
        let d = self.sub(origin);
        if d.x.abs() <= EPSILON && d.y.abs() <= EPSILON {
            return None;
        }
        Some(normalize_angle(d.y.atan2(d.x)))
    }
}

impl From<Vec2> for Point2 {
    fn from(v: Vec2) -> Self {
        Point2::new(v.x, v.y)
    }
}

impl From<Point2> for Vec2 {
    fn from(p: Point2) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Point2::new(x, y)
    }
}

/// Maps any finite angle into `[0, 2π)`. Values within `ANGLE_EPSILON` below 2π snap to 0
/// so an event sitting on the positive x axis is never split across the wrap.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle.rem_euclid(TAU);
    // also folds -0.0 into 0.0 so event ordering never sees two zeros
    if a >= TAU - ANGLE_EPSILON || a == 0.0 {
        a = 0.0;
    }
    a
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment2 {
    pub a: Point2,
    pub b: Point2,
}

impl Segment2 {
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f32 {
        self.a.distance(&self.b)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < EPSILON
    }

    /// Distance from `p` to the closest point of the segment.
    pub fn distance_to_point(&self, p: &Point2) -> f32 {
        let ab = self.b.sub(&self.a);
        let len_sq = ab.dot(&ab);
        if len_sq <= PARALLEL_EPSILON {
            return self.a.distance(p);
        }
        let t = (p.sub(&self.a).dot(&ab) / len_sq).clamp(0.0, 1.0);
        let closest = Point2::new(self.a.x + t * ab.x, self.a.y + t * ab.y);
        closest.distance(p)
    }
}

/// Signed shoelace area; positive for counter-clockwise winding in a y-up frame.
pub fn polygon_area(vertices: &[Point2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        area += vertices[i].x * vertices[j].y;
        area -= vertices[j].x * vertices[i].y;
    }
    area / 2.0
}

/// True when the two segments cross at a single point strictly inside both of them.
/// Each segment's endpoints must lie more than `eps` on opposite sides of the other's line, so
/// touching at an endpoint, T-junctions and (near-)collinear overlap do not count.
pub fn segments_properly_intersect(s1: &Segment2, s2: &Segment2, eps: f32) -> bool {
    fn side(seg: &Segment2, p: &Point2) -> f32 {
        let dir = seg.b.sub(&seg.a);
        let len = dir.length();
        if len <= PARALLEL_EPSILON {
            return 0.0;
        }
        dir.cross(&p.sub(&seg.a)) / len
    }
    fn straddles(line: &Segment2, other: &Segment2, eps: f32) -> bool {
        let da = side(line, &other.a);
        let db = side(line, &other.b);
        (da > eps && db < -eps) || (da < -eps && db > eps)
    }
    straddles(s1, s2, eps) && straddles(s2, s1, eps)
}
