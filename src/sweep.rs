// src/sweep.rs
//
// Radial sweep producing the visibility polygon of a point light.
//
// Every occluder is split into a Begin and an End event at the polar angles of its endpoints,
// oriented so the sweep (increasing angle) enters the segment at Begin. Events are visited in
// angle order while an active set holds the segments the current ray crosses, nearest first.
// Whenever the nearest segment changes at an angle, the ray's hit on the old nearest and on
// the new nearest are both emitted, giving the short shadow edge between them.

use std::cmp::Ordering;
use std::f32::consts::{PI, TAU};

use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::config::SweepConfig;
use crate::error::{VisibilityError, VisibilityResult};
use crate::geometry::{Point2, Segment2, ANGLE_EPSILON, EPSILON};
use crate::intersection::{ConvexClip, Ray, RayIntersection};
use crate::light::Light;
use crate::occluders::{OccluderRegistry, SegmentId};
use crate::polygon::{dedup_ring, VisibilityPolygon};

/// Output vertices closer than this are merged.
pub const VERTEX_MERGE_EPSILON: f32 = EPSILON * 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentSource {
    Occluder(SegmentId),
    /// Edge of the max-radius cap that closes off directions with no occluder.
    Cap,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepSegment {
    pub segment: Segment2,
    pub source: SegmentSource,
}

/// Begin sorts before End so a segment is always inserted before anything at the same angle
/// can compare against it or remove it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Begin,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepEvent {
    pub angle: f32,
    pub kind: EventKind,
    /// Index into the sweep's segment list.
    pub segment: usize,
    pub point: Point2,
}

/// Sweep order: ascending angle, then Begin before End.
pub fn compare_events(a: &SweepEvent, b: &SweepEvent) -> Ordering {
    a.angle.total_cmp(&b.angle).then(a.kind.cmp(&b.kind))
}

fn ray_distance(ray: &Ray, segment: &Segment2) -> f32 {
    RayIntersection::ray_line(ray, segment).unwrap_or(f32::INFINITY)
}

/// Counter-clockwise vertices of a regular polygon circumscribing the circle of `radius`
/// around `origin`.
pub fn cap_vertices(origin: Point2, radius: f32, sides: usize) -> Vec<Point2> {
    let sides = sides.max(3);
    let step = TAU / sides as f32;
    let vertex_radius = radius / (PI / sides as f32).cos();
    let center: glam::Vec2 = origin.into();
    (0..sides)
        .map(|i| (center + glam::Vec2::from_angle((i as f32 + 0.5) * step) * vertex_radius).into())
        .collect()
}

/// Edges of the polygon from `cap_vertices`.
pub fn cap_segments(origin: Point2, radius: f32, sides: usize) -> Vec<SweepSegment> {
    let vertices = cap_vertices(origin, radius, sides);
    (0..vertices.len())
        .map(|i| SweepSegment {
            segment: Segment2::new(vertices[i], vertices[(i + 1) % vertices.len()]),
            source: SegmentSource::Cap,
        })
        .collect()
}

/// Builds the sorted event list for `origin`.
///
/// Segments the light sees edge-on (zero angular width) cannot hide anything and produce no
/// events. The second value counts occluders skipped because the light sits on them.
pub fn build_events(origin: Point2, segments: &[SweepSegment]) -> (Vec<SweepEvent>, usize) {
    let mut events = Vec::with_capacity(segments.len() * 2);
    let mut touching = 0;

    for (index, s) in segments.iter().enumerate() {
        let seg = s.segment;
        if seg.distance_to_point(&origin) <= EPSILON {
            if matches!(s.source, SegmentSource::Occluder(_)) {
                touching += 1;
            }
            continue;
        }
        let (Some(angle_a), Some(angle_b)) = (seg.a.angle_from(&origin), seg.b.angle_from(&origin)) else {
            continue;
        };

        let ra = seg.a.sub(&origin);
        let rb = seg.b.sub(&origin);
        let cross = ra.cross(&rb);
        let width = cross.atan2(ra.dot(&rb)).abs();
        if width <= ANGLE_EPSILON {
            continue;
        }

        let (begin, begin_angle, end, end_angle) = if cross > 0.0 {
            (seg.a, angle_a, seg.b, angle_b)
        } else {
            (seg.b, angle_b, seg.a, angle_a)
        };
        events.push(SweepEvent { angle: begin_angle, kind: EventKind::Begin, segment: index, point: begin });
        events.push(SweepEvent { angle: end_angle, kind: EventKind::End, segment: index, point: end });
    }

    events.sort_by(compare_events);
    (events, touching)
}

// Consecutive events within ANGLE_EPSILON of the group's first event.
fn group_events(events: &[SweepEvent]) -> Vec<std::ops::Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    // an empty slice yields no groups: the range below is empty
    for i in 1..=events.len() {
        if i == events.len() || events[i].angle - events[start].angle > ANGLE_EPSILON {
            groups.push(start..i);
            start = i;
        }
    }
    groups
}

struct Sweep<'a> {
    origin: Point2,
    segments: &'a [SweepSegment],
    // Ray distance of each segment at the angle it was inserted at.
    distance: Vec<f32>,
    // Nearest first.
    active: Vec<usize>,
}

impl<'a> Sweep<'a> {
    fn new(origin: Point2, segments: &'a [SweepSegment]) -> Self {
        Self {
            origin,
            segments,
            distance: vec![f32::INFINITY; segments.len()],
            active: Vec::new(),
        }
    }

    // Both lookups binary-search `active` by ray distance at `angle`. Every active segment must
    // span `angle`; non-crossing segments then keep the same order along any such ray.
    fn slot(&self, ray: &Ray, key: f32, inclusive: bool) -> usize {
        let segments = self.segments;
        self.active.partition_point(|&other| {
            let d = ray_distance(ray, &segments[other].segment);
            d < key || (inclusive && d == key)
        })
    }

    // `angle` lies strictly inside the interval after the current group.
    fn insert(&mut self, index: usize, angle: f32) {
        let ray = Ray::from_angle(self.origin, angle);
        let key = ray_distance(&ray, &self.segments[index].segment);
        self.distance[index] = key;
        let pos = self.slot(&ray, key, true);
        self.active.insert(pos, index);
    }

    // `angle` lies strictly inside the interval before the current group.
    fn remove(&mut self, index: usize, angle: f32) {
        let ray = Ray::from_angle(self.origin, angle);
        let key = ray_distance(&ray, &self.segments[index].segment);
        let pos = self.slot(&ray, key, false);
        // Rounding can tie neighbours at the same distance.
        let pos = if self.active.get(pos) == Some(&index) {
            Some(pos)
        } else {
            self.active.iter().position(|&s| s == index)
        };
        match pos {
            Some(pos) => {
                self.active.remove(pos);
            }
            None => trace!("end event for inactive segment {}", index),
        }
    }

    fn nearest(&self) -> Option<usize> {
        self.active.first().copied()
    }

    // Where the ray at `angle` meets segment `index`, preferring the exact endpoint when the
    // segment has an event of `kind` in this group.
    fn point_on(&self, index: usize, angle: f32, group: &[SweepEvent], kind: EventKind) -> Point2 {
        group
            .iter()
            .find(|e| e.segment == index && e.kind == kind)
            .map(|e| e.point)
            .unwrap_or_else(|| {
                let ray = Ray::from_angle(self.origin, angle);
                RayIntersection::ray_line_point(&ray, &self.segments[index].segment)
            })
    }

    fn run(mut self, events: &[SweepEvent]) -> Vec<Point2> {
        let groups = group_events(events);
        if groups.is_empty() {
            return Vec::new();
        }

        // Middle of the open interval after each group; the last one wraps past 2π.
        let m = groups.len();
        let mids: Vec<f32> = (0..m)
            .map(|k| {
                let hi = events[groups[k].end - 1].angle;
                let next_lo = if k + 1 < m {
                    events[groups[k + 1].start].angle
                } else {
                    events[groups[0].start].angle + TAU
                };
                (hi + next_lo) * 0.5
            })
            .collect();

        // Segments crossing angle 0 are already under the ray when the sweep starts.
        let wrap_mid = mids[m - 1];
        let mut begin_angle = vec![None; self.segments.len()];
        for e in events {
            if e.kind == EventKind::Begin {
                begin_angle[e.segment] = Some(e.angle);
            }
        }
        for e in events.iter().filter(|e| e.kind == EventKind::End) {
            if let Some(begin) = begin_angle[e.segment] {
                if begin > e.angle {
                    self.insert(e.segment, wrap_mid);
                }
            }
        }
        trace!("sweep starts with {} active segments", self.active.len());

        let mut vertices = Vec::with_capacity(m * 2);
        let mut previous = self.nearest();

        for (k, range) in groups.iter().enumerate() {
            let group = &events[range.clone()];
            let angle = group[0].angle;

            // Removals first so every segment left in the set spans the next interval.
            let before = mids[(k + m - 1) % m];
            for e in group.iter().filter(|e| e.kind == EventKind::End) {
                self.remove(e.segment, before);
            }
            for e in group.iter().filter(|e| e.kind == EventKind::Begin) {
                let closes_here = group.iter().any(|o| o.kind == EventKind::End && o.segment == e.segment);
                if !closes_here {
                    self.insert(e.segment, mids[k]);
                }
            }

            let current = self.nearest();
            if current != previous {
                if let Some(old) = previous {
                    vertices.push(self.point_on(old, angle, group, EventKind::End));
                }
                if let Some(new) = current {
                    vertices.push(self.point_on(new, angle, group, EventKind::Begin));
                    trace!("nearest -> {} at angle {} (d = {})", new, angle, self.distance[new]);
                }
            }
            previous = current;
        }

        vertices
    }
}

/// Computes the visibility polygon of `origin` against `segments`.
///
/// The segment list must close off every direction (a boundary loop or a cap), otherwise the
/// polygon has gaps where rays escape. Segments are assumed not to cross each other except at
/// shared endpoints or where one ends on another; `VisibilityEngine` clips occluders to its cap
/// for this reason.
///
/// Sorting dominates at O(n log n); each event then costs a binary search of the active set.
pub fn sweep_segments(origin: Point2, segments: &[SweepSegment]) -> VisibilityPolygon {
    let (events, touching) = build_events(origin, segments);
    let occluders = segments
        .iter()
        .filter(|s| matches!(s.source, SegmentSource::Occluder(_)))
        .count();
    let occluder_events = events
        .iter()
        .filter(|e| matches!(segments[e.segment].source, SegmentSource::Occluder(_)))
        .count();

    let degeneracy = if touching > 0 || (occluders > 0 && occluder_events == 0) {
        debug!("light at ({}, {}) touches {} occluder(s); they are ignored for this sweep", origin.x, origin.y, touching);
        Some(VisibilityError::DegenerateSweep { light: origin, occluders: touching })
    } else {
        None
    };

    let mut vertices = Sweep::new(origin, segments).run(&events);
    dedup_ring(&mut vertices, VERTEX_MERGE_EPSILON);
    trace!("sweep: {} events, {} vertices", events.len(), vertices.len());

    VisibilityPolygon::new(origin, vertices).with_degeneracy(degeneracy)
}

/// A map's occluders plus the sweep settings validated against them.
#[derive(Clone, Debug)]
pub struct VisibilityEngine {
    registry: OccluderRegistry,
    config: SweepConfig,
}

impl VisibilityEngine {
    /// Fails with `UnboundedSweep` when the registry has no boundary and the config no radius.
    pub fn new(registry: OccluderRegistry, config: SweepConfig) -> VisibilityResult<Self> {
        config.validate(&registry)?;
        debug!(
            "visibility engine ready: {} occluders, boundary: {}, max radius: {:?}",
            registry.len(),
            registry.has_boundary(),
            config.max_radius
        );
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> &OccluderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn register_occluders(&mut self, occluders: &[(f32, f32, f32, f32)]) -> VisibilityResult<Vec<SegmentId>> {
        self.registry.register_occluders(occluders)
    }

    fn cap_radius(&self, origin: &Point2) -> f32 {
        if let Some(radius) = self.config.max_radius {
            return radius;
        }
        // Only reachable with a boundary loaded; a cap past every occluder keeps the polygon
        // closed even for a light outside the walls.
        if let Some(boundary) = self.registry.boundary() {
            if !boundary.contains(origin) {
                warn!("light at ({}, {}) is outside the map boundary", origin.x, origin.y);
            }
        }
        match self.registry.bounds() {
            Some(bounds) => origin.distance(&bounds.center()) + bounds.diagonal() + 1.0,
            None => 1.0,
        }
    }

    /// The per-sweep segment list: the registered occluders clipped to the cap, followed by the
    /// cap edges. Occluders wholly outside the cap are left out.
    pub fn sweep_input(&self, origin: Point2) -> Vec<SweepSegment> {
        let radius = self.cap_radius(&origin);
        let cap = cap_vertices(origin, radius, self.config.cap_sides);
        let mut segments: Vec<SweepSegment> = self
            .registry
            .segments()
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                ConvexClip::clip_segment(&s.as_segment2(), &cap).map(|segment| SweepSegment {
                    segment,
                    source: SegmentSource::Occluder(SegmentId(i)),
                })
            })
            .collect();
        let clipped_out = self.registry.len() - segments.len();
        if clipped_out > 0 {
            trace!("{} occluder(s) lie beyond the cap of radius {}", clipped_out, radius);
        }
        segments.extend(cap_segments(origin, radius, self.config.cap_sides));
        segments
    }

    /// Nearest registered occluder hit by the ray from `origin` at `angle`, with the hit point.
    pub fn cast_ray(&self, origin: Point2, angle: f32) -> Option<(SegmentId, Point2)> {
        let ray = Ray::from_angle(origin, angle);
        self.registry
            .segments()
            .iter()
            .enumerate()
            .filter_map(|(i, s)| RayIntersection::ray_segment(&ray, &s.as_segment2()).map(|t| (i, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, t)| (SegmentId(i), ray.point_at(t)))
    }

    /// True when no occluder cuts the straight line between the two points. Occluders that
    /// merely touch either end do not block.
    pub fn line_of_sight(&self, from: Point2, to: Point2) -> bool {
        let length = from.distance(&to);
        if length < EPSILON {
            return true;
        }
        let ray = Ray::new(from, to.sub(&from).into());
        let margin = EPSILON / length;
        !self.registry.segments().iter().any(|s| {
            RayIntersection::ray_segment(&ray, &s.as_segment2())
                .map_or(false, |t| t > margin && t < 1.0 - margin)
        })
    }

    /// Visibility polygon for a light at `light_position`. Pure in the position and the
    /// current occluders; numerical trouble is recovered and reported via
    /// `VisibilityPolygon::degeneracy`.
    pub fn compute_visibility<P: Into<Point2>>(&self, light_position: P) -> VisibilityPolygon {
        let origin = light_position.into();
        if !origin.is_finite() {
            warn!("non-finite light position ({}, {}); returning an empty polygon", origin.x, origin.y);
            return VisibilityPolygon::new(origin, Vec::new());
        }
        let segments = self.sweep_input(origin);
        sweep_segments(origin, &segments)
    }

    pub fn compute_for_light(&self, light: &Light) -> VisibilityPolygon {
        self.compute_visibility(light.position)
    }

    /// One polygon per light, computed in parallel. Sweeps share only the read-only registry.
    pub fn compute_many(&self, lights: &[Light]) -> Vec<VisibilityPolygon> {
        lights.par_iter().map(|light| self.compute_for_light(light)).collect()
    }
}

/// One-shot form of `VisibilityEngine::compute_visibility`.
pub fn compute_visibility(
    light_position: Point2,
    registry: &OccluderRegistry,
    config: &SweepConfig,
) -> VisibilityResult<VisibilityPolygon> {
    config.validate(registry)?;
    let engine = VisibilityEngine { registry: registry.clone(), config: *config };
    Ok(engine.compute_visibility(light_position))
}
