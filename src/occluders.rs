// src/occluders.rs

use log::debug;
use crate::error::{VisibilityError, VisibilityResult};
use crate::geometry::{Point2, Segment2, EPSILON};

/// Stable index of a segment inside an `OccluderRegistry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndPoint {
    pub position: Point2,
    pub segment: SegmentId, // back-reference into the registry arena
    pub visualize: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub p1: EndPoint,
    pub p2: EndPoint,
}

impl Segment {
    pub fn as_segment2(&self) -> Segment2 {
        Segment2::new(self.p1.position, self.p2.position)
    }

    pub fn endpoints(&self) -> [&EndPoint; 2] {
        [&self.p1, &self.p2]
    }
}

/// Axis-aligned rectangle, used for the loaded boundary and for occluder bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Point2,
    pub max: Point2,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2 {
        Point2::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    pub fn diagonal(&self) -> f32 {
        self.min.distance(&self.max)
    }

    /// Strict containment with an `EPSILON` inset, so points on the edge are outside.
    pub fn contains(&self, p: &Point2) -> bool {
        p.x > self.min.x + EPSILON
            && p.x < self.max.x - EPSILON
            && p.y > self.min.y + EPSILON
            && p.y < self.max.y - EPSILON
    }

    /// Corners in the order the boundary walls visit them.
    pub fn corners(&self) -> [Point2; 4] {
        [
            Point2::new(self.min.x, self.min.y),
            Point2::new(self.min.x, self.max.y),
            Point2::new(self.max.x, self.max.y),
            Point2::new(self.max.x, self.min.y),
        ]
    }
}

/// Arena of static occluding segments for one map.
///
/// Segments are append-only: once a map is loaded, only the light moves.
#[derive(Clone, Debug, Default)]
pub struct OccluderRegistry {
    segments: Vec<Segment>,
    boundary: Option<Rect>,
}

impl OccluderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(a: &Point2, b: &Point2) -> VisibilityResult<()> {
        if !a.is_finite() || !b.is_finite() {
            return Err(VisibilityError::invalid_geometry(format!(
                "non-finite segment ({}, {}) -> ({}, {})",
                a.x, a.y, b.x, b.y
            )));
        }
        if a.distance(b) < EPSILON {
            return Err(VisibilityError::invalid_geometry(format!(
                "zero-length segment at ({}, {})",
                a.x, a.y
            )));
        }
        Ok(())
    }

    // Caller has validated the points.
    fn push_segment(&mut self, a: Point2, b: Point2) -> SegmentId {
        let id = SegmentId(self.segments.len());
        self.segments.push(Segment {
            p1: EndPoint { position: a, segment: id, visualize: true },
            p2: EndPoint { position: b, segment: id, visualize: false },
        });
        id
    }

    /// Registers one occluder. The first point carries the `visualize` flag.
    pub fn add_segment(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> VisibilityResult<SegmentId> {
        let a = Point2::new(x1, y1);
        let b = Point2::new(x2, y2);
        Self::validate(&a, &b)?;
        let id = self.push_segment(a, b);
        debug!("registered occluder {:?}: ({}, {}) -> ({}, {})", id, x1, y1, x2, y2);
        Ok(id)
    }

    /// Registers a batch of occluders. Either every entry is added or, on the first invalid
    /// entry, none are.
    pub fn register_occluders(&mut self, occluders: &[(f32, f32, f32, f32)]) -> VisibilityResult<Vec<SegmentId>> {
        for (index, &(x1, y1, x2, y2)) in occluders.iter().enumerate() {
            Self::validate(&Point2::new(x1, y1), &Point2::new(x2, y2)).map_err(|e| match e {
                VisibilityError::InvalidGeometry(msg) => {
                    VisibilityError::invalid_geometry(format!("occluder #{}: {}", index, msg))
                }
                other => other,
            })?;
        }
        let ids = occluders
            .iter()
            .map(|&(x1, y1, x2, y2)| self.push_segment(Point2::new(x1, y1), Point2::new(x2, y2)))
            .collect::<Vec<_>>();
        debug!("registered {} occluders ({} total)", ids.len(), self.segments.len());
        Ok(ids)
    }

    /// Registers a closed loop of segments through `points`, each vertex emitted once.
    pub fn add_polygon(&mut self, points: &[Point2]) -> VisibilityResult<Vec<SegmentId>> {
        if points.len() < 3 {
            return Err(VisibilityError::invalid_geometry(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        let edges: Vec<(f32, f32, f32, f32)> = (0..points.len())
            .map(|i| {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                (a.x, a.y, b.x, b.y)
            })
            .collect();
        self.register_occluders(&edges)
    }

    /// Adds the outer wall of a square map of side `size`, inset by `margin`.
    pub fn load_boundary(&mut self, size: f32, margin: f32) -> VisibilityResult<Vec<SegmentId>> {
        self.load_boundary_rect(size, size, margin)
    }

    /// Adds four walls forming the rectangle `[margin, width - margin] x [margin, height - margin]`.
    pub fn load_boundary_rect(&mut self, width: f32, height: f32, margin: f32) -> VisibilityResult<Vec<SegmentId>> {
        if !(width.is_finite() && height.is_finite() && margin.is_finite()) {
            return Err(VisibilityError::invalid_geometry("non-finite boundary dimensions"));
        }
        if margin < 0.0 || margin * 2.0 >= width || margin * 2.0 >= height {
            return Err(VisibilityError::invalid_geometry(format!(
                "boundary margin {} leaves no room inside {}x{}",
                margin, width, height
            )));
        }
        if self.boundary.is_some() {
            return Err(VisibilityError::invalid_geometry("boundary already loaded"));
        }

        let rect = Rect {
            min: Point2::new(margin, margin),
            max: Point2::new(width - margin, height - margin),
        };
        let ids = self.add_polygon(&rect.corners())?;
        self.boundary = Some(rect);
        debug!("loaded boundary {:?}", rect);
        Ok(ids)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &EndPoint> + '_ {
        self.segments.iter().flat_map(|s| s.endpoints())
    }

    /// Endpoints flagged for display: every vertex of a closed loop appears exactly once.
    pub fn visualized_points(&self) -> Vec<Point2> {
        self.endpoints()
            .filter(|e| e.visualize)
            .map(|e| e.position)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_boundary(&self) -> bool {
        self.boundary.is_some()
    }

    pub fn boundary(&self) -> Option<Rect> {
        self.boundary
    }

    /// Bounding box of every registered occluder, `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.endpoints().map(|e| e.position);
        let first = points.next()?;
        let mut rect = Rect { min: first, max: first };
        for p in points {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        Some(rect)
    }
}
