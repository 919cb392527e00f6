// src/polygon.rs

use crate::error::VisibilityError;
use crate::geometry::{polygon_area, segments_properly_intersect, Point2, Segment2, EPSILON};

/// Closed boundary of the region lit from `origin`, vertices in increasing angle around it.
///
/// Each sweep returns a fresh value; nothing inside the engine keeps a reference to it.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityPolygon {
    origin: Point2,
    vertices: Vec<Point2>,
    degeneracy: Option<VisibilityError>,
}

impl VisibilityPolygon {
    pub fn new(origin: Point2, vertices: Vec<Point2>) -> Self {
        Self { origin, vertices, degeneracy: None }
    }

    pub(crate) fn with_degeneracy(mut self, degeneracy: Option<VisibilityError>) -> Self {
        self.degeneracy = degeneracy;
        self
    }

    pub fn origin(&self) -> Point2 {
        self.origin
    }

    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<Point2> {
        self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The `DegenerateSweep` recovered while producing this polygon, if any.
    pub fn degeneracy(&self) -> Option<&VisibilityError> {
        self.degeneracy.as_ref()
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.vertices).abs()
    }

    /// Edges in order, including the closing edge from the last vertex back to the first.
    pub fn edges(&self) -> impl Iterator<Item = Segment2> + '_ {
        let n = self.vertices.len();
        (0..if n < 2 { 0 } else { n }).map(move |i| Segment2::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Even-odd point containment.
    pub fn contains(&self, p: &Point2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > p.y) != (vj.y > p.y) {
                let x_cross = vj.x + (p.y - vj.y) * (vi.x - vj.x) / (vi.y - vj.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// True when no two non-adjacent edges cross.
    pub fn is_simple(&self) -> bool {
        let edges: Vec<Segment2> = self.edges().collect();
        let n = edges.len();
        if n < 3 {
            return false;
        }
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue; // closing edge touches the first one
                }
                if segments_properly_intersect(&edges[i], &edges[j], EPSILON) {
                    return false;
                }
            }
        }
        true
    }

    pub fn translated(&self, offset: &Point2) -> VisibilityPolygon {
        VisibilityPolygon {
            origin: self.origin.add(offset),
            vertices: self.vertices.iter().map(|v| v.add(offset)).collect(),
            degeneracy: self.degeneracy.clone(),
        }
    }

    /// Raw vertex bytes, ready for a vertex buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Drops consecutive vertices closer than `eps`, treating the list as a closed ring.
pub fn dedup_ring(vertices: &mut Vec<Point2>, eps: f32) {
    vertices.dedup_by(|b, a| a.approx_eq(b, eps));
    while vertices.len() > 1 {
        let first = vertices[0];
        match vertices.last() {
            Some(last) if last.approx_eq(&first, eps) => {
                vertices.pop();
            }
            _ => break,
        }
    }
}
