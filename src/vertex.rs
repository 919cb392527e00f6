// src/vertex.rs

use bytemuck::{Pod, Zeroable};
use crate::error::{VisibilityError, VisibilityResult};
use crate::light::Light;
use crate::polygon::VisibilityPolygon;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct LightVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl LightVertex {
    pub fn new(position: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Triangle fan over a visibility polygon, rooted at the light, ready for a renderer to fill
/// into its light map. Alpha falls off linearly from the light to its radius.
#[derive(Clone, Debug, Default)]
pub struct LightMesh {
    pub vertices: Vec<LightVertex>,
    pub indices: Vec<u16>,
}

impl LightMesh {
    pub fn from_polygon(polygon: &VisibilityPolygon, light: &Light) -> VisibilityResult<Self> {
        let count = polygon.len();
        if count < 3 {
            return Ok(Self::default());
        }
        // +1 for the centre vertex
        if count + 1 > u16::MAX as usize {
            return Err(VisibilityError::invalid_geometry(format!(
                "polygon with {} vertices does not fit a u16 index buffer",
                count
            )));
        }

        let mut vertices = Vec::with_capacity(count + 1);
        vertices.push(LightVertex::new([light.position.x, light.position.y], light.color));
        for p in polygon.vertices() {
            let distance = light.point().distance(p);
            let falloff = if light.radius > 0.0 {
                (1.0 - distance / light.radius).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let [r, g, b, a] = light.color;
            vertices.push(LightVertex::new([p.x, p.y], [r, g, b, a * falloff]));
        }

        let mut indices = Vec::with_capacity(count * 3);
        for i in 1..=count as u16 {
            let next = if i as usize == count { 1 } else { i + 1 };
            indices.push(0);
            indices.push(i);
            indices.push(next);
        }

        Ok(Self { vertices, indices })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    // Index buffers are padded to a 4-byte multiple, as wgpu requires for writes.
    pub fn index_bytes_padded(&self) -> Vec<u8> {
        let mut padded = self.indices.clone();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        bytemuck::cast_slice(&padded).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;
    use glam::Vec2;

    fn unit_square() -> VisibilityPolygon {
        VisibilityPolygon::new(
            Point2::new(0.0, 0.0),
            vec![
                Point2::new(1.0, 1.0),
                Point2::new(-1.0, 1.0),
                Point2::new(-1.0, -1.0),
                Point2::new(1.0, -1.0),
            ],
        )
    }

    #[test]
    fn fan_closes_back_to_first_rim_vertex() {
        let light = Light::new(Vec2::ZERO, 10.0).with_color(Light::BLUE);
        let mesh = LightMesh::from_polygon(&unit_square(), &light).unwrap();
        assert_eq!(mesh.vertices.len(), 5);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(&mesh.indices[9..12], &[0, 4, 1]);
        assert_eq!(mesh.vertices[0].color, Light::BLUE);
    }

    #[test]
    fn alpha_falls_off_with_distance() {
        let light = Light::new(Vec2::ZERO, 2.0_f32.sqrt());
        let mesh = LightMesh::from_polygon(&unit_square(), &light).unwrap();
        for v in &mesh.vertices[1..] {
            assert!(v.color[3].abs() < 1e-5);
        }
        assert_eq!(mesh.vertices[0].color[3], 1.0);
    }

    #[test]
    fn degenerate_polygon_gives_empty_mesh() {
        let light = Light::new(Vec2::ZERO, 1.0);
        let poly = VisibilityPolygon::new(Point2::new(0.0, 0.0), vec![Point2::new(1.0, 0.0)]);
        let mesh = LightMesh::from_polygon(&poly, &light).unwrap();
        assert!(mesh.vertices.is_empty());
        assert_eq!(mesh.index_bytes_padded().len(), 0);
    }

    #[test]
    fn index_bytes_are_padded_to_four() {
        let light = Light::new(Vec2::ZERO, 10.0);
        let poly = VisibilityPolygon::new(
            Point2::new(0.0, 0.0),
            vec![Point2::new(1.0, 0.0), Point2::new(0.0, 1.0), Point2::new(-1.0, -1.0)],
        );
        let mesh = LightMesh::from_polygon(&poly, &light).unwrap();
        assert_eq!(mesh.indices.len(), 9);
        assert_eq!(mesh.index_bytes_padded().len(), 20);
        assert_eq!(mesh.vertex_bytes().len(), 4 * std::mem::size_of::<LightVertex>());
    }
}
