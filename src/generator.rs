// src/generator.rs

use rand::Rng;
use crate::error::VisibilityResult;
use crate::geometry::Point2;
use crate::occluders::{OccluderRegistry, Rect};

/// Random obstacle layouts for benchmarks and the demo.
pub struct OccluderGenerator;

impl OccluderGenerator {
    /// A star-shaped polygon with `num_vertices` corners around the centre, radii within ±20% of
    /// `avg_radius`.
    pub fn generate_star_polygon(
        rng: &mut impl Rng,
        center_x: f32,
        center_y: f32,
        avg_radius: f32,
        num_vertices: usize,
    ) -> Vec<Point2> {
        let num_vertices = num_vertices.max(3);
        let mut angles = Vec::with_capacity(num_vertices);
        for i in 0..num_vertices {
            let base_angle = (i as f32) * 2.0 * std::f32::consts::PI / (num_vertices as f32);
            angles.push(base_angle);
        }

        let max_perturbation = std::f32::consts::PI / (num_vertices as f32) * 0.3;

        for angle in angles.iter_mut() {
            *angle += rng.gen_range(-max_perturbation..max_perturbation);
        }

        for i in 1..num_vertices {
            if angles[i] <= angles[i - 1] {
                angles[i] = angles[i - 1] + 0.01;
            }
        }

        // Radii vary per vertex, so only the angular order is guaranteed; that is enough for a
        // simple (non-self-intersecting) outline.
        let min_radius = avg_radius * 0.8;
        let max_radius = avg_radius * 1.2;

        angles
            .into_iter()
            .map(|angle_rad| {
                let current_radius = rng.gen_range(min_radius..max_radius);
                Point2::new(
                    center_x + current_radius * angle_rad.cos(),
                    center_y + current_radius * angle_rad.sin(),
                )
            })
            .collect()
    }

    /// Fills `area` with a `cols` x `rows` grid of cells, one obstacle centred in each, so no two
    /// obstacles overlap. Cell corners stay clear of every obstacle.
    pub fn scatter_obstacles(
        rng: &mut impl Rng,
        registry: &mut OccluderRegistry,
        area: Rect,
        cols: usize,
        rows: usize,
        max_vertices: usize,
    ) -> VisibilityResult<usize> {
        let cell_w = area.width() / cols.max(1) as f32;
        let cell_h = area.height() / rows.max(1) as f32;
        // 0.5 * 0.6 * 1.2 keeps the largest radius at 36% of the cell.
        let avg_radius = cell_w.min(cell_h) * 0.5 * 0.6;

        let mut added = 0;
        for row in 0..rows {
            for col in 0..cols {
                let cx = area.min.x + (col as f32 + 0.5) * cell_w;
                let cy = area.min.y + (row as f32 + 0.5) * cell_h;
                let vertices = rng.gen_range(3..=max_vertices.max(3));
                let outline = Self::generate_star_polygon(rng, cx, cy, avg_radius, vertices);
                registry.add_polygon(&outline)?;
                added += 1;
            }
        }
        Ok(added)
    }
}
