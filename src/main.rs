// src/main.rs
//
// Headless driver for the lighting demo scene: a 1500x1024 walled map with scattered
// obstacles and three lights. The red light follows a simulated cursor; every frame the
// visibility polygons are recomputed and turned into light-map meshes a renderer would draw.

use std::time::Instant;

use glam::Vec2;
use log::{debug, error, info};
use shadowcast2d::generator::OccluderGenerator;
use shadowcast2d::occluders::Rect;
use shadowcast2d::{Light, LightMesh, OccluderRegistry, Point2, SweepConfig, VisibilityEngine, VisibilityResult};

const BACK_BUFFER_WIDTH: f32 = 1500.0;
const BACK_BUFFER_HEIGHT: f32 = 1024.0;
const WALL_MARGIN: f32 = 10.0;
const LIGHT_RADIUS: f32 = 1200.0;
const DEFAULT_FRAMES: usize = 120;

fn build_scene() -> VisibilityResult<VisibilityEngine> {
    let mut registry = OccluderRegistry::new();
    registry.load_boundary_rect(BACK_BUFFER_WIDTH, BACK_BUFFER_HEIGHT, WALL_MARGIN)?;

    let mut rng = rand::thread_rng();
    let area = Rect {
        min: Point2::new(100.0, 100.0),
        max: Point2::new(BACK_BUFFER_WIDTH - 100.0, BACK_BUFFER_HEIGHT - 100.0),
    };
    let obstacles = OccluderGenerator::scatter_obstacles(&mut rng, &mut registry, area, 5, 3, 6)?;
    info!("scene: {} obstacles, {} occluder segments", obstacles, registry.len());

    VisibilityEngine::new(registry, SweepConfig::default())
}

// The cursor circles the middle of the map.
fn cursor_position(frame: usize, frames: usize) -> Vec2 {
    let t = frame as f32 / frames.max(1) as f32 * std::f32::consts::TAU;
    Vec2::new(BACK_BUFFER_WIDTH * 0.5, BACK_BUFFER_HEIGHT * 0.5) + Vec2::from_angle(t) * 300.0
}

fn run(frames: usize) -> VisibilityResult<()> {
    let engine = build_scene()?;

    let mut lights = [
        Light::new(Vec2::splat(200.0), LIGHT_RADIUS).with_color(Light::RED),
        Light::new(Vec2::splat(400.0), LIGHT_RADIUS).with_color(Light::GREEN),
        Light::new(Vec2::splat(600.0), LIGHT_RADIUS).with_color(Light::BLUE),
    ];

    let start = Instant::now();
    let mut total_triangles = 0;
    for frame in 0..frames {
        lights[0].move_to(cursor_position(frame, frames));

        let polygons = engine.compute_many(&lights);
        for (light, polygon) in lights.iter().zip(&polygons) {
            if let Some(issue) = polygon.degeneracy() {
                info!("frame {}: {}", frame, issue);
            }
            let mesh = LightMesh::from_polygon(polygon, light)?;
            total_triangles += mesh.triangle_count();
            debug!(
                "frame {}: light at ({:.1}, {:.1}) -> {} vertices, area {:.0}",
                frame,
                light.position.x,
                light.position.y,
                polygon.len(),
                polygon.area()
            );
        }
    }

    let elapsed = start.elapsed();
    info!(
        "{} frames x {} lights in {:.2?} ({:.3} ms/frame), {} triangles",
        frames,
        lights.len(),
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / frames.max(1) as f64,
        total_triangles
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    if let Err(e) = run(frames) {
        error!("{}", e);
        std::process::exit(1);
    }
}
