// src/light.rs

use glam::Vec2;
use crate::geometry::Point2;

/// A point light as the renderer sees it. Only `position` feeds the sweep; `radius` bounds the
/// light mask the renderer draws from the resulting polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec2,
    pub color: [f32; 4],
    pub radius: f32,
}

impl Light {
    pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const GREEN: [f32; 4] = [0.0, 0.5, 0.0, 1.0];
    pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, color: Self::WHITE, radius }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn point(&self) -> Point2 {
        self.position.into()
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Whether `p` falls inside the light's radius disc.
    pub fn contains(&self, p: &Point2) -> bool {
        self.position.distance_squared(Vec2::from(*p)) <= self.radius * self.radius
    }
}
