// src/lib.rs

pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod intersection;
pub mod light;
pub mod occluders;
pub mod polygon;
pub mod sweep;
pub mod vertex;

pub use config::SweepConfig;
pub use error::{VisibilityError, VisibilityResult};
pub use geometry::{Point2, Segment2};
pub use light::Light;
pub use occluders::{OccluderRegistry, SegmentId};
pub use polygon::VisibilityPolygon;
pub use sweep::{compute_visibility, VisibilityEngine};
pub use vertex::{LightMesh, LightVertex};
