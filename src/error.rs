// src/error.rs

use crate::geometry::Point2;

/// Everything that can go wrong while registering occluders or sweeping a light.
///
/// `InvalidGeometry` and `UnboundedSweep` are returned as errors at setup time.
/// `DegenerateSweep` is never returned from a sweep: it is recovered locally and attached to the
/// resulting polygon as a diagnostic so the caller can log or ignore it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VisibilityError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("degenerate sweep: light at ({}, {}) lies on {occluders} occluder(s)", .light.x, .light.y)]
    DegenerateSweep { light: Point2, occluders: usize },

    #[error("unbounded sweep: no boundary occluders loaded and no max radius configured")]
    UnboundedSweep,

    #[error("invalid sweep configuration: {0}")]
    InvalidConfig(String),
}

impl VisibilityError {
    pub fn invalid_geometry<T: ToString>(msg: T) -> Self {
        VisibilityError::InvalidGeometry(msg.to_string())
    }

    pub fn invalid_config<T: ToString>(msg: T) -> Self {
        VisibilityError::InvalidConfig(msg.to_string())
    }
}

pub type VisibilityResult<T> = Result<T, VisibilityError>;
