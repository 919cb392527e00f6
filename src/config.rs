// src/config.rs

use crate::error::{VisibilityError, VisibilityResult};
use crate::occluders::OccluderRegistry;

pub const DEFAULT_CAP_SIDES: usize = 16;

/// Settings for the angular sweep.
///
/// A sweep must terminate against something in every direction. That is either a boundary
/// loaded into the registry or a cap polygon of `max_radius` around the light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepConfig {
    pub max_radius: Option<f32>,
    pub cap_sides: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_radius: None,
            cap_sides: DEFAULT_CAP_SIDES,
        }
    }
}

impl SweepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_radius(mut self, radius: f32) -> Self {
        self.max_radius = Some(radius);
        self
    }

    pub fn with_cap_sides(mut self, sides: usize) -> Self {
        self.cap_sides = sides;
        self
    }

    /// Checks the configuration against the occluders it will be swept with.
    pub fn validate(&self, registry: &OccluderRegistry) -> VisibilityResult<()> {
        if self.cap_sides < 3 {
            return Err(VisibilityError::invalid_config(format!(
                "cap needs at least 3 sides, got {}",
                self.cap_sides
            )));
        }
        match self.max_radius {
            Some(r) if !r.is_finite() || r <= 0.0 => Err(VisibilityError::invalid_config(format!(
                "max radius must be positive and finite, got {}",
                r
            ))),
            Some(_) => Ok(()),
            None if registry.has_boundary() => Ok(()),
            None => Err(VisibilityError::UnboundedSweep),
        }
    }
}
