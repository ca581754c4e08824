//! Render configuration.

use pinhole_core::Color;
use pinhole_math::DVec3;
use serde::{Deserialize, Serialize};

use crate::RenderError;

/// Render configuration.
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f64,
    /// Camera depth of the near clip plane (must be positive)
    pub near: f64,
    /// Camera depth of the far clip plane
    pub far: f64,
    /// Color of pixels no face covers
    pub background: Color,
    /// Direction the directional light travels in world space
    pub light_direction: [f64; 3],
    /// Lit composite intensity of surfaces facing away from the light
    pub ambient: f64,
    /// Wireframe overlay color
    pub wireframe_color: Color,
    /// Vertex marker color
    pub vertex_color: Color,
    /// Vertex marker radius in pixels
    pub vertex_radius: i32,
    /// World length of the axis markers
    pub axis_length: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            background: Color::BLACK,
            light_direction: [-0.4, -1.0, -0.6],
            ambient: 0.15,
            wireframe_color: Color::WHITE,
            vertex_color: Color::rgb(255, 255, 0),
            vertex_radius: 2,
            axis_length: 1.0,
        }
    }
}

impl RenderConfig {
    /// Check the values the camera and clipper depend on.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(RenderError::InvalidFov(self.fov_degrees));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(RenderError::InvalidClipRange {
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }

    /// Unit vector pointing from surfaces towards the light.
    pub fn to_light(&self) -> DVec3 {
        let [x, y, z] = self.light_direction;
        (-DVec3::new(x, y, z)).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let config = RenderConfig {
            near: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::InvalidClipRange { .. })));

        let config = RenderConfig {
            far: 0.05,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::InvalidClipRange { .. })));

        let config = RenderConfig {
            fov_degrees: 180.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::InvalidFov(_))));
    }

    #[test]
    fn test_partial_json() {
        let config: RenderConfig =
            serde_json::from_str(r##"{ "fov_degrees": 45.0, "background": "#102030" }"##).unwrap();

        assert_eq!(config.fov_degrees, 45.0);
        assert_eq!(config.background, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(config.near, RenderConfig::default().near);
    }

    #[test]
    fn test_to_light_is_unit_and_reversed() {
        let config = RenderConfig {
            light_direction: [0.0, 0.0, 2.0],
            ..Default::default()
        };
        assert_eq!(config.to_light(), DVec3::new(0.0, 0.0, -1.0));
    }
}
