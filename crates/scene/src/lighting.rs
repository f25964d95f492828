use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use glam::Vec3;

/// Adjustable range for ambient intensity.
pub const AMBIENT_RANGE: RangeInclusive<f32> = 0.0..=2.0;
/// Adjustable range for directional intensity.
pub const DIRECTIONAL_RANGE: RangeInclusive<f32> = 0.0..=5.0;
/// Adjustable range for shadow bias.
pub const SHADOW_BIAS_RANGE: RangeInclusive<f32> = -0.01..=0.01;

/// How the scene is lit: computed per frame, or pre-folded into the
/// scene's colors at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingMode {
    #[default]
    Dynamic,
    Baked,
}

/// Lighting parameters for the room.
///
/// The dynamic parameters only apply in [`LightingMode::Dynamic`]; baked
/// mode draws the pre-lit scene and ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingSettings {
    pub mode: LightingMode,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    /// Position of the key light; the light aims at the origin.
    pub directional_position: Vec3,
    pub shadow_bias: f32,
    /// Warm fill light tucked into the back corner.
    pub point_position: Vec3,
    pub point_intensity: f32,
    pub point_color: [f32; 3],
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            mode: LightingMode::Dynamic,
            ambient_intensity: 0.4,
            directional_intensity: 1.5,
            directional_position: Vec3::new(5.0, 8.0, 5.0),
            shadow_bias: -0.001,
            point_position: Vec3::new(-3.0, 4.0, -2.0),
            point_intensity: 0.5,
            point_color: [1.0, 0.831, 0.639],
        }
    }
}

impl LightingSettings {
    pub fn is_baked(&self) -> bool {
        self.mode == LightingMode::Baked
    }

    /// Direction the key light shines in (unit vector toward the origin).
    pub fn directional_direction(&self) -> Vec3 {
        (-self.directional_position).normalize_or_zero()
    }

    /// Clamp every adjustable parameter back into its declared range.
    /// Applied after deserializing external config.
    pub fn clamp_to_ranges(&mut self) {
        self.ambient_intensity = self
            .ambient_intensity
            .clamp(*AMBIENT_RANGE.start(), *AMBIENT_RANGE.end());
        self.directional_intensity = self
            .directional_intensity
            .clamp(*DIRECTIONAL_RANGE.start(), *DIRECTIONAL_RANGE.end());
        self.shadow_bias = self
            .shadow_bias
            .clamp(*SHADOW_BIAS_RANGE.start(), *SHADOW_BIAS_RANGE.end());
        self.point_intensity = self.point_intensity.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = LightingSettings::default();
        assert_eq!(s.mode, LightingMode::Dynamic);
        assert_eq!(s.ambient_intensity, 0.4);
        assert_eq!(s.directional_intensity, 1.5);
        assert_eq!(s.shadow_bias, -0.001);
        assert_eq!(s.point_intensity, 0.5);
        assert!(!s.is_baked());
    }

    #[test]
    fn clamp_pulls_values_into_range() {
        let mut s = LightingSettings {
            ambient_intensity: 9.0,
            directional_intensity: -1.0,
            shadow_bias: 0.5,
            point_intensity: -2.0,
            ..LightingSettings::default()
        };
        s.clamp_to_ranges();
        assert_eq!(s.ambient_intensity, 2.0);
        assert_eq!(s.directional_intensity, 0.0);
        assert_eq!(s.shadow_bias, 0.01);
        assert_eq!(s.point_intensity, 0.0);
    }

    #[test]
    fn directional_direction_is_unit_and_downward() {
        let s = LightingSettings::default();
        let dir = s.directional_direction();
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.y < 0.0);
    }

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&LightingMode::Baked).unwrap();
        assert_eq!(json, "\"baked\"");
    }
}
