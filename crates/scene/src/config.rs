use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::lighting::LightingSettings;

/// Errors from scene configuration loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A box-shaped furniture item placed in the room.
///
/// `position` is the center of the box base on the floor plane; `size` is
/// full extents in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furnishing {
    pub name: String,
    pub position: Vec3,
    pub size: Vec3,
    pub color: [f32; 4],
}

impl Furnishing {
    pub fn new(name: &str, position: Vec3, size: Vec3, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            position,
            size,
            color,
        }
    }
}

/// The room shell: floor extent, wall height, and surface colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomShell {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub floor_color: [f32; 4],
    pub wall_color: [f32; 4],
}

impl Default for RoomShell {
    fn default() -> Self {
        Self {
            width: 6.0,
            depth: 6.0,
            height: 2.8,
            floor_color: [0.45, 0.35, 0.26, 1.0],
            wall_color: [0.85, 0.82, 0.76, 1.0],
        }
    }
}

/// Camera framing and motion constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    /// Rest position the fly-in settles at.
    pub eye: Vec3,
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Largest angle from straight overhead, in degrees. 80 keeps the
    /// camera from dipping below the furniture.
    pub max_polar_degrees: f32,
    pub fly_in_seconds: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 30.0,
            eye: Vec3::new(3.0, 3.0, 3.0),
            target: Vec3::new(0.0, 0.8, 0.0),
            min_distance: 1.0,
            max_distance: 8.0,
            max_polar_degrees: 80.0,
            fly_in_seconds: 2.5,
        }
    }
}

/// Soft dark discs drawn under furnishings in dynamic mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactShadowSettings {
    pub enabled: bool,
    pub opacity: f32,
    /// Disc radius as a multiple of the furnishing footprint.
    pub scale: f32,
}

impl Default for ContactShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: 0.4,
            scale: 1.25,
        }
    }
}

/// Complete description of a renderable scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub name: String,
    /// Clear color behind the room, linear RGB.
    pub background: [f32; 3],
    pub room: RoomShell,
    pub furnishings: Vec<Furnishing>,
    pub lighting: LightingSettings,
    pub camera: CameraConfig,
    pub contact_shadows: ContactShadowSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::living_room()
    }
}

impl SceneConfig {
    /// The built-in furnished living room.
    pub fn living_room() -> Self {
        let furnishings = vec![
            Furnishing::new(
                "rug",
                Vec3::new(0.0, 0.0, 0.3),
                Vec3::new(3.2, 0.02, 2.2),
                [0.55, 0.17, 0.16, 1.0],
            ),
            Furnishing::new(
                "sofa_base",
                Vec3::new(0.0, 0.0, 1.6),
                Vec3::new(2.2, 0.45, 0.9),
                [0.35, 0.42, 0.5, 1.0],
            ),
            Furnishing::new(
                "sofa_back",
                Vec3::new(0.0, 0.45, 1.95),
                Vec3::new(2.2, 0.5, 0.2),
                [0.32, 0.39, 0.47, 1.0],
            ),
            Furnishing::new(
                "coffee_table",
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.1, 0.4, 0.6),
                [0.4, 0.28, 0.18, 1.0],
            ),
            Furnishing::new(
                "armchair",
                Vec3::new(-1.9, 0.0, 0.1),
                Vec3::new(0.8, 0.75, 0.8),
                [0.5, 0.45, 0.33, 1.0],
            ),
            Furnishing::new(
                "tv_stand",
                Vec3::new(0.0, 0.0, -2.4),
                Vec3::new(1.8, 0.5, 0.45),
                [0.2, 0.18, 0.16, 1.0],
            ),
            Furnishing::new(
                "bookshelf",
                Vec3::new(2.4, 0.0, -1.6),
                Vec3::new(0.9, 1.9, 0.35),
                [0.42, 0.3, 0.2, 1.0],
            ),
            Furnishing::new(
                "floor_lamp",
                Vec3::new(-2.4, 0.0, 1.9),
                Vec3::new(0.25, 1.6, 0.25),
                [0.8, 0.76, 0.62, 1.0],
            ),
            Furnishing::new(
                "side_table",
                Vec3::new(1.6, 0.0, 1.5),
                Vec3::new(0.45, 0.55, 0.45),
                [0.38, 0.27, 0.17, 1.0],
            ),
        ];

        Self {
            name: "Living room".into(),
            background: [0.067, 0.067, 0.067],
            room: RoomShell::default(),
            furnishings,
            lighting: LightingSettings::default(),
            camera: CameraConfig::default(),
            contact_shadows: ContactShadowSettings::default(),
        }
    }

    /// Load a scene from a JSON file, clamping lighting into range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let mut scene: Self = serde_json::from_str(&data)?;
        scene.lighting.clamp_to_ranges();
        tracing::info!(
            scene = %scene.name,
            furnishings = scene.furnishings.len(),
            "scene loaded"
        );
        Ok(scene)
    }

    /// Save the scene to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn living_room_is_furnished() {
        let scene = SceneConfig::living_room();
        assert!(scene.furnishings.len() >= 5);
        assert!(scene.furnishings.iter().any(|f| f.name == "sofa_base"));
    }

    #[test]
    fn furnishings_fit_inside_the_room() {
        let scene = SceneConfig::living_room();
        let half_w = scene.room.width / 2.0;
        let half_d = scene.room.depth / 2.0;
        for f in &scene.furnishings {
            assert!(f.position.x.abs() + f.size.x / 2.0 <= half_w, "{}", f.name);
            assert!(f.position.z.abs() + f.size.z / 2.0 <= half_d, "{}", f.name);
            assert!(f.size.y <= scene.room.height, "{}", f.name);
        }
    }

    #[test]
    fn camera_defaults() {
        let cam = CameraConfig::default();
        assert_eq!(cam.fov_degrees, 30.0);
        assert_eq!(cam.min_distance, 1.0);
        assert_eq!(cam.max_distance, 8.0);
        assert_eq!(cam.max_polar_degrees, 80.0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let scene = SceneConfig::living_room();
        scene.save(tmp.path()).unwrap();

        let loaded = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, scene);
    }

    #[test]
    fn load_clamps_out_of_range_lighting() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut scene = SceneConfig::living_room();
        scene.lighting.ambient_intensity = 50.0;
        serde_json::to_writer(std::fs::File::create(tmp.path()).unwrap(), &scene).unwrap();

        let loaded = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded.lighting.ambient_intensity, 2.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SceneConfig::load("/nonexistent/scene.json").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
