//! Scene description for the room viewer.
//!
//! Everything the renderer draws is configuration: the room shell, the
//! furnishings placed in it, the lighting model, and the camera framing.
//! The renderer consumes this data and never mutates it.
//!
//! # Invariants
//! - Scene data is plain serializable state with no GPU or UI dependency.
//! - Lighting parameters stay inside their declared ranges.

mod config;
mod lighting;
mod orbit;

pub use config::{
    CameraConfig, ContactShadowSettings, Furnishing, RoomShell, SceneConfig, SceneError,
};
pub use lighting::{
    LightingMode, LightingSettings, AMBIENT_RANGE, DIRECTIONAL_RANGE, SHADOW_BIAS_RANGE,
};
pub use orbit::OrbitCamera;
