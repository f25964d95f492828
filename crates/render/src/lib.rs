//! wgpu render backend for the room viewer.
//!
//! Renders the room shell and furnishing boxes described by a
//! [`atrium_scene::SceneConfig`], with a dynamic and a baked lighting
//! path, and maintains live per-frame counters for the stats overlay.
//!
//! # Invariants
//! - The renderer never mutates scene or camera state.
//! - Counters describe the frame most recently submitted.
//! - Backend families are mutually exclusive per GPU context.

mod backend;
mod counters;
mod gpu;
mod mesh;
mod shaders;

pub use backend::BackendKind;
pub use counters::FrameCounters;
pub use gpu::RoomRenderer;
