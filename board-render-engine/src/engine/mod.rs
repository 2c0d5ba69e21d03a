//! Rendering-side engine: app scaffolding, camera, layout math, scene rig.

pub mod camera;
pub mod core;
pub mod layout;
pub mod scene;
