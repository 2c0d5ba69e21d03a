/// Lighting rig.
pub mod environment;
