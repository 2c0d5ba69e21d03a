use bevy::prelude::*;

/// Ambient particle pool size.
pub const PARTICLE_COUNT: usize = 512;

/// Radius of the sphere the ambient particles drift inside.
pub const PARTICLE_SPHERE_RADIUS: f32 = 15.0;

/// Ambient speed clamp.
pub const PARTICLE_MAX_SPEED: f32 = 0.8;

/// Brownian acceleration magnitude per second.
pub const PARTICLE_BROWNIAN: f32 = 0.3;

/// Cursor attraction falloff radius and strength.
pub const PARTICLE_ATTRACT_RADIUS: f32 = 4.0;
pub const PARTICLE_ATTRACT_STRENGTH: f32 = 0.8;

/// Burst particle counts per event kind.
pub const BURST_COUNT_ADD: usize = 60;
pub const BURST_COUNT_COMPLETE: usize = 70;
pub const BURST_COUNT_DELETE: usize = 65;
pub const BURST_COUNT_VICTORY: usize = 150;

/// Progress ring placement and geometry.
pub const RING_CENTER: Vec3 = Vec3::new(0.0, 5.5, 0.0);
pub const RING_RADIUS: f32 = 1.2;
pub const RING_THICKNESS: f32 = 0.08;
pub const RING_TRACK_THICKNESS: f32 = 0.05;

/// Ring colour endpoints: empty board is deep blue, full board is gold.
pub const RING_COLOR_START: LinearRgba = LinearRgba::rgb(0.0, 0.2, 1.0);
pub const RING_COLOR_END: LinearRgba = LinearRgba::rgb(1.0, 0.8, 0.27);

/// Star sparks spawned by the victory shatter.
pub const VICTORY_STAR_COUNT: usize = 20;
