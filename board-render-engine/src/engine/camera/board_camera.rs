//! Fixed board camera with a slow idle drift.
//!
//! The camera sits on the +Z axis facing the grid. Once the pointer has been
//! still long enough the camera starts a gentle sinusoidal orbit around the
//! view axis; any pointer activity freezes it in place again.

use bevy::prelude::*;

use constants::animation::CAMERA_IDLE_THRESHOLD;

pub const CAMERA_HOME: Vec3 = Vec3::new(0.0, 0.0, 18.0);

/// Elapsed-time stamp of the last pointer interaction.
#[derive(Resource, Default)]
pub struct CameraActivity {
    pub last_interaction: f32,
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(CAMERA_HOME).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Any cursor motion or button press counts as activity.
pub fn track_pointer_activity(
    time: Res<Time>,
    mut activity: ResMut<CameraActivity>,
    mut cursor_moved: EventReader<CursorMoved>,
    buttons: Res<ButtonInput<MouseButton>>,
) {
    if cursor_moved.read().next().is_some() || buttons.get_just_pressed().next().is_some() {
        activity.last_interaction = time.elapsed_secs();
    }
}

pub fn camera_drift(
    time: Res<Time>,
    activity: Res<CameraActivity>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    let elapsed = time.elapsed_secs();
    if elapsed - activity.last_interaction < CAMERA_IDLE_THRESHOLD {
        return;
    }
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    transform.translation.x = (elapsed * 0.08).sin() * 0.8;
    transform.translation.y = (elapsed * 0.12).cos() * 0.4;
    transform.look_at(Vec3::ZERO, Vec3::Y);
}

/// Project a world position to window coordinates for overlay UI placement.
pub fn world_to_screen(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    world: Vec3,
) -> Option<Vec2> {
    camera.world_to_viewport(camera_transform, world).ok()
}
