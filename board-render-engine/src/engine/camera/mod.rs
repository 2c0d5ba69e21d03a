/// Board camera spawn, idle drift, and projection helpers.
pub mod board_camera;

pub use board_camera::{
    CameraActivity, camera_drift, setup_camera, track_pointer_activity, world_to_screen,
};
