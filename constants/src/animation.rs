/// Transition durations in seconds.
pub const CREATE_DURATION: f32 = 0.7;
pub const COMPLETE_DURATION: f32 = 1.1;
pub const DELETE_DURATION: f32 = 0.6;
pub const EDIT_DURATION: f32 = 0.4;
pub const REFLOW_DURATION: f32 = 0.5;
pub const FILTER_PARK_DURATION: f32 = 0.6;
pub const GHOST_NUDGE_DURATION: f32 = 0.2;
pub const DRAG_SNAP_DURATION: f32 = 0.5;
pub const DRAG_CANCEL_DURATION: f32 = 0.3;

/// Hold time before a press becomes a drag, in seconds.
pub const PRESS_HOLD_THRESHOLD: f32 = 0.3;

/// Per-card entrance delay when reconstructing a persisted board.
pub const RECONSTRUCT_STAGGER: f32 = 0.08;

/// Seconds without pointer activity before the idle camera drift resumes.
pub const CAMERA_IDLE_THRESHOLD: f32 = 3.0;
