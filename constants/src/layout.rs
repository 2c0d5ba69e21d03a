/// Fixed column count for the card grid.
pub const COLUMNS: usize = 3;

/// Horizontal slot spacing: card width 2.8 + 0.6 gap.
pub const H_SPACING: f32 = 3.4;

/// Vertical slot spacing: card height 1.6 + 0.4 gap.
pub const V_SPACING: f32 = 2.0;

/// Depth offset for cards parked by an active filter.
pub const PARKED_DEPTH: f32 = -6.0;

/// Z lift applied to a card while it is being dragged.
pub const DRAG_LIFT: f32 = 2.0;

/// Lateral nudge applied to a slot occupant during a drag swap preview.
pub const GHOST_OFFSET_X: f32 = 0.4;
pub const GHOST_OFFSET_Y: f32 = 0.3;
