//! Grid slot resolution for the card board.
//!
//! Pure functions mapping (index, count) to world positions. Rows fill left
//! to right, three columns wide; the last partial row is centered on its own
//! and the block of rows is centered vertically with row 0 on top. Safe to
//! call every frame.

use bevy::prelude::*;
use constants::layout::{COLUMNS, H_SPACING, V_SPACING};

/// World position of the `index`-th slot in a board of `count` cards.
pub fn slot_position(index: usize, count: usize) -> Vec3 {
    let col = index % COLUMNS;
    let row = index / COLUMNS;
    let total_rows = count.div_ceil(COLUMNS);
    // The last row may hold fewer than COLUMNS cards; center it independently.
    let row_count = COLUMNS.min(count - row * COLUMNS);
    let x = (col as f32 - (row_count as f32 - 1.0) / 2.0) * H_SPACING;
    let y = -(row as f32 - (total_rows as f32 - 1.0) / 2.0) * V_SPACING;
    Vec3::new(x, y, 0.0)
}

/// All slot positions for a board of `count` cards, in order.
pub fn slot_positions(count: usize) -> Vec<Vec3> {
    (0..count).map(|i| slot_position(i, count)).collect()
}

/// Index of the slot nearest to `pos` in the layout plane, by squared
/// distance. Ties resolve to the lowest slot index. Returns `None` for an
/// empty layout.
pub fn nearest_slot(pos: Vec3, positions: &[Vec3]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, p) in positions.iter().enumerate() {
        let dx = p.x - pos.x;
        let dy = p.y - pos.y;
        let d2 = dx * dx + dy * dy;
        if best.is_none_or(|(_, bd)| d2 < bd) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layout_has_no_slots() {
        assert!(slot_positions(0).is_empty());
        assert_eq!(nearest_slot(Vec3::ZERO, &[]), None);
    }

    #[test]
    fn single_card_sits_at_origin() {
        assert_eq!(slot_position(0, 1), Vec3::ZERO);
    }

    #[test]
    fn two_cards_straddle_center() {
        let positions = slot_positions(2);
        assert_eq!(positions[0], Vec3::new(-H_SPACING / 2.0, 0.0, 0.0));
        assert_eq!(positions[1], Vec3::new(H_SPACING / 2.0, 0.0, 0.0));
        assert_eq!(positions[0].y, positions[1].y);
    }

    #[test]
    fn three_cards_are_symmetric_about_x_zero() {
        let positions = slot_positions(3);
        assert_eq!(positions[1].x, 0.0);
        assert_eq!(positions[0].x, -positions[2].x);
    }

    #[test]
    fn layout_is_idempotent() {
        assert_eq!(slot_positions(7), slot_positions(7));
    }

    #[test]
    fn partial_last_row_centers_independently() {
        // Four cards: full row of three on top, one centered below.
        let positions = slot_positions(4);
        assert_eq!(positions[3].x, 0.0);
        assert!(positions[3].y < positions[0].y);
        // Row block is centered vertically.
        assert_eq!(positions[0].y, -positions[3].y);
    }

    #[test]
    fn rows_stack_downward() {
        let positions = slot_positions(9);
        assert!(positions[0].y > positions[4].y);
        assert!(positions[4].y > positions[8].y);
    }

    #[test]
    fn nearest_slot_prefers_lowest_index_on_tie() {
        let positions = slot_positions(2);
        // Equidistant from both slots.
        assert_eq!(nearest_slot(Vec3::ZERO, &positions), Some(0));
    }

    #[test]
    fn nearest_slot_ignores_depth() {
        let positions = slot_positions(3);
        let probe = positions[2] + Vec3::new(0.1, -0.1, 5.0);
        assert_eq!(nearest_slot(probe, &positions), Some(2));
    }
}
