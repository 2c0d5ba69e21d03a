//! Scene synchronization: cards, tweens, pointer interaction, registry.

pub mod card;
pub mod interaction;
pub mod registry;
pub mod transitions;
pub mod tween;

use bevy::prelude::*;

use crate::engine::core::app_state::{AppState, BoardSet};

pub struct BoardPlugin;

impl Plugin for BoardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<registry::VisualRegistry>()
            .init_resource::<registry::DragPlaced>()
            .init_resource::<interaction::PointerState>()
            .init_resource::<interaction::HoverState>()
            .add_event::<tween::TweenFinished>()
            .add_event::<interaction::HoverEntered>()
            .add_event::<interaction::HoverExited>()
            .add_event::<interaction::CardSelected>()
            .add_event::<interaction::CardDeselected>()
            .add_systems(Startup, card::init_card_assets)
            .add_systems(
                Update,
                registry::begin_reconstruction.run_if(in_state(AppState::Loading)),
            )
            .add_systems(OnEnter(AppState::Reconstructing), registry::reconstruct_scene)
            .add_systems(
                Update,
                (
                    interaction::hover_system,
                    interaction::pointer_button_system,
                    interaction::hold_to_drag_system,
                    interaction::drag_update_system,
                    interaction::drag_cancel_system,
                    interaction::hover_glow_system,
                )
                    .chain()
                    .in_set(BoardSet::Input),
            )
            .add_systems(
                Update,
                (
                    registry::handle_added,
                    registry::handle_completion,
                    registry::handle_edited,
                    registry::handle_deleted,
                    registry::handle_reordered,
                    registry::handle_filter_changed,
                )
                    .chain()
                    .in_set(BoardSet::Sync),
            )
            .add_systems(
                Update,
                (
                    (
                        tween::advance_position_tweens,
                        tween::advance_lift_tweens,
                        tween::advance_scale_tweens,
                        tween::advance_spin_tweens,
                        tween::advance_emissive_tweens,
                        tween::advance_fade_tweens,
                    ),
                    registry::apply_style_changes,
                    registry::finish_exits,
                    card::sync_card_materials,
                    crate::ui::labels::follow_cards,
                    registry::pulse_empty_hint,
                )
                    .chain()
                    .in_set(BoardSet::Animate),
            );
    }
}
