//! Screen-space UI: card labels, filter bar, action panel, task form.

pub mod action_panel;
pub mod filter_bar;
pub mod input_form;
pub mod labels;

use bevy::prelude::*;

use crate::engine::core::app_state::BoardSet;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<action_panel::SelectedCard>()
            .init_resource::<input_form::InputForm>()
            .add_systems(Startup, filter_bar::spawn_filter_bar)
            .add_systems(
                Update,
                (
                    // Capture runs first so the opening keystroke is consumed
                    // before the form starts buffering characters.
                    input_form::capture_form_input,
                    input_form::open_form_on_key,
                    filter_bar::handle_filter_buttons,
                    action_panel::handle_action_buttons,
                )
                    .chain()
                    .in_set(BoardSet::Input),
            )
            .add_systems(
                Update,
                (
                    action_panel::sync_action_panel,
                    action_panel::close_panel_on_delete,
                    input_form::sync_form_ui,
                    filter_bar::reflect_active_filter,
                )
                    .in_set(BoardSet::Feedback),
            );
    }
}
