//! Per-card action panel, anchored next to the clicked card.

use bevy::prelude::*;

use crate::board::interaction::{CardDeselected, CardSelected};
use crate::store::{StoreEvent, TaskId, TaskStore};
use crate::ui::input_form::{FormMode, InputForm};

#[derive(Resource, Default)]
pub struct SelectedCard(pub Option<TaskId>);

#[derive(Component)]
pub struct ActionPanelRoot;

#[derive(Component, Clone, Copy)]
pub enum ActionButton {
    ToggleComplete,
    Edit,
    Delete,
}

/// Open the panel on select, move it on reselect, close it on deselect.
pub fn sync_action_panel(
    mut commands: Commands,
    mut selections: EventReader<CardSelected>,
    mut deselections: EventReader<CardDeselected>,
    store: Res<TaskStore>,
    mut selected: ResMut<SelectedCard>,
    panels: Query<Entity, With<ActionPanelRoot>>,
) {
    let deselect = deselections.read().next().is_some();
    let select = selections.read().last().cloned();

    if deselect && select.is_none() {
        close_panel(&mut commands, &panels, &mut selected);
    }
    if let Some(event) = select {
        close_panel(&mut commands, &panels, &mut selected);
        let Some(task) = store.get(event.id) else {
            return;
        };
        selected.0 = Some(event.id);
        spawn_panel(&mut commands, event.screen_pos, task.completed);
    }
}

fn close_panel(
    commands: &mut Commands,
    panels: &Query<Entity, With<ActionPanelRoot>>,
    selected: &mut SelectedCard,
) {
    for panel in panels {
        commands.entity(panel).despawn();
    }
    selected.0 = None;
}

fn spawn_panel(commands: &mut Commands, screen_pos: Vec2, completed: bool) {
    commands
        .spawn((
            ActionPanelRoot,
            Name::new("ActionPanel"),
            BackgroundColor(Color::srgba(0.08, 0.09, 0.14, 0.92)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(screen_pos.x + 90.0),
                top: Val::Px(screen_pos.y - 50.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
        ))
        .with_children(|panel| {
            let toggle_label = if completed { "Reopen" } else { "Complete" };
            for (action, label, bg) in [
                (
                    ActionButton::ToggleComplete,
                    toggle_label,
                    Color::srgb(0.16, 0.3, 0.2),
                ),
                (ActionButton::Edit, "Edit", Color::srgb(0.18, 0.2, 0.3)),
                (ActionButton::Delete, "Delete", Color::srgb(0.3, 0.12, 0.12)),
            ] {
                panel
                    .spawn((
                        action,
                        Button,
                        BackgroundColor(bg),
                        Node {
                            width: Val::Px(110.0),
                            height: Val::Px(28.0),
                            display: Display::Flex,
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            ..default()
                        },
                    ))
                    .with_children(|btn| {
                        btn.spawn((
                            Text::new(label),
                            TextFont {
                                font_size: 14.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.9, 0.92, 1.0)),
                        ));
                    });
            }
        });
}

pub fn handle_action_buttons(
    mut commands: Commands,
    buttons: Query<(&Interaction, &ActionButton), (Changed<Interaction>, With<Button>)>,
    mut store: ResMut<TaskStore>,
    mut selected: ResMut<SelectedCard>,
    mut form: ResMut<InputForm>,
    panels: Query<Entity, With<ActionPanelRoot>>,
) {
    for (interaction, action) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let Some(id) = selected.0 else {
            continue;
        };
        match action {
            ActionButton::ToggleComplete => {
                if let Err(e) = store.toggle_complete(id) {
                    warn!("toggle failed: {e}");
                }
            }
            ActionButton::Edit => {
                let current = store.get(id).map(|t| t.title.clone()).unwrap_or_default();
                form.open(FormMode::Edit(id), current);
            }
            ActionButton::Delete => {
                store.delete(id);
            }
        }
        for panel in &panels {
            commands.entity(panel).despawn();
        }
        selected.0 = None;
    }
}

/// A delete arriving from anywhere closes a panel pointing at the dead task.
pub fn close_panel_on_delete(
    mut commands: Commands,
    mut events: EventReader<StoreEvent>,
    mut selected: ResMut<SelectedCard>,
    panels: Query<Entity, With<ActionPanelRoot>>,
) {
    for event in events.read() {
        let StoreEvent::Deleted { id, .. } = event else {
            continue;
        };
        if selected.0 == Some(*id) {
            for panel in &panels {
                commands.entity(panel).despawn();
            }
            selected.0 = None;
        }
    }
}
