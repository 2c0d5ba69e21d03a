//! Bottom filter bar: All / Active / Done.

use bevy::prelude::*;

use crate::store::{Filter, TaskStore};

const BUTTON_BG: Color = Color::srgb(0.14, 0.16, 0.22);
const BUTTON_BG_ACTIVE: Color = Color::srgb(0.24, 0.32, 0.52);

#[derive(Component)]
pub struct FilterBarButton(pub Filter);

pub fn spawn_filter_bar(mut commands: Commands) {
    commands
        .spawn((
            Name::new("FilterBar"),
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(18.0),
                left: Val::Percent(0.0),
                width: Val::Percent(100.0),
                display: Display::Flex,
                justify_content: JustifyContent::Center,
                column_gap: Val::Px(10.0),
                ..default()
            },
        ))
        .with_children(|bar| {
            for (filter, label) in [
                (Filter::All, "All"),
                (Filter::Active, "Active"),
                (Filter::Done, "Done"),
            ] {
                bar.spawn((
                    FilterBarButton(filter),
                    Button,
                    BackgroundColor(BUTTON_BG),
                    BorderColor(Color::srgba(0.4, 0.5, 0.9, 0.35)),
                    Node {
                        width: Val::Px(84.0),
                        height: Val::Px(32.0),
                        display: Display::Flex,
                        align_items: AlignItems::Center,
                        justify_content: JustifyContent::Center,
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                ))
                .with_children(|btn| {
                    btn.spawn((
                        Text::new(label),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.85, 0.9, 1.0)),
                    ));
                });
            }
        });
}

pub fn handle_filter_buttons(
    mut store: ResMut<TaskStore>,
    buttons: Query<(&Interaction, &FilterBarButton), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed && store.filter() != button.0 {
            store.set_filter(button.0);
        }
    }
}

/// Highlight whichever filter the store currently holds.
pub fn reflect_active_filter(
    store: Res<TaskStore>,
    mut buttons: Query<(&FilterBarButton, &mut BackgroundColor)>,
) {
    if !store.is_changed() {
        return;
    }
    for (button, mut bg) in &mut buttons {
        *bg = BackgroundColor(if button.0 == store.filter() {
            BUTTON_BG_ACTIVE
        } else {
            BUTTON_BG
        });
    }
}
