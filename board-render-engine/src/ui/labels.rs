//! Screen-space title labels that shadow card positions.
//!
//! Labels are plain UI text nodes repositioned every frame from the card's
//! projected world position, so they stay legible regardless of card depth.

use bevy::prelude::*;

use crate::board::card::TaskCard;
use crate::engine::camera::world_to_screen;

const LABEL_WORLD_OFFSET: Vec3 = Vec3::new(0.0, -1.05, 0.0);

const LABEL_COLOR: Color = Color::srgba(0.85, 0.95, 1.0, 0.9);
const LABEL_DONE_COLOR: Color = Color::srgba(0.45, 0.52, 0.58, 0.7);

#[derive(Component)]
pub struct CardLabel;

pub fn spawn_label(commands: &mut Commands, title: &str, completed: bool) -> Entity {
    commands
        .spawn((
            CardLabel,
            Text::new(title),
            TextFont {
                font_size: 14.0,
                ..default()
            },
            TextColor(if completed { LABEL_DONE_COLOR } else { LABEL_COLOR }),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(-1000.0),
                top: Val::Px(-1000.0),
                ..default()
            },
        ))
        .id()
}

pub fn set_label_text(labels: &mut Query<&mut Text, With<CardLabel>>, label: Entity, title: &str) {
    if let Ok(mut text) = labels.get_mut(label) {
        text.0 = title.to_owned();
    }
}

/// Applied synchronously on completion toggle, outside the tween.
pub fn set_label_done(
    colors: &mut Query<&mut TextColor, With<CardLabel>>,
    label: Entity,
    done: bool,
) {
    if let Ok(mut color) = colors.get_mut(label) {
        color.0 = if done { LABEL_DONE_COLOR } else { LABEL_COLOR };
    }
}

/// Re-project every label under its card each frame. Tolerates cards mid
/// despawn: a missing side just leaves the label where it was for the frame.
pub fn follow_cards(
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    cards: Query<(&TaskCard, &GlobalTransform)>,
    mut labels: Query<&mut Node, With<CardLabel>>,
) {
    let Ok((camera, cam_transform)) = cameras.single() else {
        return;
    };
    for (card, transform) in &cards {
        let Ok(mut node) = labels.get_mut(card.label) else {
            continue;
        };
        let Some(screen) = world_to_screen(
            camera,
            cam_transform,
            transform.translation() + LABEL_WORLD_OFFSET,
        ) else {
            continue;
        };
        node.left = Val::Px(screen.x - 60.0);
        node.top = Val::Px(screen.y);
    }
}
