//! Card entities: the live 3D representation of one task.
//!
//! The rounded card body mesh is shared across every card and owned by
//! [`CardAssets`]; each card owns only its `StandardMaterial` instance, which
//! is released exactly once when the exit transition confirms destruction.

use bevy::prelude::*;

use constants::card::{ACTIVE_STYLE, CARD_SIZE, COMPLETED_STYLE, CardStyleParams};

use crate::store::{Task, TaskId};

/// Shared geometry handles. Never released per-card.
#[derive(Resource)]
pub struct CardAssets {
    pub mesh: Handle<Mesh>,
}

pub fn init_card_assets(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let mesh = meshes.add(Cuboid::new(CARD_SIZE.x, CARD_SIZE.y, CARD_SIZE.z));
    commands.insert_resource(CardAssets { mesh });
}

/// Marker + identity for a card entity. `label` is the screen-space text
/// overlay entity that shadows this card.
#[derive(Component)]
pub struct TaskCard {
    pub id: TaskId,
    pub label: Entity,
}

/// Mutable appearance state the tween channels write through. A sync system
/// pushes changed values into the card's material once per frame.
#[derive(Component)]
pub struct CardAppearance {
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub completed: bool,
}

impl CardAppearance {
    pub fn for_task(task: &Task) -> Self {
        let style = style_params(task.completed);
        Self {
            emissive_intensity: style.emissive_intensity,
            opacity: 1.0,
            completed: task.completed,
        }
    }

    /// Resting emissive level for the card's current style.
    pub fn resting_emissive(&self) -> f32 {
        style_params(self.completed).emissive_intensity
    }
}

pub fn style_params(completed: bool) -> CardStyleParams {
    if completed { COMPLETED_STYLE } else { ACTIVE_STYLE }
}

/// Fresh per-instance material for a card in the given style.
pub fn card_material(completed: bool) -> StandardMaterial {
    let style = style_params(completed);
    StandardMaterial {
        base_color: style.base_color,
        emissive: style.emissive_color * style.emissive_intensity,
        specular_transmission: style.transmission,
        thickness: 0.5,
        perceptual_roughness: 0.05,
        metallic: 0.0,
        alpha_mode: AlphaMode::Blend,
        ..default()
    }
}

/// Push changed appearance state into the per-card material.
pub fn sync_card_materials(
    mut materials: ResMut<Assets<StandardMaterial>>,
    cards: Query<
        (&MeshMaterial3d<StandardMaterial>, &CardAppearance),
        Changed<CardAppearance>,
    >,
) {
    for (handle, appearance) in &cards {
        let Some(material) = materials.get_mut(&handle.0) else {
            continue;
        };
        let style = style_params(appearance.completed);
        material.emissive = style.emissive_color * appearance.emissive_intensity;
        material.base_color = style.base_color.with_alpha(appearance.opacity);
        material.specular_transmission = style.transmission;
    }
}
