//! Identity→entity registry synchronized to store events.
//!
//! The registry is the sole owner of card entity lifecycle: only the systems
//! in this module create or destroy entries. Everything else reads through
//! the accessors. Event reactions run in a fixed chain each frame, so one
//! store mutation is fully reflected in the scene before the next is
//! considered.

use std::collections::HashMap;

use bevy::prelude::*;

use constants::animation::RECONSTRUCT_STAGGER;
use constants::card::SPAWN_EMISSIVE;
use constants::feedback::BURST_COUNT_DELETE;
use constants::layout::PARKED_DEPTH;

use super::card::{CardAppearance, CardAssets, TaskCard, card_material};
use super::transitions::{
    self, ENTRANCE_SCALE, clear_all_tweens, entrance_start, play_entrance, play_exit,
    play_filter_move, play_reposition,
};
use super::tween::{TweenDone, TweenFinished};
use crate::engine::core::app_state::AppState;
use crate::engine::layout::{slot_position, slot_positions};
use crate::feedback::{BurstEvent, BurstKind, PendingBurst};
use crate::store::{StoreEvent, Task, TaskId, TaskStore};
use crate::ui::labels::{self, spawn_label};

/// The one task↔card mapping. Insertions and removals happen only in this
/// module; a card entity never outlives its task except during the exit
/// transition window (when it is already unregistered).
#[derive(Resource, Default)]
pub struct VisualRegistry {
    map: HashMap<TaskId, Entity>,
}

impl VisualRegistry {
    pub fn insert(&mut self, id: TaskId, entity: Entity) {
        self.map.insert(id, entity);
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Entity> {
        self.map.remove(&id)
    }

    pub fn get(&self, id: TaskId) -> Option<Entity> {
        self.map.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.map.values().copied()
    }
}

/// Id of the card a drag gesture has already placed visually; the next
/// reorder reaction skips it instead of fighting the snap animation.
#[derive(Resource, Default)]
pub struct DragPlaced(pub Option<TaskId>);

/// Hint shown over an empty board until the first task arrives.
#[derive(Component)]
pub struct EmptyStateHint;

pub fn spawn_empty_hint(commands: &mut Commands) {
    commands.spawn((
        EmptyStateHint,
        Text::new("Press N to add your first task"),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::srgba(0.6, 0.8, 1.0, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(38.0),
            top: Val::Percent(47.0),
            ..default()
        },
    ));
}

/// Slow opacity pulse on the empty-board hint.
pub fn pulse_empty_hint(
    time: Res<Time>,
    mut hints: Query<&mut TextColor, With<EmptyStateHint>>,
) {
    for mut color in &mut hints {
        let alpha = 0.6 + 0.3 * (time.elapsed_secs() * 2.0).sin();
        color.0 = color.0.with_alpha(alpha);
    }
}

fn spawn_card(
    commands: &mut Commands,
    registry: &mut VisualRegistry,
    materials: &mut Assets<StandardMaterial>,
    assets: &CardAssets,
    task: &Task,
    position: Vec3,
) -> Entity {
    let label = spawn_label(commands, &task.title, task.completed);
    let mut appearance = CardAppearance::for_task(task);
    appearance.emissive_intensity = SPAWN_EMISSIVE;
    let entity = commands
        .spawn((
            TaskCard { id: task.id, label },
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(materials.add(card_material(task.completed))),
            Transform::from_translation(position).with_scale(Vec3::splat(ENTRANCE_SCALE)),
            appearance,
        ))
        .id();
    registry.insert(task.id, entity);
    entity
}

/// Reposition every registered card to its slot in the full task list,
/// optionally excluding one id that is being placed by another transition.
fn reposition_all(
    commands: &mut Commands,
    registry: &VisualRegistry,
    tasks: &[Task],
    skip: Option<TaskId>,
) {
    let positions = slot_positions(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        if Some(task.id) == skip {
            continue;
        }
        let Some(entity) = registry.get(task.id) else {
            continue;
        };
        play_reposition(commands, entity, positions[i]);
    }
}

// ── Startup / reconstruction ────────────────────────────────────────────

pub fn begin_reconstruction(mut next: ResMut<NextState<AppState>>) {
    next.set(AppState::Reconstructing);
}

/// Stream persisted tasks back into the scene with a staggered entrance.
pub fn reconstruct_scene(
    mut commands: Commands,
    mut registry: ResMut<VisualRegistry>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    assets: Res<CardAssets>,
    store: Res<TaskStore>,
    mut next: ResMut<NextState<AppState>>,
) {
    let tasks = store.tasks();
    if tasks.is_empty() {
        spawn_empty_hint(&mut commands);
    } else {
        let positions = slot_positions(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            let entity = spawn_card(
                &mut commands,
                &mut registry,
                &mut materials,
                &assets,
                task,
                entrance_start(positions[i]),
            );
            play_entrance(
                &mut commands,
                entity,
                positions[i],
                i as f32 * RECONSTRUCT_STAGGER,
                CardAppearance::for_task(task).resting_emissive(),
            );
        }
        info!("reconstructed {} card(s) from persisted board", tasks.len());
    }
    next.set(AppState::Running);
}

// ── Store event reactions ───────────────────────────────────────────────

pub fn handle_added(
    mut events: EventReader<StoreEvent>,
    mut commands: Commands,
    mut registry: ResMut<VisualRegistry>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    assets: Res<CardAssets>,
    store: Res<TaskStore>,
    hints: Query<Entity, With<EmptyStateHint>>,
) {
    for event in events.read() {
        let StoreEvent::Added(task) = event else {
            continue;
        };
        for hint in &hints {
            commands.entity(hint).despawn();
        }
        let tasks = store.tasks();
        let index = tasks
            .iter()
            .position(|t| t.id == task.id)
            .unwrap_or(tasks.len().saturating_sub(1));
        let target = slot_position(index, tasks.len());

        let entity = spawn_card(
            &mut commands,
            &mut registry,
            &mut materials,
            &assets,
            task,
            entrance_start(target),
        );
        play_entrance(
            &mut commands,
            entity,
            target,
            0.0,
            CardAppearance::for_task(task).resting_emissive(),
        );
        // The entering card has its own flight path; everyone else reflows.
        reposition_all(&mut commands, &registry, &tasks, Some(task.id));

        commands.spawn(PendingBurst::new(0.3, target, BurstKind::Add));
    }
}

pub fn handle_completion(
    mut events: EventReader<StoreEvent>,
    mut commands: Commands,
    registry: Res<VisualRegistry>,
    cards: Query<&TaskCard>,
    mut label_colors: Query<&mut TextColor, With<labels::CardLabel>>,
) {
    for event in events.read() {
        let (task, completing) = match event {
            StoreEvent::Completed(task) => (task, true),
            StoreEvent::Uncompleted(task) => (task, false),
            _ => continue,
        };
        // Defensive: a delete in the same frame may have raced us.
        let Some(entity) = registry.get(task.id) else {
            continue;
        };
        transitions::play_completion(&mut commands, entity, completing);
        // The label style flips immediately, outside the tween.
        if let Ok(card) = cards.get(entity) {
            labels::set_label_done(&mut label_colors, card.label, completing);
        }
    }
}

pub fn handle_edited(
    mut events: EventReader<StoreEvent>,
    mut commands: Commands,
    registry: Res<VisualRegistry>,
    cards: Query<(&TaskCard, &CardAppearance)>,
    mut label_texts: Query<&mut Text, With<labels::CardLabel>>,
) {
    for event in events.read() {
        let StoreEvent::Edited(task) = event else {
            continue;
        };
        let Some(entity) = registry.get(task.id) else {
            continue;
        };
        let Ok((card, appearance)) = cards.get(entity) else {
            continue;
        };
        labels::set_label_text(&mut label_texts, card.label, &task.title);
        transitions::play_edit_wobble(&mut commands, entity, appearance.resting_emissive());
    }
}

pub fn handle_deleted(
    mut events: EventReader<StoreEvent>,
    mut commands: Commands,
    mut registry: ResMut<VisualRegistry>,
    store: Res<TaskStore>,
    transforms: Query<&Transform>,
    mut bursts: EventWriter<BurstEvent>,
) {
    for event in events.read() {
        let StoreEvent::Deleted { id, .. } = event else {
            continue;
        };
        // Unregister before computing the new layout: the exiting card must
        // not claim a slot. This ordering is load-bearing.
        let Some(entity) = registry.remove(*id) else {
            continue;
        };
        // Stale tweens must never touch the card once its exit starts.
        clear_all_tweens(&mut commands, entity);

        if let Ok(transform) = transforms.get(entity) {
            bursts.write(BurstEvent {
                origin: transform.translation,
                kind: BurstKind::Delete,
                count: BURST_COUNT_DELETE,
            });
        }

        // Survivors start sliding while the exit plays over them.
        reposition_all(&mut commands, &registry, &store.tasks(), None);
        play_exit(&mut commands, entity, *id);
    }
}

pub fn handle_reordered(
    mut events: EventReader<StoreEvent>,
    mut commands: Commands,
    registry: Res<VisualRegistry>,
    mut drag_placed: ResMut<DragPlaced>,
) {
    for event in events.read() {
        let StoreEvent::Reordered(tasks) = event else {
            continue;
        };
        let skip = drag_placed.0.take();
        reposition_all(&mut commands, &registry, tasks, skip);
    }
}

pub fn handle_filter_changed(
    mut events: EventReader<StoreEvent>,
    mut commands: Commands,
    registry: Res<VisualRegistry>,
    store: Res<TaskStore>,
    transforms: Query<&Transform>,
) {
    for event in events.read() {
        let StoreEvent::FilterChanged(_) = event else {
            continue;
        };
        let visible = store.filtered_tasks();
        let positions = slot_positions(visible.len());
        for (i, task) in visible.iter().enumerate() {
            if let Some(entity) = registry.get(task.id) {
                play_filter_move(&mut commands, entity, positions[i], true);
            }
        }
        // Cards the filter hides are parked behind the grid, not destroyed;
        // they come back when the filter changes again.
        for task in store.tasks() {
            if visible.iter().any(|t| t.id == task.id) {
                continue;
            }
            let Some(entity) = registry.get(task.id) else {
                continue;
            };
            let Ok(current) = transforms.get(entity) else {
                continue;
            };
            let parked = Vec3::new(current.translation.x, current.translation.y, PARKED_DEPTH);
            play_filter_move(&mut commands, entity, parked, false);
        }
    }
}

// ── Tween completion reactions ──────────────────────────────────────────

/// Flip the material style at the moment the completion transition lands.
pub fn apply_style_changes(
    mut finished: EventReader<TweenFinished>,
    mut appearances: Query<&mut CardAppearance>,
) {
    for event in finished.read() {
        let TweenDone::ApplyStyle { completed } = event.action else {
            continue;
        };
        if let Ok(mut appearance) = appearances.get_mut(event.entity) {
            appearance.completed = completed;
        }
    }
}

/// Exit transition landed: settle survivors that kept moving during the exit
/// window, then despawn the card and release its per-instance material. The
/// shared card mesh handle is owned by `CardAssets` and is never released
/// here.
pub fn finish_exits(
    mut finished: EventReader<TweenFinished>,
    mut commands: Commands,
    registry: Res<VisualRegistry>,
    store: Res<TaskStore>,
    cards: Query<&TaskCard>,
    material_handles: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for event in finished.read() {
        let TweenDone::CardExited(_) = event.action else {
            continue;
        };
        reposition_all(&mut commands, &registry, &store.tasks(), None);

        if let Ok(card) = cards.get(event.entity) {
            commands.entity(card.label).despawn();
        }
        if let Ok(handle) = material_handles.get(event.entity) {
            materials.remove(&handle.0);
        }
        commands.entity(event.entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    #[test]
    fn registry_tracks_insert_and_remove() {
        let mut registry = VisualRegistry::default();
        let a = TaskId::new();
        let b = TaskId::new();
        registry.insert(a, fake_entity(1));
        registry.insert(b, fake_entity(2));
        assert_eq!(registry.len(), 2);

        // Deleting removes exactly one entry.
        let removed = registry.remove(a);
        assert_eq!(removed, Some(fake_entity(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(a), None);
        assert_eq!(registry.get(b), Some(fake_entity(2)));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = VisualRegistry::default();
        let id = TaskId::new();
        registry.insert(id, fake_entity(7));
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn reinsert_overwrites_stale_entity() {
        let mut registry = VisualRegistry::default();
        let id = TaskId::new();
        registry.insert(id, fake_entity(1));
        registry.insert(id, fake_entity(2));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id), Some(fake_entity(2)));
    }
}
