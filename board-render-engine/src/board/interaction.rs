//! Pointer-driven hover/select/drag state machine.
//!
//! The pointer phase is a single tagged-union resource, so states like
//! "dragging while still pending" cannot exist. Card picking raycasts the
//! cursor against card bounds with the slab method; dragging projects the
//! cursor ray onto the lifted card plane for 1:1 tracking, with a ghost
//! nudge previewing the slot swap.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use constants::animation::PRESS_HOLD_THRESHOLD;
use constants::card::{CARD_SIZE, HOVER_EMISSIVE};
use constants::layout::{DRAG_LIFT, GHOST_OFFSET_X, GHOST_OFFSET_Y};

use super::card::{CardAppearance, TaskCard};
use super::registry::{DragPlaced, VisualRegistry};
use super::transitions::{
    play_drag_cancel, play_drag_lift, play_drag_snap, play_ghost_nudge,
};
use super::tween::{Channel, Ease, EmissiveTween};
use crate::engine::camera::world_to_screen;
use crate::engine::layout::{nearest_slot, slot_positions};
use crate::store::{Task, TaskId, TaskStore};

// ── State ───────────────────────────────────────────────────────────────

/// One other card temporarily displaced to preview the prospective swap.
pub struct GhostShift {
    pub id: TaskId,
    pub entity: Entity,
    /// The occupant's true slot position, restored when the preview moves on.
    pub base: Vec3,
}

pub struct DragSession {
    pub id: TaskId,
    pub entity: Entity,
    pub pre_pos: Vec3,
    pub nearest: Option<usize>,
    pub ghost: Option<GhostShift>,
}

/// Pointer phase. Secondary-button input never touches this machine.
#[derive(Resource, Default)]
pub enum PointerState {
    #[default]
    Idle,
    /// Primary button is down over a card, hold threshold not yet met.
    PendingDrag {
        id: TaskId,
        entity: Entity,
        pre_pos: Vec3,
        hold: Timer,
    },
    Dragging(DragSession),
    /// A drag just ended; the trailing click is swallowed exactly once.
    Suppressed,
}

#[derive(Resource, Default)]
pub struct HoverState(pub Option<Entity>);

#[derive(Event)]
pub struct HoverEntered(pub Entity);

#[derive(Event)]
pub struct HoverExited(pub Entity);

#[derive(Event, Clone, Copy)]
pub struct CardSelected {
    pub id: TaskId,
    pub entity: Entity,
    /// Projected window position of the card, for overlay UI placement.
    pub screen_pos: Vec2,
}

#[derive(Event)]
pub struct CardDeselected;

// ── Picking math ────────────────────────────────────────────────────────

/// Slab-method ray test against a card's oriented bounds.
pub fn ray_hits_card(origin: Vec3, dir: Vec3, xf: &GlobalTransform, size: Vec3) -> Option<f32> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    let he = size * 0.5;
    ray_aabb_hit_t(o_local, d_local, -he, he)
}

fn ray_aabb_hit_t(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = Vec3::new(
        if dir.x != 0.0 { 1.0 / dir.x } else { f32::INFINITY },
        if dir.y != 0.0 { 1.0 / dir.y } else { f32::INFINITY },
        if dir.z != 0.0 { 1.0 / dir.z } else { f32::INFINITY },
    );

    let (mut tmin, mut tmax) = ((min.x - origin.x) * inv.x, (max.x - origin.x) * inv.x);
    if tmin > tmax {
        std::mem::swap(&mut tmin, &mut tmax);
    }

    let (mut tymin, mut tymax) = ((min.y - origin.y) * inv.y, (max.y - origin.y) * inv.y);
    if tymin > tymax {
        std::mem::swap(&mut tymin, &mut tymax);
    }

    if tmin > tymax || tymin > tmax {
        return None;
    }
    tmin = tmin.max(tymin);
    tmax = tmax.min(tymax);

    let (mut tzmin, mut tzmax) = ((min.z - origin.z) * inv.z, (max.z - origin.z) * inv.z);
    if tzmin > tzmax {
        std::mem::swap(&mut tzmin, &mut tzmax);
    }

    if tmin > tzmax || tzmin > tmax {
        return None;
    }
    tmin = tmin.max(tzmin);
    tmax = tmax.min(tzmax);

    if tmax < 0.0 {
        return None;
    }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}

/// A ghost occupant's true resting position: the slot's lateral coordinates
/// at the occupant's own depth, so a filter-parked card nudges in place
/// instead of flying forward.
fn ghost_slot_base(slot: Vec3, occupant_z: f32) -> Vec3 {
    Vec3::new(slot.x, slot.y, occupant_z)
}

/// Intersection of a ray with the lateral plane at `plane_z`.
pub fn drag_plane_point(origin: Vec3, dir: Vec3, plane_z: f32) -> Option<Vec3> {
    if dir.z.abs() < 1e-6 {
        return None;
    }
    let t = (plane_z - origin.z) / dir.z;
    (t > 0.0).then(|| origin + dir * t)
}

fn cursor_ray(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera3d>>,
) -> Option<(Vec3, Vec3)> {
    let window = windows.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, cam_xf) = cameras.single().ok()?;
    let ray = camera.viewport_to_world(cam_xf, cursor).ok()?;
    Some((ray.origin, ray.direction.as_vec3()))
}

/// Closest card under the cursor, if any.
fn pick_card(
    origin: Vec3,
    dir: Vec3,
    cards: &Query<(Entity, &GlobalTransform, &TaskCard)>,
) -> Option<(Entity, TaskId)> {
    let mut best: Option<(Entity, TaskId, f32)> = None;
    for (entity, xf, card) in cards.iter() {
        if let Some(t) = ray_hits_card(origin, dir, xf, CARD_SIZE) {
            if t > 0.0 && best.is_none_or(|(_, _, bt)| t < bt) {
                best = Some((entity, card.id, t));
            }
        }
    }
    best.map(|(e, id, _)| (e, id))
}

// ── Systems ─────────────────────────────────────────────────────────────

/// Hover tracking. Exit fires before enter when the hit changes; a miss
/// fires only exit. Skipped entirely while dragging.
pub fn hover_system(
    state: Res<PointerState>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    cards: Query<(Entity, &GlobalTransform, &TaskCard)>,
    mut hover: ResMut<HoverState>,
    mut entered: EventWriter<HoverEntered>,
    mut exited: EventWriter<HoverExited>,
) {
    if matches!(*state, PointerState::Dragging(_)) {
        return;
    }
    let hit = cursor_ray(&windows, &cameras)
        .and_then(|(origin, dir)| pick_card(origin, dir, &cards))
        .map(|(entity, _)| entity);

    if hit != hover.0 {
        if let Some(previous) = hover.0 {
            exited.write(HoverExited(previous));
        }
        if let Some(current) = hit {
            entered.write(HoverEntered(current));
        }
        hover.0 = hit;
    }
}

/// Unified primary-button transitions: press arms a pending drag, release
/// either clicks, ends the drag, or consumes the suppression window.
pub fn pointer_button_system(
    mut commands: Commands,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    cards: Query<(Entity, &GlobalTransform, &TaskCard)>,
    transforms: Query<&Transform>,
    mut state: ResMut<PointerState>,
    mut store: ResMut<TaskStore>,
    mut drag_placed: ResMut<DragPlaced>,
    mut selected: EventWriter<CardSelected>,
    mut deselected: EventWriter<CardDeselected>,
) {
    if buttons.just_pressed(MouseButton::Left) {
        // A fresh press always clears a stale suppression window.
        if matches!(*state, PointerState::Suppressed) {
            *state = PointerState::Idle;
        }
        if matches!(*state, PointerState::Idle) {
            if let Some((entity, id)) =
                cursor_ray(&windows, &cameras).and_then(|(o, d)| pick_card(o, d, &cards))
            {
                let pre_pos = transforms
                    .get(entity)
                    .map(|t| t.translation)
                    .unwrap_or_default();
                *state = PointerState::PendingDrag {
                    id,
                    entity,
                    pre_pos,
                    hold: Timer::from_seconds(PRESS_HOLD_THRESHOLD, TimerMode::Once),
                };
            }
        }
    }

    if buttons.just_released(MouseButton::Left) {
        match std::mem::take(&mut *state) {
            PointerState::Dragging(session) => {
                end_drag(
                    &mut commands,
                    session,
                    &store.tasks(),
                    &transforms,
                    &mut store,
                    &mut drag_placed,
                );
                *state = PointerState::Suppressed;
            }
            PointerState::Suppressed => {
                // Trailing release after a drag: swallowed, exactly once.
                *state = PointerState::Idle;
            }
            PointerState::PendingDrag { .. } | PointerState::Idle => {
                // Ordinary click.
                emit_click(
                    &windows,
                    &cameras,
                    &cards,
                    &transforms,
                    &mut selected,
                    &mut deselected,
                );
            }
        }
    }
}

fn emit_click(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    cards: &Query<(Entity, &GlobalTransform, &TaskCard)>,
    transforms: &Query<&Transform>,
    selected: &mut EventWriter<CardSelected>,
    deselected: &mut EventWriter<CardDeselected>,
) {
    let hit = cursor_ray(windows, cameras).and_then(|(o, d)| pick_card(o, d, cards));
    match hit {
        Some((entity, id)) => {
            let world = transforms
                .get(entity)
                .map(|t| t.translation)
                .unwrap_or_default();
            let screen_pos = cameras
                .single()
                .ok()
                .and_then(|(camera, cam_xf)| world_to_screen(camera, cam_xf, world))
                .unwrap_or_default();
            selected.write(CardSelected { id, entity, screen_pos });
        }
        None => {
            deselected.write(CardDeselected);
        }
    }
}

/// Tick the hold threshold; on expiry the pending press becomes a drag.
pub fn hold_to_drag_system(
    time: Res<Time>,
    mut commands: Commands,
    mut state: ResMut<PointerState>,
    mut hover: ResMut<HoverState>,
) {
    let PointerState::PendingDrag { id, entity, pre_pos, hold } = &mut *state else {
        return;
    };
    if !hold.tick(time.delta()).finished() {
        return;
    }
    let (id, entity, pre_pos) = (*id, *entity, *pre_pos);
    // Drop the hover mark silently so the pickup does not fire an exit.
    hover.0 = None;
    play_drag_lift(&mut commands, entity, pre_pos.z, Vec3::ZERO);
    *state = PointerState::Dragging(DragSession {
        id,
        entity,
        pre_pos,
        nearest: None,
        ghost: None,
    });
}

/// 1:1 lateral tracking plus ghost swap preview while dragging.
pub fn drag_update_system(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    registry: Res<VisualRegistry>,
    store: Res<TaskStore>,
    mut state: ResMut<PointerState>,
    mut transforms: Query<&mut Transform>,
) {
    let PointerState::Dragging(session) = &mut *state else {
        return;
    };
    let Some((origin, dir)) = cursor_ray(&windows, &cameras) else {
        return;
    };
    let plane_z = session.pre_pos.z + DRAG_LIFT;
    if let Some(point) = drag_plane_point(origin, dir, plane_z) {
        if let Ok(mut transform) = transforms.get_mut(session.entity) {
            transform.translation.x = point.x;
            transform.translation.y = point.y;
        }
    }

    let tasks = store.tasks();
    let positions = slot_positions(tasks.len());
    let Ok(dragged) = transforms.get(session.entity) else {
        return;
    };
    let nearest = nearest_slot(dragged.translation, &positions);
    if nearest == session.nearest {
        return;
    }

    // Preview moved on: put the previously displaced occupant back first.
    if let Some(ghost) = session.ghost.take() {
        play_ghost_nudge(&mut commands, ghost.entity, ghost.base);
    }
    session.nearest = nearest;

    let Some(slot) = nearest else {
        return;
    };
    let occupant = &tasks[slot];
    if occupant.id == session.id {
        return;
    }
    if let Some(entity) = registry.get(occupant.id) {
        let Ok(occupant_xf) = transforms.get(entity) else {
            return;
        };
        let base = ghost_slot_base(positions[slot], occupant_xf.translation.z);
        session.ghost = Some(GhostShift { id: occupant.id, entity, base });
        play_ghost_nudge(
            &mut commands,
            entity,
            base + Vec3::new(GHOST_OFFSET_X, GHOST_OFFSET_Y, 0.0),
        );
    }
}

fn end_drag(
    commands: &mut Commands,
    session: DragSession,
    tasks: &[Task],
    transforms: &Query<&Transform>,
    store: &mut TaskStore,
    drag_placed: &mut DragPlaced,
) {
    let positions = slot_positions(tasks.len());

    // The displaced occupant returns to its true slot, not the nudge base,
    // in case the board moved underneath the preview. Its depth is its own.
    if let Some(ghost) = session.ghost {
        let true_slot = tasks
            .iter()
            .position(|t| t.id == ghost.id)
            .map(|i| ghost_slot_base(positions[i], ghost.base.z))
            .unwrap_or(ghost.base);
        play_ghost_nudge(commands, ghost.entity, true_slot);
    }

    let dropped_at = transforms
        .get(session.entity)
        .map(|t| t.translation)
        .unwrap_or(session.pre_pos);
    let slot = nearest_slot(dropped_at, &positions);
    let target = slot.map(|i| positions[i]).unwrap_or(session.pre_pos);
    play_drag_snap(commands, session.entity, target, session.pre_pos.z);

    if let Some(slot) = slot {
        drag_placed.0 = Some(session.id);
        store.reorder(session.id, slot);
    }
}

/// Escape aborts the drag: ghost and card return to where they started and
/// no reorder is committed.
pub fn drag_cancel_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<PointerState>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }
    if !matches!(*state, PointerState::Dragging(_)) {
        return;
    }
    let PointerState::Dragging(session) = std::mem::take(&mut *state) else {
        return;
    };
    if let Some(ghost) = session.ghost {
        play_ghost_nudge(&mut commands, ghost.entity, ghost.base);
    }
    play_drag_cancel(&mut commands, session.entity, session.pre_pos);
}

/// Emissive lift on hover enter, back to the style's resting level on exit.
pub fn hover_glow_system(
    mut commands: Commands,
    mut entered: EventReader<HoverEntered>,
    mut exited: EventReader<HoverExited>,
    appearances: Query<&CardAppearance>,
) {
    for HoverExited(entity) in exited.read() {
        if let Ok(appearance) = appearances.get(*entity) {
            commands.entity(*entity).insert(EmissiveTween(Channel::to(
                appearance.resting_emissive(),
                0.3,
                Ease::OutQuad,
            )));
        }
    }
    for HoverEntered(entity) in entered.read() {
        if appearances.contains(*entity) {
            commands
                .entity(*entity)
                .insert(EmissiveTween(Channel::to(HOVER_EMISSIVE, 0.15, Ease::OutQuad)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_card_head_on() {
        let xf = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 0.0));
        let t = ray_hits_card(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, &xf, CARD_SIZE);
        assert!(t.is_some());
        assert!((t.unwrap() - (10.0 - CARD_SIZE.z / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn ray_misses_beside_card() {
        let xf = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 0.0));
        let t = ray_hits_card(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z, &xf, CARD_SIZE);
        assert!(t.is_none());
    }

    #[test]
    fn ray_respects_card_translation() {
        let xf = GlobalTransform::from(Transform::from_xyz(3.4, 0.0, 0.0));
        assert!(ray_hits_card(Vec3::new(3.4, 0.0, 10.0), Vec3::NEG_Z, &xf, CARD_SIZE).is_some());
        assert!(ray_hits_card(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, &xf, CARD_SIZE).is_none());
    }

    #[test]
    fn ray_behind_origin_misses() {
        let xf = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 0.0));
        assert!(ray_hits_card(Vec3::new(0.0, 0.0, 10.0), Vec3::Z, &xf, CARD_SIZE).is_none());
    }

    #[test]
    fn drag_plane_projection() {
        let hit = drag_plane_point(Vec3::new(1.0, 2.0, 10.0), Vec3::NEG_Z, 2.0).unwrap();
        assert_eq!(hit, Vec3::new(1.0, 2.0, 2.0));
        // Ray parallel to the plane never intersects.
        assert!(drag_plane_point(Vec3::ZERO, Vec3::X, 2.0).is_none());
    }

    #[test]
    fn pointer_state_default_is_idle() {
        assert!(matches!(PointerState::default(), PointerState::Idle));
    }

    #[test]
    fn ghost_base_keeps_occupant_depth() {
        let slot = Vec3::new(3.4, -2.0, 0.0);
        let base = ghost_slot_base(slot, constants::layout::PARKED_DEPTH);
        assert_eq!(base.x, slot.x);
        assert_eq!(base.y, slot.y);
        assert_eq!(base.z, constants::layout::PARKED_DEPTH);
        // The nudge offset is purely lateral on top of that.
        let nudged = base + Vec3::new(GHOST_OFFSET_X, GHOST_OFFSET_Y, 0.0);
        assert_eq!(nudged.z, constants::layout::PARKED_DEPTH);
    }

    use std::time::Duration;

    use crate::board::tween::{TweenFinished, advance_position_tweens};
    use crate::store::persistence::MemoryStorage;

    #[test]
    fn escape_cancels_drag_and_restores_occupant() {
        let mut store = TaskStore::load(Box::new(MemoryStorage::default()));
        let dragged_task = store.add("a", "").unwrap();
        let occupant_task = store.add("b", "").unwrap();
        store.drain_events();
        let order_before: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();

        let mut app = App::new();
        app.add_event::<TweenFinished>()
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(Time::<()>::default())
            .insert_resource(store)
            .add_systems(Update, (drag_cancel_system, advance_position_tweens).chain());

        let positions = slot_positions(2);
        let pre_pos = positions[0];
        let dragged = app
            .world_mut()
            .spawn(Transform::from_translation(
                positions[1] + Vec3::new(0.3, 0.2, DRAG_LIFT),
            ))
            .id();
        let ghost_base = positions[1];
        let ghost = app
            .world_mut()
            .spawn(Transform::from_translation(
                ghost_base + Vec3::new(GHOST_OFFSET_X, GHOST_OFFSET_Y, 0.0),
            ))
            .id();
        app.insert_resource(PointerState::Dragging(DragSession {
            id: dragged_task.id,
            entity: dragged,
            pre_pos,
            nearest: Some(1),
            ghost: Some(GhostShift {
                id: occupant_task.id,
                entity: ghost,
                base: ghost_base,
            }),
        }));

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        assert!(matches!(
            *app.world().resource::<PointerState>(),
            PointerState::Idle
        ));

        // Let the return tweens run out.
        for _ in 0..40 {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_millis(16));
            app.update();
        }

        let ghost_pos = app.world().get::<Transform>(ghost).unwrap().translation;
        assert!((ghost_pos - ghost_base).length() < 1e-3, "occupant back in its slot");
        let dragged_pos = app.world().get::<Transform>(dragged).unwrap().translation;
        assert!((dragged_pos - pre_pos).length() < 1e-3, "card back where it started");

        // The cancel must not have committed any reorder.
        let order_after: Vec<TaskId> = app
            .world()
            .resource::<TaskStore>()
            .tasks()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(order_after, order_before);
    }
}
