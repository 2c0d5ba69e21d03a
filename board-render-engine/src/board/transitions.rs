//! Named card transitions, each expressed as tween channel inserts.
//!
//! Inserting over an existing channel of the same property is the
//! cancellation mechanism; see `tween.rs`.

use bevy::prelude::*;

use constants::animation::{
    COMPLETE_DURATION, CREATE_DURATION, DELETE_DURATION, DRAG_CANCEL_DURATION,
    DRAG_SNAP_DURATION, EDIT_DURATION, FILTER_PARK_DURATION, GHOST_NUDGE_DURATION,
    REFLOW_DURATION,
};
use constants::card::COMPLETE_EMISSIVE_PEAK;
use constants::layout::DRAG_LIFT;

use super::card::style_params;
use super::tween::{
    Channel, Ease, EmissiveTween, FadeTween, LiftTween, PositionTween, ScaleTween, SpinTween,
    TweenDone,
};
use crate::store::TaskId;

/// Where a freshly spawned card starts relative to its slot: low and far off
/// to the right, at a tenth of its size.
pub fn entrance_start(target: Vec3) -> Vec3 {
    target + Vec3::new(15.0, -8.0, 0.0)
}

pub const ENTRANCE_SCALE: f32 = 0.1;

/// Entrance: fly in from off-grid with back-out overshoot while the spawn
/// flare decays to the resting glow for the card's style. `delay` staggers
/// reconstruction.
pub fn play_entrance(
    commands: &mut Commands,
    entity: Entity,
    target: Vec3,
    delay: f32,
    resting: f32,
) {
    commands.entity(entity).insert((
        PositionTween(Channel::to(target, CREATE_DURATION, Ease::OutBack).delayed(delay)),
        ScaleTween(Channel::to(Vec3::ONE, CREATE_DURATION, Ease::OutBack).delayed(delay)),
        EmissiveTween(
            Channel::to(resting, 0.4, Ease::OutQuad).delayed(delay + CREATE_DURATION - 0.3),
        ),
    ));
}

/// Completion flash: scale punch with an elastic settle and an emissive spike
/// that decays into the completed glow. The material style itself only flips
/// when the emissive channel finishes. Uncompleting eases straight back.
pub fn play_completion(commands: &mut Commands, entity: Entity, completing: bool) {
    if completing {
        let floor = style_params(true).emissive_intensity;
        commands.entity(entity).insert((
            ScaleTween(
                Channel::to(Vec3::splat(1.2), 0.15, Ease::OutQuad)
                    .then_after(0.05, Vec3::ONE, 0.4, Ease::OutElastic),
            ),
            EmissiveTween(
                Channel::to(COMPLETE_EMISSIVE_PEAK, 0.1, Ease::Linear)
                    .then(floor, COMPLETE_DURATION * 0.6, Ease::OutQuad)
                    .on_finish(TweenDone::ApplyStyle { completed: true }),
            ),
        ));
    } else {
        let resting = style_params(false).emissive_intensity;
        commands.entity(entity).insert(EmissiveTween(
            Channel::to(resting, 0.4, Ease::OutQuad)
                .on_finish(TweenDone::ApplyStyle { completed: false }),
        ));
    }
}

/// Exit: anisotropic flatten while fading out, with a brief flare. The
/// `CardExited` action triggers despawn and resource release.
pub fn play_exit(commands: &mut Commands, entity: Entity, id: TaskId) {
    commands.entity(entity).insert((
        ScaleTween(Channel::to(
            Vec3::new(2.5, 2.5, 0.05),
            DELETE_DURATION,
            Ease::InCubic,
        )),
        FadeTween(
            Channel::to(0.0, DELETE_DURATION, Ease::InQuad)
                .on_finish(TweenDone::CardExited(id)),
        ),
        EmissiveTween(Channel::to(1.5, 0.1, Ease::Linear)),
    ));
}

/// Attention wobble after an edit: quick yoyo roll plus an emissive pulse.
pub fn play_edit_wobble(commands: &mut Commands, entity: Entity, resting_emissive: f32) {
    // Six yoyo swings spread evenly across the edit transition.
    let step = EDIT_DURATION / 6.0;
    let mut spin = Channel::to(Vec3::new(0.0, 0.0, 0.2), step, Ease::Linear);
    for i in 0..5 {
        let z = if i % 2 == 0 { 0.0 } else { 0.2 };
        spin = spin.then(Vec3::new(0.0, 0.0, z), step, Ease::Linear);
    }
    commands.entity(entity).insert((
        SpinTween::new(spin, Vec3::ZERO),
        EmissiveTween(
            Channel::to(1.5, 0.1, Ease::Linear)
                .then_after(0.1, resting_emissive, 0.3, Ease::OutQuad),
        ),
    ));
}

/// Generic reposition: fixed duration regardless of distance so simultaneous
/// reflows stay visually synchronized.
pub fn play_reposition(commands: &mut Commands, entity: Entity, slot: Vec3) {
    commands
        .entity(entity)
        .insert(PositionTween(Channel::to(slot, REFLOW_DURATION, Ease::OutQuart)));
}

/// Filter move: slide to `target`, brightening into view or dimming into the
/// parked depth.
pub fn play_filter_move(commands: &mut Commands, entity: Entity, target: Vec3, visible: bool) {
    let (move_duration, glow_duration) = if visible {
        (REFLOW_DURATION, 0.4)
    } else {
        (FILTER_PARK_DURATION, FILTER_PARK_DURATION)
    };
    let glow = if visible {
        style_params(false).emissive_intensity
    } else {
        0.02
    };
    commands.entity(entity).insert((
        PositionTween(Channel::to(target, move_duration, Ease::OutCubic)),
        EmissiveTween(Channel::to(glow, glow_duration, Ease::OutQuad)),
    ));
}

/// Drag pickup: lift along depth and tilt, leaving x/y to pointer tracking.
pub fn play_drag_lift(commands: &mut Commands, entity: Entity, from_z: f32, current_euler: Vec3) {
    commands.entity(entity).insert((
        LiftTween(Channel::to(from_z + DRAG_LIFT, 0.2, Ease::OutQuad)),
        SpinTween::new(
            Channel::to(Vec3::new(0.1, 0.0, 0.0), 0.2, Ease::OutQuad),
            current_euler,
        ),
    ));
}

/// Drag release: pronounced overshoot-then-settle into the resolved slot,
/// untilting on the way down.
pub fn play_drag_snap(commands: &mut Commands, entity: Entity, slot: Vec3, rest_z: f32) {
    commands.entity(entity).insert((
        PositionTween(Channel::to(
            Vec3::new(slot.x, slot.y, rest_z),
            DRAG_SNAP_DURATION,
            Ease::OutElastic,
        )),
        SpinTween::new(
            Channel::to(Vec3::ZERO, DRAG_CANCEL_DURATION, Ease::OutQuad),
            Vec3::new(0.1, 0.0, 0.0),
        ),
    ));
}

/// Drag cancel: return to the exact pre-drag position, no reorder.
pub fn play_drag_cancel(commands: &mut Commands, entity: Entity, pre_pos: Vec3) {
    commands.entity(entity).insert((
        PositionTween(Channel::to(pre_pos, DRAG_CANCEL_DURATION, Ease::OutQuad)),
        SpinTween::new(
            Channel::to(Vec3::ZERO, DRAG_CANCEL_DURATION, Ease::OutQuad),
            Vec3::new(0.1, 0.0, 0.0),
        ),
    ));
}

/// Short nudge for the ghost swap preview and its restore.
pub fn play_ghost_nudge(commands: &mut Commands, entity: Entity, target: Vec3) {
    commands
        .entity(entity)
        .insert(PositionTween(Channel::to(target, GHOST_NUDGE_DURATION, Ease::OutQuad)));
}

/// Remove every channel currently animating the entity. Used right before an
/// exit transition so a stale tween can never touch a released card.
pub fn clear_all_tweens(commands: &mut Commands, entity: Entity) {
    commands.entity(entity).remove::<(
        PositionTween,
        LiftTween,
        ScaleTween,
        SpinTween,
        EmissiveTween,
        FadeTween,
    )>();
}

#[cfg(test)]
mod tests {
    use bevy::ecs::world::CommandQueue;

    use super::*;

    #[test]
    fn edit_wobble_fills_the_edit_window() {
        let mut world = World::new();
        let entity = world.spawn(Transform::default()).id();
        let mut queue = CommandQueue::default();
        {
            let mut commands = Commands::new(&mut queue, &world);
            play_edit_wobble(&mut commands, entity, 0.3);
        }
        queue.apply(&mut world);

        let mut spin = world.get_mut::<SpinTween>(entity).unwrap();
        let mut euler = spin.euler;
        // Just short of the edit window the roll is still going.
        assert!(spin.channel.advance(&mut euler, EDIT_DURATION - 0.01).is_none());
        assert!(euler.z.abs() > 1e-4);
        // The last swing ends level with the window.
        assert!(spin.channel.advance(&mut euler, 0.02).is_some());
        assert!(euler.z.abs() < 1e-6);
    }
}
