//! Per-property tween channels for card transitions.
//!
//! Each animatable property of a card (position, scale, spin, emissive
//! intensity, opacity) carries its own channel component. Inserting a channel
//! replaces whatever was animating that property, so interruption is
//! overwrite and needs no cancellation token; channels on different
//! properties of the same entity progress concurrently. A channel is a
//! sequence of eased segments plus an optional completion action that fires
//! only when the whole channel actually finishes; an overwritten channel
//! never applies its action.

use bevy::prelude::*;

use crate::store::TaskId;

/// Easing curves, normalised t in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    Linear,
    OutQuad,
    OutCubic,
    OutQuart,
    InQuad,
    InCubic,
    /// Overshoot-then-settle, overshoot factor 1.7.
    OutBack,
    /// Springy settle with a short period.
    OutElastic,
}

impl Ease {
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InQuad => t * t,
            Self::InCubic => t * t * t,
            Self::OutBack => {
                let s = 1.7;
                let u = t - 1.0;
                1.0 + (s + 1.0) * u * u * u + s * u * u
            }
            Self::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    let p = 0.5;
                    2f32.powf(-10.0 * t) * ((t - p / 4.0) * std::f32::consts::TAU / p).sin() + 1.0
                }
            }
        }
    }
}

/// Values a channel can interpolate.
pub trait Animatable: Copy + Send + Sync + 'static {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Animatable for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// Logical state changes deferred to transition completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenDone {
    /// Swap the card material to the completed/active parameter set.
    ApplyStyle { completed: bool },
    /// Exit transition finished: settle survivors, despawn, release the
    /// card's per-instance resources.
    CardExited(TaskId),
}

/// Fired by the advance systems when a channel runs to completion.
#[derive(Event, Debug, Clone, Copy)]
pub struct TweenFinished {
    pub entity: Entity,
    pub action: TweenDone,
}

#[derive(Clone)]
struct Segment<T> {
    delay: f32,
    to: T,
    duration: f32,
    ease: Ease,
}

/// An ordered run of segments over one property. The `from` value of each
/// segment is captured from the live property the moment its delay lapses,
/// so interrupted predecessors hand over without snapping.
#[derive(Clone)]
pub struct Channel<T> {
    segments: Vec<Segment<T>>,
    index: usize,
    elapsed: f32,
    from: Option<T>,
    done: Option<TweenDone>,
}

impl<T: Animatable> Channel<T> {
    pub fn to(target: T, duration: f32, ease: Ease) -> Self {
        Self {
            segments: vec![Segment { delay: 0.0, to: target, duration, ease }],
            index: 0,
            elapsed: 0.0,
            from: None,
            done: None,
        }
    }

    /// Append a segment starting when the previous one ends.
    pub fn then(self, target: T, duration: f32, ease: Ease) -> Self {
        self.then_after(0.0, target, duration, ease)
    }

    /// Append a segment starting `delay` seconds after the previous one ends.
    pub fn then_after(mut self, delay: f32, target: T, duration: f32, ease: Ease) -> Self {
        self.segments.push(Segment { delay, to: target, duration, ease });
        self
    }

    /// Prefix the whole channel with a hold. Used for staggered entrances.
    pub fn delayed(mut self, delay: f32) -> Self {
        if let Some(first) = self.segments.first_mut() {
            first.delay += delay;
        }
        self
    }

    pub fn on_finish(mut self, done: TweenDone) -> Self {
        self.done = Some(done);
        self
    }

    /// Advance by `dt`, writing the interpolated value through `value`.
    /// Returns the completion action (possibly `None`) wrapped in `Some`
    /// exactly once, on the tick the channel finishes.
    pub fn advance(&mut self, value: &mut T, dt: f32) -> Option<Option<TweenDone>> {
        self.elapsed += dt;
        loop {
            let Some(segment) = self.segments.get(self.index) else {
                return Some(self.done.take());
            };
            if self.elapsed < segment.delay {
                return None;
            }
            let from = *self.from.get_or_insert(*value);
            let into = self.elapsed - segment.delay;
            if segment.duration <= 0.0 || into >= segment.duration {
                *value = segment.to;
                self.elapsed = (into - segment.duration).max(0.0);
                self.index += 1;
                self.from = None;
                if self.index >= self.segments.len() {
                    return Some(self.done.take());
                }
                continue;
            }
            *value = from.lerp_to(segment.to, segment.ease.sample(into / segment.duration));
            return None;
        }
    }
}

// ── Channel components ──────────────────────────────────────────────────

/// Full-translation tween. Drives reposition, entrance, snap, and park moves.
#[derive(Component)]
pub struct PositionTween(pub Channel<Vec3>);

/// Depth-only tween used for the drag lift, leaving x/y free for 1:1
/// pointer tracking.
#[derive(Component)]
pub struct LiftTween(pub Channel<f32>);

#[derive(Component)]
pub struct ScaleTween(pub Channel<Vec3>);

/// Euler-angle tween (radians, XYZ order). Keeps its own mirror of the
/// current angles since `Quat` round-trips are not stable for readback.
#[derive(Component)]
pub struct SpinTween {
    pub channel: Channel<Vec3>,
    pub euler: Vec3,
}

impl SpinTween {
    pub fn new(channel: Channel<Vec3>, current: Vec3) -> Self {
        Self { channel, euler: current }
    }
}

/// Emissive intensity tween, applied through `CardAppearance`.
#[derive(Component)]
pub struct EmissiveTween(pub Channel<f32>);

/// Opacity tween, applied through `CardAppearance`.
#[derive(Component)]
pub struct FadeTween(pub Channel<f32>);

// ── Advance systems ─────────────────────────────────────────────────────

use crate::board::card::CardAppearance;

pub fn advance_position_tweens(
    time: Res<Time>,
    mut commands: Commands,
    mut finished: EventWriter<TweenFinished>,
    mut cards: Query<(Entity, &mut Transform, &mut PositionTween)>,
) {
    for (entity, mut transform, mut tween) in &mut cards {
        if let Some(action) = tween.0.advance(&mut transform.translation, time.delta_secs()) {
            commands.entity(entity).remove::<PositionTween>();
            if let Some(action) = action {
                finished.write(TweenFinished { entity, action });
            }
        }
    }
}

pub fn advance_lift_tweens(
    time: Res<Time>,
    mut commands: Commands,
    mut cards: Query<(Entity, &mut Transform, &mut LiftTween)>,
) {
    for (entity, mut transform, mut tween) in &mut cards {
        let mut z = transform.translation.z;
        let finished = tween.0.advance(&mut z, time.delta_secs());
        transform.translation.z = z;
        if finished.is_some() {
            commands.entity(entity).remove::<LiftTween>();
        }
    }
}

pub fn advance_scale_tweens(
    time: Res<Time>,
    mut commands: Commands,
    mut finished: EventWriter<TweenFinished>,
    mut cards: Query<(Entity, &mut Transform, &mut ScaleTween)>,
) {
    for (entity, mut transform, mut tween) in &mut cards {
        if let Some(action) = tween.0.advance(&mut transform.scale, time.delta_secs()) {
            commands.entity(entity).remove::<ScaleTween>();
            if let Some(action) = action {
                finished.write(TweenFinished { entity, action });
            }
        }
    }
}

pub fn advance_spin_tweens(
    time: Res<Time>,
    mut commands: Commands,
    mut cards: Query<(Entity, &mut Transform, &mut SpinTween)>,
) {
    for (entity, mut transform, mut tween) in &mut cards {
        let mut euler = tween.euler;
        let done = tween.channel.advance(&mut euler, time.delta_secs());
        tween.euler = euler;
        transform.rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
        if done.is_some() {
            commands.entity(entity).remove::<SpinTween>();
        }
    }
}

pub fn advance_emissive_tweens(
    time: Res<Time>,
    mut commands: Commands,
    mut finished: EventWriter<TweenFinished>,
    mut cards: Query<(Entity, &mut CardAppearance, &mut EmissiveTween)>,
) {
    for (entity, mut appearance, mut tween) in &mut cards {
        let mut intensity = appearance.emissive_intensity;
        let done = tween.0.advance(&mut intensity, time.delta_secs());
        appearance.emissive_intensity = intensity;
        if let Some(action) = done {
            commands.entity(entity).remove::<EmissiveTween>();
            if let Some(action) = action {
                finished.write(TweenFinished { entity, action });
            }
        }
    }
}

pub fn advance_fade_tweens(
    time: Res<Time>,
    mut commands: Commands,
    mut finished: EventWriter<TweenFinished>,
    mut cards: Query<(Entity, &mut CardAppearance, &mut FadeTween)>,
) {
    for (entity, mut appearance, mut tween) in &mut cards {
        let mut opacity = appearance.opacity;
        let done = tween.0.advance(&mut opacity, time.delta_secs());
        appearance.opacity = opacity;
        if let Some(action) = done {
            commands.entity(entity).remove::<FadeTween>();
            if let Some(action) = action {
                finished.write(TweenFinished { entity, action });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(channel: &mut Channel<f32>, value: &mut f32, seconds: f32, step: f32) -> Option<TweenDone> {
        let mut t = 0.0;
        while t < seconds {
            if let Some(action) = channel.advance(value, step) {
                return action;
            }
            t += step;
        }
        None
    }

    #[test]
    fn easing_hits_endpoints() {
        for ease in [
            Ease::Linear,
            Ease::OutQuad,
            Ease::OutCubic,
            Ease::OutQuart,
            Ease::InQuad,
            Ease::InCubic,
            Ease::OutBack,
            Ease::OutElastic,
        ] {
            assert!((ease.sample(0.0)).abs() < 1e-5, "{ease:?} at 0");
            assert!((ease.sample(1.0) - 1.0).abs() < 1e-5, "{ease:?} at 1");
        }
    }

    #[test]
    fn back_ease_overshoots() {
        assert!(Ease::OutBack.sample(0.7) > 1.0);
    }

    #[test]
    fn channel_reaches_target() {
        let mut channel = Channel::to(10.0f32, 0.5, Ease::OutQuart);
        let mut value = 0.0;
        run(&mut channel, &mut value, 1.0, 1.0 / 60.0);
        assert!((value - 10.0).abs() < 1e-4);
    }

    #[test]
    fn fixed_duration_is_distance_independent() {
        // Two repositions started together finish on the same tick.
        let mut near = Channel::to(1.0f32, 0.5, Ease::OutQuart);
        let mut far = Channel::to(100.0f32, 0.5, Ease::OutQuart);
        let mut a = 0.0;
        let mut b = 0.0;
        let step = 1.0 / 60.0;
        loop {
            let done_near = near.advance(&mut a, step).is_some();
            let done_far = far.advance(&mut b, step).is_some();
            assert_eq!(done_near, done_far);
            if done_near {
                break;
            }
        }
    }

    #[test]
    fn delay_holds_current_value() {
        let mut channel = Channel::to(5.0f32, 0.2, Ease::Linear).delayed(0.5);
        let mut value = 1.0;
        channel.advance(&mut value, 0.3);
        assert_eq!(value, 1.0);
        run(&mut channel, &mut value, 1.0, 0.05);
        assert!((value - 5.0).abs() < 1e-4);
    }

    #[test]
    fn segments_chain_in_order() {
        let mut channel = Channel::to(2.0f32, 0.1, Ease::Linear)
            .then(0.0, 0.1, Ease::Linear)
            .then(1.0, 0.1, Ease::Linear);
        let mut value = 0.0;
        run(&mut channel, &mut value, 0.5, 0.01);
        assert!((value - 1.0).abs() < 1e-4);
    }

    #[test]
    fn completion_action_fires_exactly_once_at_the_end() {
        let mut channel = Channel::to(1.0f32, 0.1, Ease::Linear)
            .on_finish(TweenDone::ApplyStyle { completed: true });
        let mut value = 0.0;
        // Mid-flight: no action yet.
        assert!(channel.advance(&mut value, 0.05).is_none());
        let action = run(&mut channel, &mut value, 0.2, 0.05);
        assert_eq!(action, Some(TweenDone::ApplyStyle { completed: true }));
        // Ran to completion already; repeated ticks yield no second action.
        assert_eq!(channel.advance(&mut value, 0.05), Some(None));
    }

    #[test]
    fn overwritten_channel_never_applies_its_action() {
        let mut channel = Channel::to(1.0f32, 1.0, Ease::Linear)
            .on_finish(TweenDone::ApplyStyle { completed: true });
        let mut value = 0.0;
        channel.advance(&mut value, 0.3);
        // Replacement is a drop; the pending action goes with it.
        drop(channel);
        assert!(value < 1.0);
    }

    #[test]
    fn large_step_spans_multiple_segments() {
        let mut channel = Channel::to(2.0f32, 0.05, Ease::Linear).then(7.0, 0.05, Ease::Linear);
        let mut value = 0.0;
        let action = channel.advance(&mut value, 1.0);
        assert_eq!(value, 7.0);
        assert_eq!(action, Some(None));
    }

    #[test]
    fn zero_duration_segment_snaps() {
        let mut channel = Channel::to(4.0f32, 0.0, Ease::Linear);
        let mut value = 0.0;
        assert!(channel.advance(&mut value, 0.016).is_some());
        assert_eq!(value, 4.0);
    }
}
