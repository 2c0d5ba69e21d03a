//! Ambient particle field and event-driven bursts.
//!
//! A fixed pool of particles drifts with Brownian motion inside a bounding
//! sphere and leans toward the cursor. Board mutations fire short-lived
//! radial bursts at the affected card's position.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::Rng;

use constants::feedback::{
    BURST_COUNT_ADD, BURST_COUNT_COMPLETE, BURST_COUNT_DELETE, BURST_COUNT_VICTORY,
    PARTICLE_ATTRACT_RADIUS, PARTICLE_ATTRACT_STRENGTH, PARTICLE_BROWNIAN, PARTICLE_COUNT,
    PARTICLE_MAX_SPEED, PARTICLE_SPHERE_RADIUS,
};

use crate::board::interaction::drag_plane_point;
use crate::board::registry::VisualRegistry;
use crate::store::StoreEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    Add,
    Complete,
    Delete,
    Victory,
}

impl BurstKind {
    pub fn count(self) -> usize {
        match self {
            BurstKind::Add => BURST_COUNT_ADD,
            BurstKind::Complete => BURST_COUNT_COMPLETE,
            BurstKind::Delete => BURST_COUNT_DELETE,
            BurstKind::Victory => BURST_COUNT_VICTORY,
        }
    }

    fn color(self) -> LinearRgba {
        match self {
            BurstKind::Add => LinearRgba::rgb(0.3, 0.8, 2.0),
            BurstKind::Complete => LinearRgba::rgb(2.0, 1.6, 0.5),
            BurstKind::Delete => LinearRgba::rgb(2.0, 0.5, 0.3),
            BurstKind::Victory => LinearRgba::rgb(2.5, 2.2, 1.2),
        }
    }
}

#[derive(Event)]
pub struct BurstEvent {
    pub origin: Vec3,
    pub kind: BurstKind,
    pub count: usize,
}

/// A burst scheduled for later, e.g. timed to a card's arrival at its slot.
#[derive(Component)]
pub struct PendingBurst {
    timer: Timer,
    origin: Vec3,
    kind: BurstKind,
}

impl PendingBurst {
    pub fn new(delay: f32, origin: Vec3, kind: BurstKind) -> Self {
        Self {
            timer: Timer::from_seconds(delay, TimerMode::Once),
            origin,
            kind,
        }
    }
}

#[derive(Component)]
pub struct AmbientParticle {
    velocity: Vec3,
}

#[derive(Component)]
pub struct BurstParticle {
    velocity: Vec3,
    life: Timer,
    base_scale: f32,
}

#[derive(Resource)]
pub struct ParticleAssets {
    mesh: Handle<Mesh>,
}

pub fn setup_particles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Sphere::new(0.03));
    let ambient_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.6, 0.7, 1.0),
        emissive: LinearRgba::rgb(0.4, 0.5, 1.2),
        unlit: true,
        ..default()
    });

    let mut rng = rand::thread_rng();
    for _ in 0..PARTICLE_COUNT {
        let position = random_in_sphere(&mut rng) * PARTICLE_SPHERE_RADIUS;
        let velocity = random_in_sphere(&mut rng) * PARTICLE_MAX_SPEED * 0.5;
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(ambient_material.clone()),
            Transform::from_translation(position),
            AmbientParticle { velocity },
        ));
    }

    commands.insert_resource(ParticleAssets { mesh });
}

fn random_in_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if v.length_squared() <= 1.0 && v.length_squared() > 1e-4 {
            return v;
        }
    }
}

/// Brownian drift, speed clamp, sphere containment, cursor attraction.
pub fn drift_ambient_particles(
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut particles: Query<(&mut Transform, &mut AmbientParticle)>,
) {
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();

    // Cursor projected onto the board plane, when there is one.
    let attractor = windows
        .single()
        .ok()
        .and_then(|w| w.cursor_position())
        .and_then(|cursor| {
            let (camera, cam_xf) = cameras.single().ok()?;
            let ray = camera.viewport_to_world(cam_xf, cursor).ok()?;
            drag_plane_point(ray.origin, ray.direction.as_vec3(), 0.0)
        });

    for (mut transform, mut particle) in particles.iter_mut() {
        let jitter = random_in_sphere(&mut rng) * PARTICLE_BROWNIAN * dt;
        let mut velocity = particle.velocity + jitter;

        if let Some(target) = attractor {
            let offset = target - transform.translation;
            let distance = offset.length();
            if distance < PARTICLE_ATTRACT_RADIUS && distance > 1e-3 {
                let falloff = 1.0 - distance / PARTICLE_ATTRACT_RADIUS;
                velocity += offset / distance * PARTICLE_ATTRACT_STRENGTH * falloff * dt;
            }
        }

        let speed = velocity.length();
        if speed > PARTICLE_MAX_SPEED {
            velocity *= PARTICLE_MAX_SPEED / speed;
        }

        transform.translation += velocity * dt;

        // Out past the shell: steer back toward the center.
        if transform.translation.length() > PARTICLE_SPHERE_RADIUS {
            let inward = -transform.translation.normalize();
            velocity = inward * speed.max(PARTICLE_MAX_SPEED * 0.25);
        }

        particle.velocity = velocity;
    }
}

/// Delayed bursts fire once their timer lapses.
pub fn tick_pending_bursts(
    time: Res<Time>,
    mut commands: Commands,
    mut pending: Query<(Entity, &mut PendingBurst)>,
    mut bursts: EventWriter<BurstEvent>,
) {
    for (entity, mut burst) in pending.iter_mut() {
        if burst.timer.tick(time.delta()).finished() {
            bursts.write(BurstEvent {
                origin: burst.origin,
                kind: burst.kind,
                count: burst.kind.count(),
            });
            commands.entity(entity).despawn();
        }
    }
}

/// Completion bursts key off store events directly; the card entity is still
/// registered when the event is delivered.
pub fn burst_on_completion(
    mut events: EventReader<StoreEvent>,
    registry: Res<VisualRegistry>,
    transforms: Query<&Transform>,
    mut bursts: EventWriter<BurstEvent>,
) {
    for event in events.read() {
        let StoreEvent::Completed(task) = event else {
            continue;
        };
        let Some(entity) = registry.get(task.id) else {
            continue;
        };
        if let Ok(transform) = transforms.get(entity) {
            bursts.write(BurstEvent {
                origin: transform.translation,
                kind: BurstKind::Complete,
                count: BURST_COUNT_COMPLETE,
            });
        }
    }
}

pub fn spawn_bursts(
    mut commands: Commands,
    mut events: EventReader<BurstEvent>,
    assets: Res<ParticleAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = rand::thread_rng();
    for event in events.read() {
        let material = materials.add(StandardMaterial {
            base_color: Color::from(event.kind.color()).with_alpha(0.9),
            emissive: event.kind.color(),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        let slow = event.kind == BurstKind::Victory;
        for _ in 0..event.count {
            let direction = random_in_sphere(&mut rng).normalize_or_zero();
            let speed = if slow {
                rng.gen_range(1.0..3.0)
            } else {
                rng.gen_range(2.0..6.0)
            };
            let life = if slow {
                rng.gen_range(1.0..1.8)
            } else {
                rng.gen_range(0.5..0.9)
            };
            let base_scale = rng.gen_range(0.8..2.0);
            commands.spawn((
                Mesh3d(assets.mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(event.origin).with_scale(Vec3::splat(base_scale)),
                BurstParticle {
                    velocity: direction * speed,
                    life: Timer::from_seconds(life, TimerMode::Once),
                    base_scale,
                },
            ));
        }
    }
}

pub fn advance_burst_particles(
    time: Res<Time>,
    mut commands: Commands,
    mut particles: Query<(Entity, &mut Transform, &mut BurstParticle)>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut particle) in particles.iter_mut() {
        if particle.life.tick(time.delta()).finished() {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation += particle.velocity * dt;
        particle.velocity *= 1.0 - 2.5 * dt;
        // Shrink to nothing over the particle's lifetime.
        let remaining = particle.life.fraction_remaining();
        transform.scale = Vec3::splat(particle.base_scale * remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_counts_match_kind() {
        assert_eq!(BurstKind::Add.count(), BURST_COUNT_ADD);
        assert_eq!(BurstKind::Complete.count(), BURST_COUNT_COMPLETE);
        assert_eq!(BurstKind::Delete.count(), BURST_COUNT_DELETE);
        assert_eq!(BurstKind::Victory.count(), BURST_COUNT_VICTORY);
    }

    #[test]
    fn random_in_sphere_stays_inside() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            assert!(random_in_sphere(&mut rng).length() <= 1.0);
        }
    }
}
