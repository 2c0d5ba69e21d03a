//! Completion progress ring above the grid.
//!
//! A dim full-circle track sits behind an arc whose sweep is the completed
//! fraction of the board. The arc mesh is regenerated whenever the displayed
//! ratio changes, and its colour lerps from deep blue toward gold as the
//! board fills in. Reaching full completion plays a one-shot victory shatter.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use std::f32::consts::{FRAC_PI_2, TAU};

use constants::feedback::{
    BURST_COUNT_VICTORY, RING_CENTER, RING_COLOR_END, RING_COLOR_START, RING_RADIUS,
    RING_THICKNESS, RING_TRACK_THICKNESS, VICTORY_STAR_COUNT,
};

use super::particles::{BurstEvent, BurstKind};
use crate::board::tween::{Channel, Ease, ScaleTween};
use crate::store::{StoreEvent, TaskStore};

const RING_SEGMENTS: usize = 64;
const RING_DEFLATE_DURATION: f32 = 0.8;

#[derive(Resource)]
pub struct RingState {
    /// Ratio the store currently reports.
    target: f32,
    /// Ratio the arc currently shows. Regenerated mesh lags behind `target`
    /// only while a deflate animation is running.
    shown: f32,
    /// Last ratio baked into the arc mesh, to skip redundant rebuilds.
    baked: f32,
    deflate: Option<Channel<f32>>,
    victory_played: bool,
}

impl Default for RingState {
    fn default() -> Self {
        Self {
            target: 0.0,
            shown: 0.0,
            baked: f32::NAN,
            deflate: None,
            victory_played: false,
        }
    }
}

#[derive(Resource)]
pub struct RingAssets {
    root: Entity,
    arc_mesh: Handle<Mesh>,
    arc_material: Handle<StandardMaterial>,
}

pub fn setup_ring(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let track_mesh = meshes.add(build_arc_mesh(1.0, RING_RADIUS, RING_TRACK_THICKNESS));
    let track_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.3, 0.35, 0.5, 0.35),
        emissive: LinearRgba::rgb(0.05, 0.06, 0.1),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    let arc_mesh = meshes.add(build_arc_mesh(0.0, RING_RADIUS, RING_THICKNESS));
    let arc_material = materials.add(StandardMaterial {
        base_color: Color::from(RING_COLOR_START),
        emissive: RING_COLOR_START,
        unlit: true,
        ..default()
    });

    let root = commands
        .spawn((Transform::from_translation(RING_CENTER), Visibility::default()))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(track_mesh),
                MeshMaterial3d(track_material),
                Transform::from_xyz(0.0, 0.0, -0.01),
            ));
            parent.spawn((
                Mesh3d(arc_mesh.clone()),
                MeshMaterial3d(arc_material.clone()),
                Transform::default(),
            ));
        })
        .id();

    commands.insert_resource(RingAssets { root, arc_mesh, arc_material });
    commands.insert_resource(RingState::default());
}

/// Flat annulus sector facing the camera, swept clockwise from twelve
/// o'clock. A zero ratio yields an empty mesh rather than a degenerate one.
fn build_arc_mesh(ratio: f32, radius: f32, thickness: f32) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    let ratio = ratio.clamp(0.0, 1.0);

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    if ratio > 0.0005 {
        let inner = radius - thickness / 2.0;
        let outer = radius + thickness / 2.0;
        for i in 0..=RING_SEGMENTS {
            let t = i as f32 / RING_SEGMENTS as f32;
            let angle = FRAC_PI_2 - t * ratio * TAU;
            let (sin, cos) = angle.sin_cos();
            positions.push([cos * inner, sin * inner, 0.0]);
            positions.push([cos * outer, sin * outer, 0.0]);
            normals.push([0.0, 0.0, 1.0]);
            normals.push([0.0, 0.0, 1.0]);
            uvs.push([t, 0.0]);
            uvs.push([t, 1.0]);
        }
        for i in 0..RING_SEGMENTS as u32 {
            let base = i * 2;
            indices.extend_from_slice(&[base, base + 1, base + 2]);
            indices.extend_from_slice(&[base + 2, base + 1, base + 3]);
        }
    }

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

fn mix(a: LinearRgba, b: LinearRgba, t: f32) -> LinearRgba {
    LinearRgba::rgb(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
    )
}

/// React to store mutations: retarget the ratio, pulse up on completion and
/// down on uncompletion, deflate smoothly when a completed task is deleted,
/// and trigger victory at most once until a new task arrives.
pub fn update_ring_target(
    mut events: EventReader<StoreEvent>,
    store: Res<TaskStore>,
    mut state: ResMut<RingState>,
    assets: Res<RingAssets>,
    mut commands: Commands,
    mut bursts: EventWriter<BurstEvent>,
) {
    let mut pulse_up = false;
    let mut pulse_down = false;
    let mut deflate = false;
    let mut added = false;
    let mut changed = false;

    for event in events.read() {
        match event {
            StoreEvent::Completed(_) => {
                pulse_up = true;
                changed = true;
            }
            StoreEvent::Uncompleted(_) => {
                pulse_down = true;
                changed = true;
            }
            StoreEvent::Deleted { task, .. } if task.completed => {
                deflate = true;
                changed = true;
            }
            StoreEvent::Added(_) => {
                added = true;
                changed = true;
            }
            StoreEvent::Deleted { .. } => changed = true,
            _ => {}
        }
    }
    if !changed {
        return;
    }

    state.target = store.completion_ratio();
    if deflate {
        state.deflate = Some(Channel::to(
            state.target,
            RING_DEFLATE_DURATION,
            Ease::OutCubic,
        ));
    } else {
        state.deflate = None;
        state.shown = state.target;
    }

    if pulse_up {
        commands.entity(assets.root).insert(ScaleTween(
            Channel::to(Vec3::splat(1.15), 0.12, Ease::OutQuad)
                .then(Vec3::ONE, 0.35, Ease::OutBack),
        ));
    } else if pulse_down {
        commands.entity(assets.root).insert(ScaleTween(
            Channel::to(Vec3::splat(0.88), 0.12, Ease::OutQuad)
                .then(Vec3::ONE, 0.35, Ease::OutBack),
        ));
    }

    // Only an add re-arms the celebration; uncompleting and recompleting a
    // task must not replay it.
    if added {
        state.victory_played = false;
    }

    if pulse_up && state.target >= 1.0 && !store.is_empty() && !state.victory_played {
        state.victory_played = true;
        commands.entity(assets.root).insert(ScaleTween(
            Channel::to(Vec3::splat(1.4), 0.18, Ease::OutQuad)
                .then(Vec3::ONE, 0.6, Ease::OutElastic),
        ));
        bursts.write(BurstEvent {
            origin: RING_CENTER,
            kind: BurstKind::Victory,
            count: BURST_COUNT_VICTORY,
        });
        // Slower star sparks layered on top of the shatter.
        bursts.write(BurstEvent {
            origin: RING_CENTER,
            kind: BurstKind::Victory,
            count: VICTORY_STAR_COUNT,
        });
    }
}

/// Advance the deflate animation and rebake the arc when the displayed ratio
/// moved.
pub fn animate_ring(
    time: Res<Time>,
    mut state: ResMut<RingState>,
    assets: Res<RingAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Reborrow so the deflate channel and the shown ratio can be split.
    let state = state.as_mut();
    if let Some(channel) = state.deflate.as_mut() {
        if channel.advance(&mut state.shown, time.delta_secs()).is_some() {
            state.deflate = None;
        }
    }

    if (state.shown - state.baked).abs() < 0.0005 && !state.baked.is_nan() {
        return;
    }
    state.baked = state.shown;

    meshes.insert(
        &assets.arc_mesh,
        build_arc_mesh(state.shown, RING_RADIUS, RING_THICKNESS),
    );
    if let Some(material) = materials.get_mut(&assets.arc_material) {
        let color = mix(RING_COLOR_START, RING_COLOR_END, state.shown);
        material.emissive = color;
        material.base_color = Color::from(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_arc_has_all_segments() {
        let mesh = build_arc_mesh(1.0, RING_RADIUS, RING_THICKNESS);
        let positions = mesh.attribute(Mesh::ATTRIBUTE_POSITION).unwrap();
        assert_eq!(positions.len(), (RING_SEGMENTS + 1) * 2);
    }

    #[test]
    fn empty_arc_has_no_geometry() {
        let mesh = build_arc_mesh(0.0, RING_RADIUS, RING_THICKNESS);
        let positions = mesh.attribute(Mesh::ATTRIBUTE_POSITION).unwrap();
        assert_eq!(positions.len(), 0);
    }

    #[test]
    fn arc_vertices_sit_on_the_band() {
        let mesh = build_arc_mesh(0.5, RING_RADIUS, RING_THICKNESS);
        let Some(bevy::render::mesh::VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        for p in positions {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            assert!(r >= RING_RADIUS - RING_THICKNESS && r <= RING_RADIUS + RING_THICKNESS);
        }
    }

    #[test]
    fn color_mix_endpoints() {
        assert_eq!(mix(RING_COLOR_START, RING_COLOR_END, 0.0), RING_COLOR_START);
        let end = mix(RING_COLOR_START, RING_COLOR_END, 1.0);
        assert!((end.red - RING_COLOR_END.red).abs() < 1e-6);
    }

    use std::time::Duration;

    use crate::store::persistence::MemoryStorage;

    fn ring_app(store: TaskStore) -> App {
        let mut app = App::new();
        app.add_event::<StoreEvent>()
            .add_event::<BurstEvent>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .insert_resource(Time::<()>::default())
            .insert_resource(store)
            .add_systems(Startup, setup_ring)
            .add_systems(Update, (update_ring_target, animate_ring).chain());
        app
    }

    fn drain_bursts(app: &mut App) -> usize {
        app.world_mut()
            .resource_mut::<Events<BurstEvent>>()
            .drain()
            .count()
    }

    #[test]
    fn victory_plays_once_until_a_task_is_added() {
        let mut store = TaskStore::load(Box::new(MemoryStorage::default()));
        let a = store.add("a", "").unwrap();
        let b = store.add("b", "").unwrap();
        store.toggle_complete(a.id).unwrap();
        let done_b = store.toggle_complete(b.id).unwrap();
        store.drain_events();

        let mut app = ring_app(store);
        app.update();

        app.world_mut().send_event(StoreEvent::Completed(done_b));
        app.update();
        assert!(drain_bursts(&mut app) > 0, "full board celebrates");

        // Uncomplete and recomplete the same task: no replay.
        let undone = app
            .world_mut()
            .resource_mut::<TaskStore>()
            .toggle_complete(b.id)
            .unwrap();
        app.world_mut().resource_mut::<TaskStore>().drain_events();
        app.world_mut().send_event(StoreEvent::Uncompleted(undone));
        app.update();
        drain_bursts(&mut app);

        let redone = app
            .world_mut()
            .resource_mut::<TaskStore>()
            .toggle_complete(b.id)
            .unwrap();
        app.world_mut().resource_mut::<TaskStore>().drain_events();
        app.world_mut().send_event(StoreEvent::Completed(redone));
        app.update();
        assert_eq!(drain_bursts(&mut app), 0, "toggle cycle must not replay");

        // A fresh task re-arms the celebration.
        let c = app
            .world_mut()
            .resource_mut::<TaskStore>()
            .add("c", "")
            .unwrap();
        app.world_mut().resource_mut::<TaskStore>().drain_events();
        app.world_mut().send_event(StoreEvent::Added(c.clone()));
        app.update();
        drain_bursts(&mut app);

        let done_c = app
            .world_mut()
            .resource_mut::<TaskStore>()
            .toggle_complete(c.id)
            .unwrap();
        app.world_mut().resource_mut::<TaskStore>().drain_events();
        app.world_mut().send_event(StoreEvent::Completed(done_c));
        app.update();
        assert!(drain_bursts(&mut app) > 0, "re-armed after add");
    }

    #[test]
    fn uncomplete_pulses_the_ring_down() {
        let mut store = TaskStore::load(Box::new(MemoryStorage::default()));
        let a = store.add("a", "").unwrap();
        store.toggle_complete(a.id).unwrap();
        store.drain_events();

        let mut app = ring_app(store);
        app.update();
        let root = app.world().resource::<RingAssets>().root;
        assert!(app.world().get::<ScaleTween>(root).is_none());

        let undone = app
            .world_mut()
            .resource_mut::<TaskStore>()
            .toggle_complete(a.id)
            .unwrap();
        app.world_mut().resource_mut::<TaskStore>().drain_events();
        app.world_mut().send_event(StoreEvent::Uncompleted(undone));
        app.update();
        assert!(app.world().get::<ScaleTween>(root).is_some());
    }

    #[test]
    fn completed_delete_deflates_instead_of_snapping() {
        let mut store = TaskStore::load(Box::new(MemoryStorage::default()));
        let a = store.add("a", "").unwrap();
        store.add("b", "").unwrap();
        let done_a = store.toggle_complete(a.id).unwrap();
        store.drain_events();

        let mut app = ring_app(store);
        app.update();
        app.world_mut().send_event(StoreEvent::Completed(done_a.clone()));
        app.update();
        assert_eq!(app.world().resource::<RingState>().shown, 0.5);

        app.world_mut().resource_mut::<TaskStore>().delete(a.id);
        app.world_mut().resource_mut::<TaskStore>().drain_events();
        app.world_mut().send_event(StoreEvent::Deleted {
            id: a.id,
            task: done_a,
        });
        app.update();
        // Deflate holds the displayed ratio and eases it down over time.
        assert_eq!(app.world().resource::<RingState>().shown, 0.5);

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(0.1));
        app.update();
        let mid = app.world().resource::<RingState>().shown;
        assert!(mid > 0.0 && mid < 0.5, "mid-deflate ratio, got {mid}");

        for _ in 0..10 {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_secs_f32(0.1));
            app.update();
        }
        let state = app.world().resource::<RingState>();
        assert_eq!(state.shown, 0.0);
        assert!(state.deflate.is_none());
    }
}
