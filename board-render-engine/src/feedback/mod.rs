//! Aggregate feedback: ambient particles, burst effects, progress ring.

pub mod particles;
pub mod progress_ring;

use bevy::prelude::*;

pub use particles::{BurstEvent, BurstKind, PendingBurst};

use crate::engine::core::app_state::BoardSet;

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BurstEvent>()
            .add_systems(
                Startup,
                (particles::setup_particles, progress_ring::setup_ring),
            )
            .add_systems(
                Update,
                (
                    particles::burst_on_completion,
                    progress_ring::update_ring_target,
                    particles::tick_pending_bursts,
                    particles::spawn_bursts,
                    particles::drift_ambient_particles,
                    particles::advance_burst_particles,
                    progress_ring::animate_ring,
                )
                    .chain()
                    .in_set(BoardSet::Feedback),
            );
    }
}
