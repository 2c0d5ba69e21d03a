//! Authoritative task state: model, store, errors, persistence.

pub mod error;
pub mod persistence;
pub mod task;
pub mod task_store;

use bevy::prelude::*;

pub use error::StoreError;
pub use task::{Filter, Task, TaskId, TaskPatch};
pub use task_store::{StoreEvent, TaskStore, flush_store_events};

use crate::engine::core::app_state::BoardSet;
use persistence::FileStorage;

/// Registers the task store (restored from disk) and the event flush that
/// runs ahead of every consumer each frame.
pub struct StorePlugin;

impl Plugin for StorePlugin {
    fn build(&self, app: &mut App) {
        let store = TaskStore::load(Box::new(FileStorage::default_location()));
        info!(
            "task store restored: {} task(s), filter {:?}",
            store.len(),
            store.filter()
        );
        app.insert_resource(store)
            .add_event::<StoreEvent>()
            .add_systems(Update, flush_store_events.in_set(BoardSet::Flush));
    }
}
