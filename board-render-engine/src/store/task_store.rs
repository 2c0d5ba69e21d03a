//! Authoritative task list, ordering, and filter state.
//!
//! Every mutating operation applies its change, queues exactly one event, and
//! persists synchronously, in that order; consumers that drain the queue
//! always observe already-persisted state. Queued events keep mutation order.

use bevy::prelude::*;
use chrono::Utc;

use super::StoreError;
use super::persistence::{FILTER_KEY, Storage, TASKS_KEY};
use super::task::{Filter, Task, TaskId, TaskPatch};

/// Closed set of store change notifications.
#[derive(Event, Debug, Clone)]
pub enum StoreEvent {
    Added(Task),
    Completed(Task),
    Uncompleted(Task),
    Edited(Task),
    /// Carries the removed snapshot: its `completed` flag drives post-delete
    /// feedback after the task itself is gone.
    Deleted { id: TaskId, task: Task },
    /// Full new ordering after a reorder commit.
    Reordered(Vec<Task>),
    FilterChanged(Filter),
}

#[derive(Resource)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: Filter,
    storage: Box<dyn Storage>,
    queued: Vec<StoreEvent>,
}

impl TaskStore {
    /// Restore from storage. Non-array or unparsable payloads start the
    /// session empty; individual records missing id or title are dropped and
    /// the surviving orders re-sequenced dense.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let mut tasks: Vec<Task> = storage
            .read(TASKS_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<serde_json::Value>>(&raw).ok())
            .map(|records| {
                records
                    .into_iter()
                    .filter_map(|r| serde_json::from_value::<Task>(r).ok())
                    .collect()
            })
            .unwrap_or_default();
        tasks.sort_by_key(|t| t.order);
        for (i, task) in tasks.iter_mut().enumerate() {
            task.order = i;
        }

        let filter = storage
            .read(FILTER_KEY)
            .and_then(|raw| Filter::from_str(raw.trim()))
            .unwrap_or_default();

        Self {
            tasks,
            filter,
            storage,
            queued: Vec::new(),
        }
    }

    // ── Mutations ──────────────────────────────────────────────────────

    pub fn add(&mut self, title: &str, description: &str) -> Result<Task, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::Validation("title required".into()));
        }
        let task = Task::new(title, description, self.tasks.len());
        self.tasks.push(task.clone());
        self.queued.push(StoreEvent::Added(task.clone()));
        self.persist_tasks();
        Ok(task)
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then(|| Utc::now().timestamp_millis());
        let snapshot = task.clone();
        self.queued.push(if snapshot.completed {
            StoreEvent::Completed(snapshot.clone())
        } else {
            StoreEvent::Uncompleted(snapshot.clone())
        });
        self.persist_tasks();
        Ok(snapshot)
    }

    /// No-op when the id is unknown. Remaining orders are re-sequenced dense.
    pub fn delete(&mut self, id: TaskId) {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return;
        };
        let task = self.tasks.remove(index);
        self.resequence();
        self.queued.push(StoreEvent::Deleted { id, task });
        self.persist_tasks();
    }

    pub fn edit(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if let Some(title) = patch.title {
            task.title = title.trim().to_owned();
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_owned();
        }
        let snapshot = task.clone();
        self.queued.push(StoreEvent::Edited(snapshot.clone()));
        self.persist_tasks();
        Ok(snapshot)
    }

    /// Move a task to `new_index` (clamped into the list) and re-sequence.
    /// No event and no persistence write when the id is unknown or the index
    /// is unchanged.
    pub fn reorder(&mut self, id: TaskId, new_index: usize) {
        let Some(old_index) = self.tasks.iter().position(|t| t.id == id) else {
            return;
        };
        if old_index == new_index {
            return;
        }
        let task = self.tasks.remove(old_index);
        let clamped = new_index.min(self.tasks.len());
        self.tasks.insert(clamped, task);
        self.resequence();
        self.queued.push(StoreEvent::Reordered(self.tasks.clone()));
        self.persist_tasks();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.queued.push(StoreEvent::FilterChanged(filter));
        if let Err(e) = self.storage.write(FILTER_KEY, filter.as_str()) {
            warn!("filter persist failed: {e}");
        }
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Defensive copy of the full list, in order.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn filtered_tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| self.filter.accepts(t))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn completion_ratio(&self) -> f32 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let done = self.tasks.iter().filter(|t| t.completed).count();
        done as f32 / self.tasks.len() as f32
    }

    pub fn all_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.completed)
    }

    /// Hand queued events to the frame's event channel, in mutation order.
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.queued)
    }

    // ── Private ────────────────────────────────────────────────────────

    fn resequence(&mut self) {
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.order = i;
        }
    }

    fn persist_tasks(&mut self) {
        match serde_json::to_string(&self.tasks) {
            Ok(payload) => {
                if let Err(e) = self.storage.write(TASKS_KEY, &payload) {
                    warn!("task persist failed: {e}");
                }
            }
            Err(e) => warn!("task serialization failed: {e}"),
        }
    }
}

/// Runs once per frame ahead of every consumer system: moves queued store
/// events into the Bevy channel so all readers observe them this frame.
pub fn flush_store_events(mut store: ResMut<TaskStore>, mut events: EventWriter<StoreEvent>) {
    for event in store.drain_events() {
        events.write(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::persistence::MemoryStorage;

    fn empty_store() -> TaskStore {
        TaskStore::load(Box::new(MemoryStorage::default()))
    }

    fn orders(store: &TaskStore) -> Vec<usize> {
        store.tasks().iter().map(|t| t.order).collect()
    }

    #[test]
    fn add_assigns_dense_orders() {
        let mut store = empty_store();
        store.add("Buy milk", "").unwrap();
        store.add("Call Bob", "").unwrap();
        assert_eq!(orders(&store), vec![0, 1]);
    }

    #[test]
    fn add_rejects_blank_title() {
        let mut store = empty_store();
        assert!(matches!(
            store.add("   ", "whatever"),
            Err(StoreError::Validation(_))
        ));
        assert!(store.is_empty());
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn toggle_flips_completion_and_timestamps() {
        let mut store = empty_store();
        let task = store.add("t", "").unwrap();
        let done = store.toggle_complete(task.id).unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        let undone = store.toggle_complete(task.id).unwrap();
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());

        let events = store.drain_events();
        assert!(matches!(events[1], StoreEvent::Completed(_)));
        assert!(matches!(events[2], StoreEvent::Uncompleted(_)));
    }

    #[test]
    fn toggle_unknown_id_is_not_found() {
        let mut store = empty_store();
        assert!(matches!(
            store.toggle_complete(TaskId::new()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn delete_resequences_remaining_orders() {
        let mut store = empty_store();
        let first = store.add("a", "").unwrap();
        store.add("b", "").unwrap();
        store.add("c", "").unwrap();
        store.delete(first.id);
        assert_eq!(store.len(), 2);
        assert_eq!(orders(&store), vec![0, 1]);
    }

    #[test]
    fn delete_unknown_id_is_silent() {
        let mut store = empty_store();
        store.add("a", "").unwrap();
        store.drain_events();
        store.delete(TaskId::new());
        assert_eq!(store.len(), 1);
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn delete_event_carries_snapshot() {
        let mut store = empty_store();
        let task = store.add("a", "").unwrap();
        store.toggle_complete(task.id).unwrap();
        store.drain_events();
        store.delete(task.id);
        let events = store.drain_events();
        match &events[0] {
            StoreEvent::Deleted { id, task } => {
                assert_eq!(*id, task.id);
                assert!(task.completed);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn orders_stay_dense_under_interleaved_add_delete() {
        let mut store = empty_store();
        let mut ids = Vec::new();
        for i in 0..6 {
            ids.push(store.add(&format!("task {i}"), "").unwrap().id);
        }
        store.delete(ids[1]);
        store.delete(ids[4]);
        store.add("late", "").unwrap();
        store.delete(ids[0]);
        let expected: Vec<usize> = (0..store.len()).collect();
        assert_eq!(orders(&store), expected);
    }

    #[test]
    fn edit_is_partial() {
        let mut store = empty_store();
        let task = store.add("title", "desc").unwrap();
        let edited = store
            .edit(
                task.id,
                TaskPatch {
                    title: Some("  new title ".into()),
                    description: None,
                },
            )
            .unwrap();
        assert_eq!(edited.title, "new title");
        assert_eq!(edited.description, "desc");
    }

    #[test]
    fn reorder_moves_and_resequences() {
        let mut store = empty_store();
        let a = store.add("a", "").unwrap();
        store.add("b", "").unwrap();
        store.add("c", "").unwrap();
        store.reorder(a.id, 2);
        let titles: Vec<String> = store.tasks().iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, vec!["b", "c", "a"]);
        assert_eq!(orders(&store), vec![0, 1, 2]);
    }

    /// Storage handle the test keeps a second reference to, so write counts
    /// stay observable after the store takes ownership.
    #[derive(Clone, Default)]
    struct SharedStorage(std::sync::Arc<std::sync::Mutex<MemoryStorage>>);

    impl Storage for SharedStorage {
        fn read(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().read(key)
        }
        fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().write(key, value)
        }
    }

    #[test]
    fn reorder_to_current_index_is_a_noop() {
        let storage = SharedStorage::default();
        let mut store = TaskStore::load(Box::new(storage.clone()));
        let a = store.add("a", "").unwrap();
        store.add("b", "").unwrap();
        store.drain_events();
        let writes_before = storage.0.lock().unwrap().write_count;

        store.reorder(a.id, 0);

        assert!(store.drain_events().is_empty());
        assert_eq!(storage.0.lock().unwrap().write_count, writes_before);
    }

    #[test]
    fn reorder_clamps_out_of_range_index() {
        let mut store = empty_store();
        let a = store.add("a", "").unwrap();
        store.add("b", "").unwrap();
        store.reorder(a.id, 99);
        let titles: Vec<String> = store.tasks().iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn completion_ratio_cases() {
        let mut store = empty_store();
        assert_eq!(store.completion_ratio(), 0.0);
        let a = store.add("a", "").unwrap();
        let b = store.add("b", "").unwrap();
        store.toggle_complete(a.id).unwrap();
        assert_eq!(store.completion_ratio(), 0.5);
        store.toggle_complete(b.id).unwrap();
        assert_eq!(store.completion_ratio(), 1.0);
        assert!(store.all_completed());
    }

    #[test]
    fn filtered_tasks_follow_filter() {
        let mut store = empty_store();
        let a = store.add("a", "").unwrap();
        store.add("b", "").unwrap();
        store.toggle_complete(a.id).unwrap();

        store.set_filter(Filter::Active);
        assert_eq!(store.filtered_tasks().len(), 1);
        assert_eq!(store.filtered_tasks()[0].title, "b");
        store.set_filter(Filter::Done);
        assert_eq!(store.filtered_tasks()[0].title, "a");
        store.set_filter(Filter::All);
        assert_eq!(store.filtered_tasks().len(), 2);
    }

    #[test]
    fn tasks_returns_a_defensive_copy() {
        let mut store = empty_store();
        store.add("a", "").unwrap();
        let mut copy = store.tasks();
        copy[0].title = "mangled".into();
        assert_eq!(store.tasks()[0].title, "a");
    }

    #[test]
    fn corrupt_payload_loads_empty() {
        let storage = MemoryStorage::with_entry(TASKS_KEY, "not json");
        let store = TaskStore::load(Box::new(storage));
        assert!(store.is_empty());
    }

    #[test]
    fn non_array_payload_loads_empty() {
        let storage = MemoryStorage::with_entry(TASKS_KEY, "{\"oops\": 1}");
        let store = TaskStore::load(Box::new(storage));
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_records_are_dropped_individually() {
        let payload = format!(
            "[{}, {{\"garbage\": true}}, {}]",
            serde_json::to_string(&Task::new("keep me", "", 0)).unwrap(),
            serde_json::to_string(&Task::new("me too", "", 2)).unwrap(),
        );
        let storage = MemoryStorage::with_entry(TASKS_KEY, &payload);
        let store = TaskStore::load(Box::new(storage));
        assert_eq!(store.len(), 2);
        // Survivors re-sequence to a dense permutation.
        assert_eq!(orders(&store), vec![0, 1]);
    }

    #[test]
    fn persisted_round_trip_keeps_order_and_state() {
        let mut storage = MemoryStorage::default();
        let payload = {
            let mut store = TaskStore::load(Box::new(MemoryStorage::default()));
            let a = store.add("a", "first").unwrap();
            store.add("b", "second").unwrap();
            store.toggle_complete(a.id).unwrap();
            serde_json::to_string(&store.tasks()).unwrap()
        };
        storage.write(TASKS_KEY, &payload).unwrap();
        storage.write(FILTER_KEY, "done").unwrap();

        let restored = TaskStore::load(Box::new(storage));
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.filter(), Filter::Done);
        assert!(restored.tasks()[0].completed);
        assert_eq!(restored.tasks()[1].title, "b");
    }
}
