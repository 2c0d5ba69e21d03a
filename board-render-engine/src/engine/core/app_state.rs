use bevy::prelude::*;

/// Top-level application phases: restore the store, stream the persisted
/// cards back into the scene, then run interactively.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Reconstructing,
    Running,
}

/// Frame ordering for the board core. Store mutations land before the event
/// flush, the flush before registry sync, sync before tween advancement, and
/// feedback last. One logical mutation is fully applied, persisted, and
/// reacted to within a single frame, in a fixed order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSet {
    /// Pointer/keyboard/UI systems that may mutate the store.
    Input,
    /// Queued store events move into the Bevy event channel.
    Flush,
    /// Registry reactions: spawn, transition, reposition, despawn.
    Sync,
    /// Tween channels advance by the frame delta.
    Animate,
    /// Particles, progress ring, labels, overlay UI.
    Feedback,
}
