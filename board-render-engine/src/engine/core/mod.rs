//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions,
//! and frame ordering for the board systems.

/// Application setup and plugin configuration for the Bevy engine.
pub mod app_setup;

/// Application state machine and the fixed per-frame system ordering.
pub mod app_state;

/// Window configuration.
pub mod window_config;
