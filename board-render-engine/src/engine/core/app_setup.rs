use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;

use crate::board::BoardPlugin;
use crate::engine::camera::{
    CameraActivity, camera_drift, setup_camera, track_pointer_activity,
};
use crate::engine::core::app_state::{AppState, BoardSet};
use crate::engine::core::window_config::create_window_config;
use crate::engine::scene::environment::setup_environment;
use crate::feedback::FeedbackPlugin;
use crate::store::StorePlugin;
use crate::ui::UiPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .configure_sets(
            Update,
            (
                BoardSet::Input,
                BoardSet::Flush,
                BoardSet::Sync,
                BoardSet::Animate,
                BoardSet::Feedback,
            )
                .chain(),
        )
        .add_plugins(StorePlugin)
        .add_plugins(BoardPlugin)
        .add_plugins(FeedbackPlugin)
        .add_plugins(UiPlugin);

    app.init_resource::<CameraActivity>()
        .add_systems(Startup, (setup_camera, setup_environment))
        .add_systems(
            Update,
            (track_pointer_activity, camera_drift)
                .chain()
                .in_set(BoardSet::Feedback),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
