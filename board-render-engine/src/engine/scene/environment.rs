//! Scene lighting for the glassy card look.

use bevy::prelude::*;

pub fn setup_environment(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.4, 0.5, 0.8),
        brightness: 120.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 6_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));

    // Two coloured accents so card edges catch a cool/warm rim.
    commands.spawn((
        PointLight {
            color: Color::srgb(0.3, 0.5, 1.0),
            intensity: 2_000_000.0,
            range: 60.0,
            ..default()
        },
        Transform::from_xyz(-10.0, 6.0, 8.0),
    ));
    commands.spawn((
        PointLight {
            color: Color::srgb(1.0, 0.6, 0.3),
            intensity: 1_200_000.0,
            range: 60.0,
            ..default()
        },
        Transform::from_xyz(10.0, -4.0, 8.0),
    ));
}
