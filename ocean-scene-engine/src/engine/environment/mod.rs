//! Procedural underwater environment.
//!
//! Everything here is generated at `init` without any asset files, tagged
//! [`SceneOwned`] and removed again by `dispose`.

/// Bubble and light-shaft particle emitters.
pub mod particles;

/// Seafloor plane and seaweed stalks.
pub mod seafloor;

/// Camera-following skybox and underwater fog.
pub mod sky;

/// Translucent water surface with a drifting ripple normal map.
pub mod water;

use bevy::prelude::*;

use constants::palette::CLEAR_COLOUR;

use crate::constants::render_settings::{
    AMBIENT_BRIGHTNESS, AMBIENT_COLOUR, POINT_LIGHT_COLOUR, POINT_LIGHT_RANGE, POINT_LIGHTS,
    SUN_COLOUR, SUN_DIRECTION, SUN_ILLUMINANCE,
};
use crate::engine::core::app_state::SceneLifecycle;
use crate::engine::population::SceneRng;
use crate::engine::scene_context::{SceneAssets, SceneOwned};

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                water::drift_water,
                particles::simulate_particles,
                sky::follow_camera,
            )
                .run_if(not(in_state(SceneLifecycle::Idle))),
        );
    }
}

/// Build every environment piece for a new scene.
pub fn build_environment(commands: &mut Commands, assets: &mut SceneAssets, rng: &mut SceneRng) {
    commands.insert_resource(ClearColor(CLEAR_COLOUR));
    commands.insert_resource(AmbientLight {
        color: AMBIENT_COLOUR,
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    spawn_lighting(commands);
    water::spawn_water(commands, assets);
    seafloor::spawn_seafloor(commands, assets, rng);
    sky::spawn_skybox(commands, assets);
    particles::spawn_emitter(commands, assets, &particles::BUBBLES);
    particles::spawn_emitter(commands, assets, &particles::SUN_RAYS);
    debug!("Environment built");
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        Name::new("sun"),
        DirectionalLight {
            color: SUN_COLOUR,
            illuminance: SUN_ILLUMINANCE,
            shadows_enabled: false,
            ..default()
        },
        Transform::default().looking_to(SUN_DIRECTION, Vec3::Y),
        SceneOwned,
    ));

    for (index, (position, intensity)) in POINT_LIGHTS.into_iter().enumerate() {
        commands.spawn((
            Name::new(format!("fill_light_{index}")),
            PointLight {
                color: POINT_LIGHT_COLOUR,
                intensity,
                range: POINT_LIGHT_RANGE,
                ..default()
            },
            Transform::from_translation(position),
            SceneOwned,
        ));
    }
}
