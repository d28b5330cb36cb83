use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;

use constants::palette::{FOG_COLOUR, SKY_COLOUR};

use crate::constants::render_settings::{FOG_DENSITY, SKYBOX_SIZE};
use crate::engine::camera::ocean_camera::OceanCamera;
use crate::engine::scene_context::{SceneAssets, SceneOwned};

/// Unlit box around the camera. Moves with it so it never gets closer.
#[derive(Component)]
pub struct Skybox;

pub fn spawn_skybox(commands: &mut Commands, assets: &mut SceneAssets) {
    commands.spawn((
        Name::new("skybox"),
        Mesh3d(assets.meshes.add(Cuboid::from_length(SKYBOX_SIZE))),
        MeshMaterial3d(assets.materials.add(StandardMaterial {
            base_color: SKY_COLOUR,
            unlit: true,
            fog_enabled: false,
            cull_mode: None,
            ..default()
        })),
        Transform::default(),
        NotShadowCaster,
        Skybox,
        SceneOwned,
    ));
}

/// Exponential-squared underwater haze for the scene camera.
pub fn underwater_fog() -> DistanceFog {
    DistanceFog {
        color: FOG_COLOUR,
        falloff: FogFalloff::ExponentialSquared {
            density: FOG_DENSITY,
        },
        ..default()
    }
}

pub fn follow_camera(
    camera: Query<&Transform, (With<OceanCamera>, Without<Skybox>)>,
    mut skyboxes: Query<&mut Transform, With<Skybox>>,
) {
    let Ok(camera) = camera.single() else {
        return;
    };
    for mut transform in &mut skyboxes {
        transform.translation = camera.translation;
    }
}
