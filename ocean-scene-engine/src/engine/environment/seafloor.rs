use bevy::prelude::*;

use constants::palette::SEAFLOOR_COLOUR;
use constants::population::SEAWEED_COUNT;

use crate::constants::render_settings::{
    SEAFLOOR_HEIGHT, SEAFLOOR_SIZE, SEAWEED_BOTTOM_RADIUS, SEAWEED_EMISSIVE, SEAWEED_GREEN_RANGE,
    SEAWEED_HEIGHT_RANGE, SEAWEED_MAX_TILT, SEAWEED_RED_BLUE, SEAWEED_SPREAD, SEAWEED_TOP_RADIUS,
};
use crate::engine::population::SceneRng;
use crate::engine::scene_context::{SceneAssets, SceneOwned};

#[derive(Component)]
pub struct Seaweed;

/// Placement of one seaweed stalk, rooted on the seafloor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeaweedStalk {
    pub root: Vec2,
    pub height: f32,
    pub tilt: Vec2,
    pub green: f32,
}

impl SeaweedStalk {
    pub fn random(rng: &mut SceneRng) -> Self {
        Self {
            root: Vec2::new(
                rng.range((-SEAWEED_SPREAD, SEAWEED_SPREAD)),
                rng.range((-SEAWEED_SPREAD, SEAWEED_SPREAD)),
            ),
            height: rng.range(SEAWEED_HEIGHT_RANGE),
            tilt: Vec2::new(
                rng.range((-SEAWEED_MAX_TILT, SEAWEED_MAX_TILT)),
                rng.range((-SEAWEED_MAX_TILT, SEAWEED_MAX_TILT)),
            ),
            green: rng.range(SEAWEED_GREEN_RANGE),
        }
    }

    pub fn colour(&self) -> Color {
        let (red, blue) = SEAWEED_RED_BLUE;
        Color::srgb(red, self.green, blue)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_xyz(
            self.root.x,
            SEAFLOOR_HEIGHT + self.height / 2.0,
            self.root.y,
        )
        .with_rotation(Quat::from_euler(EulerRot::XYZ, self.tilt.x, 0.0, self.tilt.y))
    }
}

pub fn spawn_seafloor(commands: &mut Commands, assets: &mut SceneAssets, rng: &mut SceneRng) {
    commands.spawn((
        Name::new("seafloor"),
        Mesh3d(assets.meshes.add(Plane3d::default().mesh().size(SEAFLOOR_SIZE, SEAFLOOR_SIZE))),
        MeshMaterial3d(assets.materials.add(StandardMaterial {
            base_color: SEAFLOOR_COLOUR,
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_xyz(0.0, SEAFLOOR_HEIGHT, 0.0),
        SceneOwned,
    ));

    for index in 0..SEAWEED_COUNT {
        let stalk = SeaweedStalk::random(rng);
        let mesh = assets.meshes.add(ConicalFrustum {
            radius_top: SEAWEED_TOP_RADIUS,
            radius_bottom: SEAWEED_BOTTOM_RADIUS,
            height: stalk.height,
        });
        let material = assets.materials.add(StandardMaterial {
            base_color: stalk.colour(),
            emissive: SEAWEED_EMISSIVE,
            perceptual_roughness: 0.8,
            double_sided: true,
            cull_mode: None,
            ..default()
        });
        commands.spawn((
            Name::new(format!("seaweed_{index}")),
            Mesh3d(mesh),
            MeshMaterial3d(material),
            stalk.transform(),
            Seaweed,
            SceneOwned,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stalks_stand_on_the_seafloor() {
        let mut rng = SceneRng::seeded(9);
        for _ in 0..500 {
            let stalk = SeaweedStalk::random(&mut rng);
            assert!((4.0..9.0).contains(&stalk.height));
            assert!(stalk.root.abs().max_element() <= SEAWEED_SPREAD);
            assert!(stalk.tilt.abs().max_element() <= SEAWEED_MAX_TILT);
            assert!((0.5..0.8).contains(&stalk.green));

            let transform = stalk.transform();
            let base = transform.translation.y - stalk.height / 2.0;
            assert!((base - SEAFLOOR_HEIGHT).abs() < 1e-5);
        }
    }

    #[test]
    fn stalks_get_their_own_green() {
        let mut rng = SceneRng::seeded(4);
        let greens: Vec<f32> = (0..SEAWEED_COUNT)
            .map(|_| SeaweedStalk::random(&mut rng).green)
            .collect();
        assert!(greens.iter().any(|green| *green != greens[0]));

        let stalk = SeaweedStalk::random(&mut rng);
        let colour = stalk.colour().to_srgba();
        assert_eq!((colour.red, colour.blue), SEAWEED_RED_BLUE);
        assert_eq!(colour.green, stalk.green);
    }
}
