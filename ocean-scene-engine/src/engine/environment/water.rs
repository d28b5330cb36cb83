use std::f32::consts::TAU;

use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor};
use bevy::math::Affine2;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use constants::animation::WATER_UV_DRIFT;
use constants::palette::WATER_COLOUR;

use crate::constants::render_settings::{
    WATER_HEIGHT, WATER_NORMAL_MAP_SIZE, WATER_NORMAL_TILING, WATER_SIZE, WATER_SUBDIVISIONS,
};
use crate::engine::scene_context::{SceneAssets, SceneOwned};

/// The translucent surface overhead. Its normal map scrolls every frame.
#[derive(Component)]
pub struct WaterSurface {
    material: Handle<StandardMaterial>,
}

/// Tileable ripple normals encoded as RGBA8, `size × size` pixels.
pub fn ripple_normal_map(size: u32) -> Vec<u8> {
    const STRENGTH: f32 = 0.35;
    let size = size.max(1);
    let mut data = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let u = x as f32 / size as f32;
            let v = y as f32 / size as f32;
            // Integer frequencies keep the pattern seamless at the edges.
            let du = TAU * 3.0 * (TAU * 3.0 * u).cos() * (TAU * 2.0 * v).cos()
                + TAU * 2.5 * (TAU * 5.0 * (u + v)).cos();
            let dv = -TAU * 2.0 * (TAU * 3.0 * u).sin() * (TAU * 2.0 * v).sin()
                + TAU * 2.5 * (TAU * 5.0 * (u + v)).cos();
            let normal = Vec3::new(-du * STRENGTH / TAU, -dv * STRENGTH / TAU, 1.0).normalize();
            let encoded = (normal * 0.5 + Vec3::splat(0.5)) * 255.0;
            data.extend_from_slice(&[
                encoded.x.round() as u8,
                encoded.y.round() as u8,
                encoded.z.round() as u8,
                255,
            ]);
        }
    }
    data
}

fn ripple_image(size: u32) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        ripple_normal_map(size),
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    );
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..ImageSamplerDescriptor::linear()
    });
    image
}

pub fn spawn_water(commands: &mut Commands, assets: &mut SceneAssets) {
    let plane = Mesh::from(
        Plane3d::default()
            .mesh()
            .size(WATER_SIZE, WATER_SIZE)
            .subdivisions(WATER_SUBDIVISIONS),
    );

    let mut material = StandardMaterial {
        base_color: WATER_COLOUR,
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.1,
        reflectance: 0.6,
        double_sided: true,
        cull_mode: None,
        uv_transform: Affine2::from_scale(Vec2::splat(WATER_NORMAL_TILING)),
        ..default()
    };

    // Normal mapping needs tangents; keep the flat surface if they can't be built.
    let mesh = match plane.clone().with_generated_tangents() {
        Ok(mesh) => {
            let ripples = ripple_image(WATER_NORMAL_MAP_SIZE);
            material.normal_map_texture = Some(assets.images.add(ripples));
            mesh
        }
        Err(error) => {
            warn!("Water ripples disabled: {error}");
            plane
        }
    };

    let material = assets.materials.add(material);
    commands.spawn((
        Name::new("water_surface"),
        Mesh3d(assets.meshes.add(mesh)),
        MeshMaterial3d(material.clone()),
        Transform::from_xyz(0.0, WATER_HEIGHT, 0.0),
        WaterSurface { material },
        SceneOwned,
    ));
}

/// Offset the water texture coordinates by a fixed amount per frame.
pub fn drift_water(
    surfaces: Query<&WaterSurface>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let drift = Vec2::new(WATER_UV_DRIFT.0, WATER_UV_DRIFT.1);
    for surface in &surfaces {
        let Some(material) = materials.get_mut(&surface.material) else {
            continue;
        };
        let offset = material.uv_transform.translation + drift;
        material.uv_transform.translation = offset - offset.floor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_map_points_out_of_the_surface() {
        let data = ripple_normal_map(32);
        assert_eq!(data.len(), 32 * 32 * 4);
        for pixel in data.chunks_exact(4) {
            assert!(pixel[2] > 127, "normal bends below the surface: {pixel:?}");
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn normal_map_is_not_flat() {
        let data = ripple_normal_map(16);
        let first = &data[0..4];
        assert!(data.chunks_exact(4).any(|pixel| pixel != first));
    }

    #[test]
    fn drift_wraps_the_offset() {
        let mut app = App::new();
        app.init_resource::<Assets<StandardMaterial>>()
            .add_systems(Update, drift_water);

        let material = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial::default());
        app.world_mut().spawn(WaterSurface {
            material: material.clone(),
        });

        for _ in 0..600 {
            app.update();
        }

        let materials = app.world().resource::<Assets<StandardMaterial>>();
        let offset = materials.get(&material).unwrap().uv_transform.translation;
        // 600 × 0.002 = 1.2 wraps to 0.2; 600 × 0.0015 = 0.9 does not wrap.
        assert!((offset.x - 0.2).abs() < 1e-3, "got {offset}");
        assert!((offset.y - 0.9).abs() < 1e-3, "got {offset}");
    }
}
