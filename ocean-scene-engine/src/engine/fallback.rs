//! Primitive stand-ins for models that failed to load.
//!
//! [`build_fallback`] is a pure description; [`spawn_fallback`] turns it into
//! meshes under an existing entity.

use bevy::color::Alpha;
use bevy::prelude::*;

use constants::palette::{
    BOTTLE_ALPHA, BOTTLE_CAP_COLOUR, BOTTLE_PALETTE, CORAL_EMISSIVE_SCALE, CORAL_PALETTE,
    FISH_EMISSIVE_SCALE, FISH_PALETTE, TURTLE_EMISSIVE_SCALE, TURTLE_PALETTE,
};

use crate::engine::population::EntityClass;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartShape {
    Frustum {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Cylinder {
        radius: f32,
        height: f32,
    },
    Sphere {
        radius: f32,
    },
    /// Flat regular polygon in the local XY plane.
    Polygon {
        circumradius: f32,
        sides: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartMaterial {
    pub colour: Color,
    pub alpha: f32,
    pub emissive_scale: f32,
    pub glossy: bool,
}

impl PartMaterial {
    fn matte(colour: Color, emissive_scale: f32) -> Self {
        Self {
            colour,
            alpha: 1.0,
            emissive_scale,
            glossy: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPart {
    pub name: &'static str,
    pub shape: PartShape,
    pub transform: Transform,
    pub material: PartMaterial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackShape {
    pub class: EntityClass,
    pub palette_index: usize,
    pub parts: Vec<FallbackPart>,
}

/// Describe the primitive composite for `class`. Colours cycle through the
/// class palette by `index`, so repeated runs look the same.
pub fn build_fallback(class: EntityClass, index: usize) -> FallbackShape {
    let (palette_index, parts) = match class {
        EntityClass::Coral => {
            let palette_index = index % CORAL_PALETTE.len();
            let coral = FallbackPart {
                name: "coral",
                shape: PartShape::Frustum {
                    radius_top: 0.15,
                    radius_bottom: 0.525,
                    height: 4.5,
                },
                transform: Transform::IDENTITY,
                material: PartMaterial::matte(CORAL_PALETTE[palette_index], CORAL_EMISSIVE_SCALE),
            };
            (palette_index, vec![coral])
        }
        EntityClass::Bottle => {
            let palette_index = index % BOTTLE_PALETTE.len();
            let plastic = PartMaterial {
                colour: BOTTLE_PALETTE[palette_index],
                alpha: BOTTLE_ALPHA,
                emissive_scale: 0.0,
                glossy: true,
            };
            let parts = vec![
                FallbackPart {
                    name: "body",
                    shape: PartShape::Frustum {
                        radius_top: 0.175,
                        radius_bottom: 0.225,
                        height: 1.8,
                    },
                    transform: Transform::IDENTITY,
                    material: plastic,
                },
                FallbackPart {
                    name: "neck",
                    shape: PartShape::Cylinder {
                        radius: 0.1,
                        height: 0.3,
                    },
                    transform: Transform::from_xyz(0.0, 1.05, 0.0),
                    material: plastic,
                },
                FallbackPart {
                    name: "cap",
                    shape: PartShape::Cylinder {
                        radius: 0.125,
                        height: 0.15,
                    },
                    transform: Transform::from_xyz(0.0, 1.25, 0.0),
                    material: PartMaterial::matte(BOTTLE_CAP_COLOUR, 0.0),
                },
            ];
            (palette_index, parts)
        }
        EntityClass::Fish => {
            let palette_index = index % FISH_PALETTE.len();
            let scales = PartMaterial {
                glossy: true,
                ..PartMaterial::matte(FISH_PALETTE[palette_index], FISH_EMISSIVE_SCALE)
            };
            let parts = vec![
                FallbackPart {
                    name: "body",
                    shape: PartShape::Sphere { radius: 0.5 },
                    transform: Transform::from_scale(Vec3::new(1.6, 0.7, 0.5)),
                    material: scales,
                },
                FallbackPart {
                    name: "tail",
                    shape: PartShape::Polygon {
                        circumradius: 0.4,
                        sides: 3,
                    },
                    transform: Transform::from_xyz(-0.9, 0.0, 0.0)
                        .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
                    material: scales,
                },
            ];
            (palette_index, parts)
        }
        EntityClass::Turtle => {
            let palette_index = index % TURTLE_PALETTE.len();
            let shell_colour =
                PartMaterial::matte(TURTLE_PALETTE[palette_index], TURTLE_EMISSIVE_SCALE);
            let parts = vec![
                FallbackPart {
                    name: "shell",
                    shape: PartShape::Sphere { radius: 1.0 },
                    transform: Transform::from_scale(Vec3::new(1.3, 0.5, 1.6)),
                    material: shell_colour,
                },
                FallbackPart {
                    name: "head",
                    shape: PartShape::Sphere { radius: 0.25 },
                    transform: Transform::from_xyz(0.0, 0.1, 1.3),
                    material: shell_colour,
                },
            ];
            (palette_index, parts)
        }
    };

    FallbackShape {
        class,
        palette_index,
        parts,
    }
}

fn part_mesh(shape: PartShape) -> Mesh {
    match shape {
        PartShape::Frustum {
            radius_top,
            radius_bottom,
            height,
        } => ConicalFrustum {
            radius_top,
            radius_bottom,
            height,
        }
        .into(),
        PartShape::Cylinder { radius, height } => Cylinder::new(radius, height).into(),
        PartShape::Sphere { radius } => Sphere::new(radius).into(),
        PartShape::Polygon {
            circumradius,
            sides,
        } => RegularPolygon::new(circumradius, sides).into(),
    }
}

fn part_material(material: &PartMaterial) -> StandardMaterial {
    StandardMaterial {
        base_color: material.colour.with_alpha(material.alpha),
        emissive: material.colour.to_linear() * material.emissive_scale,
        alpha_mode: if material.alpha < 1.0 {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        perceptual_roughness: if material.glossy { 0.15 } else { 0.7 },
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

/// Spawn the meshes of `shape` as children of `parent`. Parts with equal
/// materials share one material asset.
pub fn spawn_fallback(
    commands: &mut Commands,
    parent: Entity,
    shape: &FallbackShape,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let mut shared: Vec<(PartMaterial, Handle<StandardMaterial>)> = Vec::with_capacity(2);

    commands.entity(parent).with_children(|children| {
        for part in &shape.parts {
            let material = match shared.iter().find(|(key, _)| *key == part.material) {
                Some((_, handle)) => handle.clone(),
                None => {
                    let handle = materials.add(part_material(&part.material));
                    shared.push((part.material, handle.clone()));
                    handle
                }
            };

            children.spawn((
                Mesh3d(meshes.add(part_mesh(part.shape))),
                MeshMaterial3d(material),
                part.transform,
                Name::new(format!(
                    "{}_fallback_{}_{}",
                    shape.class.label(),
                    shape.palette_index,
                    part.name
                )),
            ));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_index_cycles_by_spawn_index() {
        for index in 0..12 {
            assert_eq!(build_fallback(EntityClass::Bottle, index).palette_index, index % 3);
            assert_eq!(build_fallback(EntityClass::Fish, index).palette_index, index % 4);
            assert_eq!(build_fallback(EntityClass::Coral, index).palette_index, index % 4);
            assert_eq!(build_fallback(EntityClass::Turtle, index).palette_index, 0);
        }
    }

    #[test]
    fn fallbacks_are_deterministic() {
        for class in EntityClass::ALL {
            assert_eq!(build_fallback(class, 5), build_fallback(class, 5));
        }
    }

    #[test]
    fn bottle_is_body_neck_and_cap() {
        let bottle = build_fallback(EntityClass::Bottle, 1);
        let names: Vec<_> = bottle.parts.iter().map(|part| part.name).collect();
        assert_eq!(names, ["body", "neck", "cap"]);
        assert_eq!(bottle.parts[0].material.colour, BOTTLE_PALETTE[1]);
        assert_eq!(bottle.parts[0].material.alpha, BOTTLE_ALPHA);
        assert_eq!(bottle.parts[2].material.colour, BOTTLE_CAP_COLOUR);
        assert!(bottle.parts[2].transform.translation.y > bottle.parts[1].transform.translation.y);
    }

    #[test]
    fn fish_tail_is_a_triangle_behind_the_body() {
        let fish = build_fallback(EntityClass::Fish, 0);
        let tail = &fish.parts[1];
        assert_eq!(
            tail.shape,
            PartShape::Polygon {
                circumradius: 0.4,
                sides: 3
            }
        );
        assert!(tail.transform.translation.x < 0.0);
    }
}
