//! Bubble and light-shaft emitters backed by fixed-size pools.
//!
//! Each emitter spawns its sprite entities up front and recycles them; the
//! simulation never allocates after the scene is built.

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;

use crate::engine::population::SceneRng;
use crate::engine::scene_context::{SceneAssets, SceneOwned};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleShape {
    Bubble,
    Shaft,
}

impl ParticleShape {
    fn mesh(self) -> Mesh {
        match self {
            ParticleShape::Bubble => Sphere::new(0.5).mesh().uv(12, 8),
            ParticleShape::Shaft => Cuboid::new(1.0, 1.0, 1.0).into(),
        }
    }

    fn scale(self, size: f32) -> Vec3 {
        match self {
            ParticleShape::Bubble => Vec3::splat(size),
            ParticleShape::Shaft => Vec3::new(size * 0.15, size * 2.5, size * 0.15),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EmitterConfig {
    pub name: &'static str,
    pub capacity: usize,
    /// Particles per second.
    pub rate: f32,
    pub origin: Vec3,
    pub half_extent: Vec3,
    pub lifetime: (f32, f32),
    pub size: (f32, f32),
    /// Speed multiplier applied to the sampled direction.
    pub power: (f32, f32),
    pub direction_min: Vec3,
    pub direction_max: Vec3,
    pub colour: Color,
    pub additive: bool,
    pub shape: ParticleShape,
}

pub const BUBBLES: EmitterConfig = EmitterConfig {
    name: "bubbles",
    capacity: 100,
    rate: 15.0,
    origin: Vec3::new(0.0, -15.0, 0.0),
    half_extent: Vec3::new(40.0, 0.0, 40.0),
    lifetime: (4.0, 8.0),
    size: (0.1, 0.4),
    power: (0.5, 1.5),
    direction_min: Vec3::new(-0.5, 1.0, -0.5),
    direction_max: Vec3::new(0.5, 1.0, 0.5),
    colour: Color::srgba(0.85, 0.95, 1.0, 0.45),
    additive: false,
    shape: ParticleShape::Bubble,
};

pub const SUN_RAYS: EmitterConfig = EmitterConfig {
    name: "sun_rays",
    capacity: 20,
    rate: 3.0,
    origin: Vec3::new(0.0, 8.0, 0.0),
    half_extent: Vec3::new(20.0, 0.0, 20.0),
    lifetime: (1.5, 3.0),
    size: (1.5, 4.0),
    power: (1.0, 2.0),
    direction_min: Vec3::new(-0.1, -1.0, -0.1),
    direction_max: Vec3::new(0.1, -1.0, 0.1),
    colour: Color::srgba(1.0, 0.95, 0.7, 0.25),
    additive: true,
    shape: ParticleShape::Shaft,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    pub age: f32,
    pub lifetime: f32,
    pub alive: bool,
}

#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    pending: f32,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
            pending: 0.0,
        }
    }

    pub fn slots(&self) -> &[Particle] {
        &self.slots
    }

    pub fn alive(&self) -> usize {
        self.slots.iter().filter(|particle| particle.alive).count()
    }

    /// Age, move and expire live particles, then emit into free slots.
    /// Emission beyond capacity is dropped.
    pub fn step(&mut self, config: &EmitterConfig, dt: f32, rng: &mut SceneRng) {
        for particle in self.slots.iter_mut().filter(|particle| particle.alive) {
            particle.age += dt;
            if particle.age >= particle.lifetime {
                particle.alive = false;
            } else {
                particle.position += particle.velocity * dt;
            }
        }

        self.pending += config.rate * dt;
        while self.pending >= 1.0 {
            self.pending -= 1.0;
            let Some(slot) = self.slots.iter_mut().find(|particle| !particle.alive) else {
                self.pending = 0.0;
                break;
            };
            *slot = emit(config, rng);
        }
    }
}

fn emit(config: &EmitterConfig, rng: &mut SceneRng) -> Particle {
    let direction = rng.vec3(config.direction_min, config.direction_max);
    Particle {
        position: config.origin + rng.vec3(-config.half_extent, config.half_extent),
        velocity: direction * rng.range(config.power),
        size: rng.range(config.size),
        age: 0.0,
        lifetime: rng.range(config.lifetime),
        alive: true,
    }
}

#[derive(Component)]
pub struct ParticleEmitter {
    config: &'static EmitterConfig,
    pool: ParticlePool,
    sprites: Vec<Entity>,
}

#[derive(Component)]
pub struct ParticleSprite;

pub fn spawn_emitter(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    config: &'static EmitterConfig,
) {
    let mesh = assets.meshes.add(config.shape.mesh());
    let material = assets.materials.add(StandardMaterial {
        base_color: config.colour,
        alpha_mode: if config.additive {
            AlphaMode::Add
        } else {
            AlphaMode::Blend
        },
        unlit: config.additive,
        ..default()
    });

    let mut sprites = Vec::with_capacity(config.capacity);
    let emitter = commands
        .spawn((
            Name::new(config.name),
            Transform::default(),
            Visibility::default(),
            SceneOwned,
        ))
        .with_children(|parent| {
            for _ in 0..config.capacity {
                let sprite = parent.spawn((
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::default(),
                    Visibility::Hidden,
                    NotShadowCaster,
                    ParticleSprite,
                ));
                sprites.push(sprite.id());
            }
        })
        .id();

    commands.entity(emitter).insert(ParticleEmitter {
        config,
        pool: ParticlePool::new(config.capacity),
        sprites,
    });
}

pub fn simulate_particles(
    time: Res<Time>,
    mut rng: ResMut<SceneRng>,
    mut emitters: Query<&mut ParticleEmitter>,
    mut sprites: Query<(&mut Transform, &mut Visibility), With<ParticleSprite>>,
) {
    let dt = time.delta_secs();
    for mut emitter in &mut emitters {
        let emitter = &mut *emitter;
        emitter.pool.step(emitter.config, dt, &mut rng);

        for (particle, sprite) in emitter.pool.slots().iter().zip(&emitter.sprites) {
            let Ok((mut transform, mut visibility)) = sprites.get_mut(*sprite) else {
                continue;
            };
            if particle.alive {
                transform.translation = particle.position;
                transform.scale = emitter.config.shape.scale(particle.size);
                visibility.set_if_neq(Visibility::Inherited);
            } else {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}
