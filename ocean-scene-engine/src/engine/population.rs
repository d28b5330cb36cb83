//! Scene population: corals, bottles, fish and turtles.
//!
//! Every entity gets its transform and animation state immediately. Its
//! visual arrives later through a [`ModelRequest`], either as the loaded
//! model or as fallback geometry.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use constants::assets::{BOTTLE_MODELS, CORAL_MODELS, FISH_MODELS, TURTLE_MODELS};
use constants::population::{
    BOTTLE_SCALE, BOTTLE_SPAWN_MAX, BOTTLE_SPAWN_MIN, BOTTLE_SPEED_RANGE, BOTTLE_SPIN_HALF_RANGE,
    CORAL_COUNT, CORAL_FALLBACK_Y, CORAL_LOADED_Y, CORAL_SCALE, CORAL_SCATTER_HALF_EXTENT,
    FISH_BASE_Y_RANGE, FISH_COUNT, FISH_RADIUS_RANGE, FISH_SCALE, FISH_SPEED_RANGE,
    TURTLE_BASE_Y_RANGE, TURTLE_COUNT, TURTLE_RADIUS_RANGE, TURTLE_SCALE, TURTLE_SPEED_RANGE,
};

use crate::engine::animation::{BottleDrift, OrbitSwim};
use crate::engine::config::SceneConfig;
use crate::engine::loading::model_loader::{ModelOutcome, ModelRequest, RequestPurpose};
use crate::engine::scene_context::{SceneOwned, SceneSummary};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Coral,
    Bottle,
    Fish,
    Turtle,
}

impl EntityClass {
    pub const ALL: [EntityClass; 4] = [
        EntityClass::Coral,
        EntityClass::Bottle,
        EntityClass::Fish,
        EntityClass::Turtle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EntityClass::Coral => "coral",
            EntityClass::Bottle => "bottle",
            EntityClass::Fish => "fish",
            EntityClass::Turtle => "turtle",
        }
    }

    /// Model file for the `index`-th entity of this class.
    pub fn model_file(self, index: usize) -> &'static str {
        let files = match self {
            EntityClass::Coral => CORAL_MODELS,
            EntityClass::Bottle => BOTTLE_MODELS,
            EntityClass::Fish => FISH_MODELS,
            EntityClass::Turtle => TURTLE_MODELS,
        };
        files[index % files.len()]
    }
}

/// Static seafloor decoration. Loaded models and fallbacks sit differently.
#[derive(Component, Debug, Clone, Copy)]
pub struct Coral {
    pub fallback_scale: Vec3,
}

/// Random source for spawn placement and particles.
#[derive(Resource)]
pub struct SceneRng(pub Pcg32);

impl SceneRng {
    pub fn seeded(seed: u64) -> Self {
        Self(Pcg32::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::seeded(entropy_seed())
    }

    /// Uniform sample from the half-open range `[min, max)`.
    pub fn range(&mut self, (min, max): (f32, f32)) -> f32 {
        if max <= min {
            return min;
        }
        self.0.random_range(min..max)
    }

    pub fn vec3(&mut self, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            self.range((min.x, max.x)),
            self.range((min.y, max.y)),
            self.range((min.z, max.z)),
        )
    }

    /// `1.0` or `-1.0` with equal probability.
    pub fn direction(&mut self) -> f32 {
        if self.0.random_bool(0.5) { 1.0 } else { -1.0 }
    }
}

impl Default for SceneRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(target_arch = "wasm32")]
fn entropy_seed() -> u64 {
    let high = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let low = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (high << 32) | low
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_seed() -> u64 {
    rand::random()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationCounts {
    pub corals: usize,
    pub bottles: usize,
    pub fish: usize,
    pub turtles: usize,
}

impl PopulationCounts {
    pub fn for_summary(summary: &SceneSummary) -> Self {
        Self {
            corals: CORAL_COUNT,
            bottles: summary.entity_count,
            fish: FISH_COUNT,
            turtles: TURTLE_COUNT,
        }
    }

    pub fn total(&self) -> usize {
        self.corals + self.bottles + self.fish + self.turtles
    }

    fn of(&self, class: EntityClass) -> usize {
        match class {
            EntityClass::Coral => self.corals,
            EntityClass::Bottle => self.bottles,
            EntityClass::Fish => self.fish,
            EntityClass::Turtle => self.turtles,
        }
    }
}

pub fn setup_coral(rng: &mut SceneRng) -> (Transform, Coral) {
    let half = CORAL_SCATTER_HALF_EXTENT;
    let transform = Transform::from_xyz(
        rng.range((-half, half)),
        CORAL_LOADED_Y,
        rng.range((-half, half)),
    )
    .with_scale(Vec3::splat(CORAL_SCALE))
    .with_rotation(Quat::from_rotation_y(rng.range((0.0, TAU))));

    // The fallback frustum is 4.5 tall and ~1 wide; vary it like real coral.
    let height = rng.range((3.0, 6.0)) / 4.5;
    let width = rng.range((0.8, 1.3)) / 1.05;
    let coral = Coral {
        fallback_scale: Vec3::new(width, height, width),
    };
    (transform, coral)
}

pub fn setup_bottle(rng: &mut SceneRng) -> (Transform, BottleDrift) {
    let base_position = rng.vec3(BOTTLE_SPAWN_MIN, BOTTLE_SPAWN_MAX);
    let euler = Vec3::new(rng.range((0.0, PI)), rng.range((0.0, TAU)), rng.range((0.0, PI)));
    let spin = Vec3::splat(-BOTTLE_SPIN_HALF_RANGE);
    let spin = rng.vec3(spin, -spin);

    let drift = BottleDrift {
        time: rng.range((0.0, TAU)),
        speed: rng.range(BOTTLE_SPEED_RANGE),
        base_position,
        euler,
        spin,
    };
    let transform = Transform::from_translation(base_position)
        .with_rotation(drift.rotation())
        .with_scale(Vec3::splat(BOTTLE_SCALE));
    (transform, drift)
}

pub fn setup_fish(rng: &mut SceneRng) -> (Transform, OrbitSwim) {
    let swim = OrbitSwim::fish(
        rng.range((0.0, TAU)),
        rng.range(FISH_SPEED_RANGE),
        rng.range(FISH_RADIUS_RANGE),
        rng.direction(),
        rng.range(FISH_BASE_Y_RANGE),
    );
    (swimmer_transform(&swim, FISH_SCALE), swim)
}

pub fn setup_turtle(rng: &mut SceneRng) -> (Transform, OrbitSwim) {
    let swim = OrbitSwim::turtle(
        rng.range((0.0, TAU)),
        rng.range(TURTLE_SPEED_RANGE),
        rng.range(TURTLE_RADIUS_RANGE),
        rng.direction(),
        rng.range(TURTLE_BASE_Y_RANGE),
    );
    (swimmer_transform(&swim, TURTLE_SCALE), swim)
}

fn swimmer_transform(swim: &OrbitSwim, scale: f32) -> Transform {
    let (position, yaw) = swim.pose();
    Transform::from_translation(position)
        .with_rotation(Quat::from_rotation_y(yaw))
        .with_scale(Vec3::splat(scale))
}

/// Spawn every entity class and request its model. Returns bottle entities
/// in spawn order.
pub fn populate(
    commands: &mut Commands,
    rng: &mut SceneRng,
    config: &SceneConfig,
    generation: u64,
    counts: PopulationCounts,
) -> Vec<Entity> {
    let mut bottles = Vec::with_capacity(counts.bottles);

    for class in EntityClass::ALL {
        for index in 0..counts.of(class) {
            let request = ModelRequest::new(
                config.candidate_paths(class.model_file(index)),
                RequestPurpose::Population { class, index },
                generation,
            );
            let name = Name::new(format!("{}_{index}", class.label()));
            let common = (name, class, request, SceneOwned, Visibility::default());

            match class {
                EntityClass::Coral => {
                    let (transform, coral) = setup_coral(rng);
                    commands.spawn((common, transform, coral));
                }
                EntityClass::Bottle => {
                    let (transform, drift) = setup_bottle(rng);
                    bottles.push(commands.spawn((common, transform, drift)).id());
                }
                EntityClass::Fish => {
                    let (transform, swim) = setup_fish(rng);
                    commands.spawn((common, transform, swim));
                }
                EntityClass::Turtle => {
                    let (transform, swim) = setup_turtle(rng);
                    commands.spawn((common, transform, swim));
                }
            }
        }
    }

    info!(
        "Populating scene: {} corals, {} bottles, {} fish, {} turtles",
        counts.corals, counts.bottles, counts.fish, counts.turtles
    );
    bottles
}

/// Fallback corals are sized individually and rest on the seafloor.
pub fn settle_fallback_corals(
    mut corals: Query<(&Coral, &ModelOutcome, &mut Transform), Added<ModelOutcome>>,
) {
    for (coral, outcome, mut transform) in &mut corals {
        if *outcome == ModelOutcome::Fallback {
            transform.translation.y = CORAL_FALLBACK_Y;
            transform.scale = coral.fallback_scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::world::CommandQueue;

    const SAMPLES: usize = 2_000;

    #[test]
    fn bottles_spawn_inside_the_box() {
        let mut rng = SceneRng::seeded(7);
        for _ in 0..SAMPLES {
            let (transform, drift) = setup_bottle(&mut rng);
            let p = drift.base_position;
            assert!((-25.0..25.0).contains(&p.x));
            assert!((-10.0..8.0).contains(&p.y));
            assert!((-25.0..25.0).contains(&p.z));
            assert!((0.0..TAU).contains(&drift.time));
            assert!((0.15..0.40).contains(&drift.speed));
            assert!(drift.spin.abs().max_element() <= BOTTLE_SPIN_HALF_RANGE);
            assert_eq!(transform.scale, Vec3::splat(BOTTLE_SCALE));
        }
    }

    #[test]
    fn swimmers_use_their_class_ranges() {
        let mut rng = SceneRng::seeded(11);
        for _ in 0..SAMPLES {
            let (_, fish) = setup_fish(&mut rng);
            assert!((12.0..30.0).contains(&fish.radius));
            assert!((-8.0..4.0).contains(&fish.base_y));
            assert!((0.25..0.60).contains(&fish.speed));
            assert!(fish.direction == 1.0 || fish.direction == -1.0);

            let (transform, turtle) = setup_turtle(&mut rng);
            assert!((18.0..33.0).contains(&turtle.radius));
            assert!((-6.0..4.0).contains(&turtle.base_y));
            assert!((0.10..0.25).contains(&turtle.speed));
            assert_eq!(transform.scale, Vec3::splat(TURTLE_SCALE));
        }
    }

    #[test]
    fn corals_scatter_across_the_seafloor() {
        let mut rng = SceneRng::seeded(3);
        for _ in 0..SAMPLES {
            let (transform, coral) = setup_coral(&mut rng);
            assert!((-45.0..45.0).contains(&transform.translation.x));
            assert!((-45.0..45.0).contains(&transform.translation.z));
            assert_eq!(transform.translation.y, CORAL_LOADED_Y);
            assert!(coral.fallback_scale.y > 0.0);
        }
    }

    #[test]
    fn model_files_rotate_through_the_class_table() {
        assert_eq!(EntityClass::Bottle.model_file(0), "waterbottle.glb");
        assert_eq!(EntityClass::Bottle.model_file(4), "waterbottle2.glb");
        assert_eq!(EntityClass::Fish.model_file(7), "fish4.glb");
        assert_eq!(EntityClass::Turtle.model_file(1), "sea_turtle.glb");
    }

    #[test]
    fn populate_spawns_every_class_and_returns_bottles_in_order() {
        let mut world = World::new();
        let mut queue = CommandQueue::default();
        let mut rng = SceneRng::seeded(42);
        let summary = SceneSummary::from_daily_usage(1).unwrap();
        let counts = PopulationCounts::for_summary(&summary);

        let bottles = {
            let mut commands = Commands::new(&mut queue, &world);
            populate(&mut commands, &mut rng, &SceneConfig::default(), 1, counts)
        };
        queue.apply(&mut world);

        assert_eq!(bottles.len(), 50);
        let mut classes = world.query::<&EntityClass>();
        let mut count = |class| classes.iter(&world).filter(|c| **c == class).count();
        assert_eq!(count(EntityClass::Coral), CORAL_COUNT);
        assert_eq!(count(EntityClass::Bottle), 50);
        assert_eq!(count(EntityClass::Fish), FISH_COUNT);
        assert_eq!(count(EntityClass::Turtle), TURTLE_COUNT);

        let names: Vec<String> = bottles
            .iter()
            .map(|entity| world.get::<Name>(*entity).unwrap().to_string())
            .collect();
        assert_eq!(names[0], "bottle_0");
        assert_eq!(names[49], "bottle_49");
        assert!(bottles.iter().all(|e| world.get::<ModelRequest>(*e).is_some()));
    }
}
