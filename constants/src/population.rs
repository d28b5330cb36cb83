use bevy::math::Vec3;

/// Days per year used for the five-year projection.
pub const DAYS_PER_YEAR: u64 = 365;

/// Projection horizon in years.
pub const PROJECTION_YEARS: u64 = 5;

/// One bottle entity is spawned per this many projected bottles.
pub const BOTTLES_PER_ENTITY: u64 = 10;

/// Hard cap on bottle entities regardless of input.
pub const MAX_BOTTLE_ENTITIES: usize = 50;

pub const CORAL_COUNT: usize = 12;
pub const FISH_COUNT: usize = 15;
pub const TURTLE_COUNT: usize = 2;
pub const SEAWEED_COUNT: usize = 20;

/// Bottles spawn inside this half-open box.
pub const BOTTLE_SPAWN_MIN: Vec3 = Vec3::new(-25.0, -10.0, -25.0);
pub const BOTTLE_SPAWN_MAX: Vec3 = Vec3::new(25.0, 8.0, 25.0);
pub const BOTTLE_SCALE: f32 = 0.8;

/// Corals scatter over a square of this half extent on the seafloor.
pub const CORAL_SCATTER_HALF_EXTENT: f32 = 45.0;
pub const CORAL_LOADED_Y: f32 = -15.5;
pub const CORAL_FALLBACK_Y: f32 = -15.0;
pub const CORAL_SCALE: f32 = 3.0;

pub const FISH_SCALE: f32 = 0.4;
pub const FISH_RADIUS_RANGE: (f32, f32) = (12.0, 30.0);
pub const FISH_BASE_Y_RANGE: (f32, f32) = (-8.0, 4.0);
pub const FISH_SPEED_RANGE: (f32, f32) = (0.25, 0.60);

pub const TURTLE_SCALE: f32 = 0.15;
pub const TURTLE_RADIUS_RANGE: (f32, f32) = (18.0, 33.0);
pub const TURTLE_BASE_Y_RANGE: (f32, f32) = (-6.0, 4.0);
pub const TURTLE_SPEED_RANGE: (f32, f32) = (0.10, 0.25);

pub const BOTTLE_SPEED_RANGE: (f32, f32) = (0.15, 0.40);

/// Per-axis spin in radians per frame, drawn from `[-x, x)`.
pub const BOTTLE_SPIN_HALF_RANGE: f32 = 0.004;
