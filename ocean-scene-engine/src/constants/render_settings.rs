use bevy::prelude::*;

pub const CAMERA_START: Vec3 = Vec3::new(0.0, -2.0, 35.0);
pub const CAMERA_TARGET: Vec3 = Vec3::new(0.0, -5.0, 0.0);
/// Distance moved per input tick.
pub const CAMERA_STEP: f32 = 0.5;
/// The camera never sinks below this height.
pub const CAMERA_MIN_Y: f32 = -14.0;
pub const CAMERA_LOOK_SENSITIVITY: f32 = 0.004;
pub const CAMERA_PITCH_LIMIT: f32 = 1.4;

pub const AMBIENT_BRIGHTNESS: f32 = 600.0;
pub const AMBIENT_COLOUR: Color = Color::srgb(0.55, 0.8, 0.95);
pub const SUN_DIRECTION: Vec3 = Vec3::new(-0.3, -1.0, -0.2);
pub const SUN_ILLUMINANCE: f32 = 6_000.0;
pub const SUN_COLOUR: Color = Color::srgb(0.85, 0.95, 1.0);
pub const POINT_LIGHTS: [(Vec3, f32); 2] = [
    (Vec3::new(15.0, 8.0, 15.0), 600_000.0),
    (Vec3::new(-15.0, 5.0, -15.0), 500_000.0),
];
pub const POINT_LIGHT_RANGE: f32 = 60.0;
pub const POINT_LIGHT_COLOUR: Color = Color::srgb(0.4, 0.75, 1.0);

pub const FOG_DENSITY: f32 = 0.008;

pub const WATER_SIZE: f32 = 200.0;
pub const WATER_SUBDIVISIONS: u32 = 64;
pub const WATER_HEIGHT: f32 = 10.0;
pub const WATER_NORMAL_MAP_SIZE: u32 = 128;
/// Texture repeats across the water plane.
pub const WATER_NORMAL_TILING: f32 = 8.0;

pub const SEAFLOOR_SIZE: f32 = 200.0;
pub const SEAFLOOR_HEIGHT: f32 = -16.0;
pub const SEAWEED_SPREAD: f32 = 40.0;
pub const SEAWEED_HEIGHT_RANGE: (f32, f32) = (4.0, 9.0);
pub const SEAWEED_TOP_RADIUS: f32 = 0.025;
pub const SEAWEED_BOTTOM_RADIUS: f32 = 0.075;
pub const SEAWEED_MAX_TILT: f32 = 0.15;
/// Red and blue of every stalk; green is drawn per stalk from the range.
pub const SEAWEED_RED_BLUE: (f32, f32) = (0.1, 0.2);
pub const SEAWEED_GREEN_RANGE: (f32, f32) = (0.5, 0.8);
pub const SEAWEED_EMISSIVE: LinearRgba = LinearRgba::rgb(0.02, 0.1, 0.03);

pub const SKYBOX_SIZE: f32 = 400.0;
