/// Fixed phase increments applied once per rendered frame.
pub const BOTTLE_TIME_STEP: f32 = 0.008;
pub const FISH_TIME_STEP: f32 = 0.01;
pub const TURTLE_TIME_STEP: f32 = 0.005;

/// Horizontal sway amplitude of a drifting bottle.
pub const BOTTLE_SWAY_AMPLITUDE: f32 = 2.5;
/// The z sway runs slightly slower than the x sway.
pub const BOTTLE_SWAY_Z_RATIO: f32 = 0.8;
pub const BOTTLE_BOB_FREQUENCY: f32 = 0.4;
pub const BOTTLE_BOB_AMPLITUDE: f32 = 1.2;

pub const FISH_BOB_FREQUENCY: f32 = 1.5;
pub const FISH_BOB_AMPLITUDE: f32 = 0.8;
pub const TURTLE_BOB_FREQUENCY: f32 = 0.8;
pub const TURTLE_BOB_AMPLITUDE: f32 = 0.5;

/// Marker ring and label spin, radians per frame.
pub const MARKER_DECOR_SPIN: f32 = 0.003;

/// Water ripple texture drift per frame (u, v).
pub const WATER_UV_DRIFT: (f32, f32) = (0.002, 0.0015);
