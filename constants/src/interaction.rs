use bevy::math::Vec3;
use std::time::Duration;

/// The camera counts as "at" the marker strictly inside this distance.
pub const PROXIMITY_THRESHOLD: f32 = 15.0;

/// Interval between proximity polls while the marker is active.
pub const PROXIMITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One bottle disappears per interval during clean-up.
pub const HIDE_INTERVAL: Duration = Duration::from_millis(200);

pub const FADE_DURATION: Duration = Duration::from_millis(800);
pub const FADE_TICK: Duration = Duration::from_millis(16);

pub const MARKER_POSITION: Vec3 = Vec3::new(0.0, -2.0, 0.0);
pub const MARKER_SCALE: f32 = 3.0;

pub const INDICATOR_DIAMETER: f32 = 6.0;
pub const INDICATOR_THICKNESS: f32 = 0.15;
pub const INDICATOR_ALPHA: f32 = 0.6;

pub const LABEL_POSITION: Vec3 = Vec3::new(0.0, 6.0, 0.0);
pub const LABEL_RING_DIAMETER: f32 = 1.5;
pub const LABEL_RING_THICKNESS: f32 = 0.15;
pub const LABEL_RING_OFFSET_X: f32 = 0.8;
