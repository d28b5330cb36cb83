//! Per-frame animation of drifting bottles and orbiting swimmers.
//!
//! Each entity owns a phase accumulator advanced by a fixed step per frame.
//! Position is recomputed from the phase alone, never integrated, so long
//! sessions do not drift.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use constants::animation::{
    BOTTLE_BOB_AMPLITUDE, BOTTLE_BOB_FREQUENCY, BOTTLE_SWAY_AMPLITUDE, BOTTLE_SWAY_Z_RATIO,
    BOTTLE_TIME_STEP, FISH_BOB_AMPLITUDE, FISH_BOB_FREQUENCY, FISH_TIME_STEP,
    TURTLE_BOB_AMPLITUDE, TURTLE_BOB_FREQUENCY, TURTLE_TIME_STEP,
};

/// A bottle swaying around its spawn point while tumbling.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BottleDrift {
    pub time: f32,
    pub speed: f32,
    pub base_position: Vec3,
    /// Accumulated Euler rotation (x, y, z).
    pub euler: Vec3,
    /// Added to `euler` every frame.
    pub spin: Vec3,
}

impl BottleDrift {
    pub fn position_at(&self, time: f32) -> Vec3 {
        self.base_position
            + Vec3::new(
                (time * self.speed).sin() * BOTTLE_SWAY_AMPLITUDE,
                (time * BOTTLE_BOB_FREQUENCY).sin() * BOTTLE_BOB_AMPLITUDE,
                (time * self.speed * BOTTLE_SWAY_Z_RATIO).cos() * BOTTLE_SWAY_AMPLITUDE,
            )
    }

    pub fn position(&self) -> Vec3 {
        self.position_at(self.time)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.euler.y, self.euler.x, self.euler.z)
    }

    pub fn advance(&mut self) {
        self.time += BOTTLE_TIME_STEP;
        self.euler += self.spin;
    }
}

/// Circular swim around the scene origin with a vertical bob.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitSwim {
    pub time: f32,
    pub step: f32,
    pub speed: f32,
    pub radius: f32,
    /// `1.0` counter-clockwise, `-1.0` clockwise.
    pub direction: f32,
    pub base_y: f32,
    pub bob_frequency: f32,
    pub bob_amplitude: f32,
}

impl OrbitSwim {
    pub fn fish(time: f32, speed: f32, radius: f32, direction: f32, base_y: f32) -> Self {
        Self {
            time,
            step: FISH_TIME_STEP,
            speed,
            radius,
            direction,
            base_y,
            bob_frequency: FISH_BOB_FREQUENCY,
            bob_amplitude: FISH_BOB_AMPLITUDE,
        }
    }

    pub fn turtle(time: f32, speed: f32, radius: f32, direction: f32, base_y: f32) -> Self {
        Self {
            time,
            step: TURTLE_TIME_STEP,
            speed,
            radius,
            direction,
            base_y,
            bob_frequency: TURTLE_BOB_FREQUENCY,
            bob_amplitude: TURTLE_BOB_AMPLITUDE,
        }
    }

    /// Position and heading (yaw) at phase `time`. The heading is
    /// perpendicular to the radius so the swimmer faces where it is going.
    pub fn pose_at(&self, time: f32) -> (Vec3, f32) {
        let angle = time * self.speed * self.direction;
        let position = Vec3::new(
            angle.cos() * self.radius,
            self.base_y + (time * self.bob_frequency).sin() * self.bob_amplitude,
            angle.sin() * self.radius,
        );
        let yaw = if self.direction > 0.0 {
            angle + FRAC_PI_2
        } else {
            angle - FRAC_PI_2
        };
        (position, yaw)
    }

    pub fn pose(&self) -> (Vec3, f32) {
        self.pose_at(self.time)
    }

    pub fn advance(&mut self) {
        self.time += self.step;
    }
}

pub fn animate_bottles(mut bottles: Query<(&mut BottleDrift, &mut Transform)>) {
    for (mut drift, mut transform) in &mut bottles {
        drift.advance();
        transform.translation = drift.position();
        transform.rotation = drift.rotation();
    }
}

pub fn animate_swimmers(mut swimmers: Query<(&mut OrbitSwim, &mut Transform)>) {
    for (mut swim, mut transform) in &mut swimmers {
        swim.advance();
        let (position, yaw) = swim.pose();
        transform.translation = position;
        transform.rotation = Quat::from_rotation_y(yaw);
    }
}
