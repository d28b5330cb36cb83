use bevy::core_pipeline::bloom::Bloom;
use bevy::input::mouse::MouseMotion;
use bevy::math::EulerRot;
use bevy::prelude::*;
use bevy::window::WindowResized;
use serde::Deserialize;
use serde_json::json;

use crate::constants::render_settings::{
    CAMERA_LOOK_SENSITIVITY, CAMERA_MIN_Y, CAMERA_PITCH_LIMIT, CAMERA_START, CAMERA_STEP,
    CAMERA_TARGET,
};
use crate::engine::api::SceneNotification;
use crate::engine::environment::sky::underwater_fog;
use crate::engine::scene_context::SceneOwned;

/// The scene's first-person camera.
#[derive(Component, Debug, Clone, Copy)]
pub struct OceanCamera {
    pub yaw: f32,
    pub pitch: f32,
}

impl OceanCamera {
    pub fn from_transform(transform: &Transform) -> Self {
        let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        Self { yaw, pitch }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn look(&mut self, delta: Vec2) {
        self.yaw -= delta.x * CAMERA_LOOK_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * CAMERA_LOOK_SENSITIVITY)
            .clamp(-CAMERA_PITCH_LIMIT, CAMERA_PITCH_LIMIT);
    }
}

pub fn spawn_ocean_camera(commands: &mut Commands) -> Entity {
    let transform = Transform::from_translation(CAMERA_START).looking_at(CAMERA_TARGET, Vec3::Y);
    commands
        .spawn((
            Name::new("ocean_camera"),
            Camera3d::default(),
            // HDR output so the emissive marker and particles bloom.
            Camera {
                hdr: true,
                ..default()
            },
            Bloom::NATURAL,
            transform,
            OceanCamera::from_transform(&transform),
            underwater_fog(),
            SceneOwned,
        ))
        .id()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Forward,
    Back,
    Left,
    Right,
}

/// Press or release of an on-screen direction button.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CameraMoveInput {
    pub direction: MoveDirection,
    pub active: bool,
}

/// Held state of the on-screen direction buttons.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalPad {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionalPad {
    pub fn apply(&mut self, input: CameraMoveInput) {
        let held = match input.direction {
            MoveDirection::Forward => &mut self.forward,
            MoveDirection::Back => &mut self.back,
            MoveDirection::Left => &mut self.left,
            MoveDirection::Right => &mut self.right,
        };
        *held = input.active;
    }

    /// `x` is strafe (right positive), `y` is forward.
    pub fn intent(&self) -> Vec2 {
        let axis = |positive: bool, negative: bool| f32::from(positive) - f32::from(negative);
        Vec2::new(axis(self.right, self.left), axis(self.forward, self.back))
    }
}

pub fn apply_camera_move_input(
    mut inputs: EventReader<CameraMoveInput>,
    mut pad: ResMut<DirectionalPad>,
) {
    for input in inputs.read() {
        pad.apply(*input);
    }
}

/// Fixed-length displacement for one input tick along the view direction.
pub fn movement_step(rotation: Quat, intent: Vec2) -> Vec3 {
    let forward = rotation * Vec3::NEG_Z;
    let right = rotation * Vec3::X;
    (forward * intent.y + right * intent.x).normalize_or_zero() * CAMERA_STEP
}

pub fn clamp_to_seafloor(translation: Vec3) -> Vec3 {
    Vec3::new(translation.x, translation.y.max(CAMERA_MIN_Y), translation.z)
}

fn keyboard_intent(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let mut intent = Vec2::ZERO;
    if keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        intent.y += 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        intent.y -= 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        intent.x += 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        intent.x -= 1.0;
    }
    intent
}

// Keyboard, on-screen pad, mouse drag and touch drag.
pub fn camera_controller(
    mut camera_query: Query<(&mut Transform, &mut OceanCamera)>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    touches: Res<Touches>,
    pad: Res<DirectionalPad>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    let Ok((mut transform, mut camera)) = camera_query.single_mut() else {
        return;
    };

    let mut look = Vec2::ZERO;
    if mouse_button.pressed(MouseButton::Left) {
        look += mouse_delta;
    }
    if let Some(touch) = touches.iter().next() {
        look += touch.delta();
    }
    if look != Vec2::ZERO {
        camera.look(look);
        transform.rotation = camera.rotation();
    }

    let intent = (keyboard_intent(&keyboard) + pad.intent()).clamp(Vec2::NEG_ONE, Vec2::ONE);
    if intent != Vec2::ZERO {
        transform.translation += movement_step(transform.rotation, intent);
    }
}

pub fn clamp_camera_height(mut cameras: Query<&mut Transform, With<OceanCamera>>) {
    for mut transform in &mut cameras {
        if transform.translation.y < CAMERA_MIN_Y {
            transform.translation = clamp_to_seafloor(transform.translation);
        }
    }
}

pub fn handle_viewport_resize(
    mut resized: EventReader<WindowResized>,
    mut notifications: EventWriter<SceneNotification>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    notifications.write(SceneNotification::new(
        "viewport_resized",
        json!({ "width": last.width, "height": last.height }),
    ));
}

/// Input-driven camera systems. Needs the input plugin.
pub struct CameraControlPlugin;

impl Plugin for CameraControlPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                camera_controller
                    .after(apply_camera_move_input)
                    .before(clamp_camera_height),
                handle_viewport_resize,
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::world::CommandQueue;

    use super::*;

    fn start() -> Transform {
        Transform::from_translation(CAMERA_START).looking_at(CAMERA_TARGET, Vec3::Y)
    }

    #[test]
    fn camera_renders_hdr_with_bloom() {
        let mut world = World::new();
        let mut queue = CommandQueue::default();
        let camera = spawn_ocean_camera(&mut Commands::new(&mut queue, &world));
        queue.apply(&mut world);

        assert_eq!(world.get::<Camera>(camera).map(|camera| camera.hdr), Some(true));
        assert!(world.get::<Bloom>(camera).is_some());
        assert!(world.get::<OceanCamera>(camera).is_some());
    }

    #[test]
    fn each_tick_moves_a_fixed_distance() {
        let rotation = start().rotation;
        for intent in [Vec2::Y, Vec2::NEG_Y, Vec2::X, Vec2::ONE] {
            let step = movement_step(rotation, intent);
            assert!((step.length() - CAMERA_STEP).abs() < 1e-5);
        }
        assert_eq!(movement_step(rotation, Vec2::ZERO), Vec3::ZERO);
    }

    #[test]
    fn forward_heads_towards_the_target() {
        let transform = start();
        let step = movement_step(transform.rotation, Vec2::Y);
        let before = transform.translation.distance(CAMERA_TARGET);
        let after = (transform.translation + step).distance(CAMERA_TARGET);
        assert!((before - after - CAMERA_STEP).abs() < 1e-4);
    }

    #[test]
    fn height_is_clamped_above_the_seafloor() {
        assert_eq!(
            clamp_to_seafloor(Vec3::new(1.0, -20.0, 2.0)),
            Vec3::new(1.0, CAMERA_MIN_Y, 2.0)
        );
        assert_eq!(clamp_to_seafloor(Vec3::new(0.0, 3.0, 0.0)).y, 3.0);
    }

    #[test]
    fn pad_tracks_press_and_release() {
        let mut pad = DirectionalPad::default();
        pad.apply(CameraMoveInput {
            direction: MoveDirection::Forward,
            active: true,
        });
        pad.apply(CameraMoveInput {
            direction: MoveDirection::Left,
            active: true,
        });
        assert_eq!(pad.intent(), Vec2::new(-1.0, 1.0));

        pad.apply(CameraMoveInput {
            direction: MoveDirection::Forward,
            active: false,
        });
        assert_eq!(pad.intent(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn camera_move_params_deserialize() {
        let input: CameraMoveInput =
            serde_json::from_value(json!({ "direction": "back", "active": true })).unwrap();
        assert_eq!(input.direction, MoveDirection::Back);
        assert!(input.active);
    }

    #[test]
    fn pitch_is_limited() {
        let mut camera = OceanCamera::from_transform(&start());
        camera.look(Vec2::new(0.0, -100_000.0));
        assert_eq!(camera.pitch, CAMERA_PITCH_LIMIT);
    }
}
