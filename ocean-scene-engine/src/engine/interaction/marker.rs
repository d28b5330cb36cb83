use std::f32::consts::FRAC_PI_2;

use bevy::color::Alpha;
use bevy::prelude::*;
use serde::Serialize;
use serde_json::Value;

use constants::animation::MARKER_DECOR_SPIN;
use constants::assets::MARKER_MODEL;
use constants::interaction::{
    INDICATOR_ALPHA, INDICATOR_DIAMETER, INDICATOR_THICKNESS, LABEL_POSITION,
    LABEL_RING_DIAMETER, LABEL_RING_OFFSET_X, LABEL_RING_THICKNESS, MARKER_POSITION, MARKER_SCALE,
};
use constants::palette::MARKER_GLOW;

use crate::engine::api::{RequestId, SceneCommand, SceneResponse};
use crate::engine::config::SceneConfig;
use crate::engine::error::SceneError;
use crate::engine::interaction::InteractionPhase;
use crate::engine::loading::model_loader::{
    ModelOutcome, ModelRequest, ModelResolved, RequestPurpose,
};
use crate::engine::scene_context::{SceneAssets, SceneContext, SceneOwned};

/// Entities making up the marker: the loaded model, the indicator ring
/// around it and the label floating above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerParts {
    pub root: Entity,
    pub indicator: Entity,
    pub label: Entity,
}

impl MarkerParts {
    pub fn entities(&self) -> [Entity; 3] {
        [self.root, self.indicator, self.label]
    }
}

#[derive(Component)]
pub struct MarkerRoot;

/// Spinning decoration around the marker.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerDecor {
    /// Spins about X.
    Indicator,
    /// Spins about Z.
    Label,
}

/// What callers see of the marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerHandle {
    pub position: [f32; 3],
    pub scale: f32,
    pub visible: bool,
}

impl MarkerHandle {
    pub fn new(transform: &Transform, visibility: &Visibility) -> Self {
        Self {
            position: transform.translation.to_array(),
            scale: transform.scale.x,
            visible: *visibility != Visibility::Hidden,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Marker load in flight and the requests waiting on it.
#[derive(Resource, Default, Debug)]
pub struct PendingMarker {
    entity: Option<Entity>,
    generation: u64,
    waiters: Vec<RequestId>,
}

impl PendingMarker {
    pub fn is_loading(&self) -> bool {
        self.entity.is_some()
    }

    pub fn track(&mut self, root: Entity, generation: u64, request: RequestId) {
        self.entity = Some(root);
        self.generation = generation;
        self.waiters.push(request);
    }

    /// Forget the load and hand back everyone still waiting on it.
    pub fn cancel(&mut self) -> Vec<RequestId> {
        self.entity = None;
        std::mem::take(&mut self.waiters)
    }

    /// Give up on the load in flight: the root to despawn and its waiters.
    pub fn abandon(&mut self) -> Option<(Entity, Vec<RequestId>)> {
        let root = self.entity?;
        Some((root, self.cancel()))
    }
}

pub fn marker_root_transform() -> Transform {
    Transform::from_translation(MARKER_POSITION)
        .with_rotation(Quat::from_rotation_x(-FRAC_PI_2))
        .with_scale(Vec3::splat(MARKER_SCALE))
}

fn glow_material(alpha: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: MARKER_GLOW.with_alpha(alpha),
        emissive: MARKER_GLOW.to_linear() * 0.8,
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

/// Spawn the indicator ring and the twin-ring label.
pub fn spawn_marker_decor(commands: &mut Commands, assets: &mut SceneAssets) -> (Entity, Entity) {
    let indicator = commands
        .spawn((
            Name::new("marker_indicator"),
            Mesh3d(assets.meshes.add(Torus {
                minor_radius: INDICATOR_THICKNESS / 2.0,
                major_radius: INDICATOR_DIAMETER / 2.0,
            })),
            MeshMaterial3d(assets.materials.add(glow_material(INDICATOR_ALPHA))),
            Transform::from_translation(MARKER_POSITION),
            MarkerDecor::Indicator,
            SceneOwned,
        ))
        .id();

    let ring = assets.meshes.add(Torus {
        minor_radius: LABEL_RING_THICKNESS / 2.0,
        major_radius: LABEL_RING_DIAMETER / 2.0,
    });
    let material = assets.materials.add(glow_material(1.0));
    let label = commands
        .spawn((
            Name::new("marker_label"),
            Transform::from_translation(LABEL_POSITION),
            Visibility::default(),
            MarkerDecor::Label,
            SceneOwned,
        ))
        .with_children(|parent| {
            for x in [-LABEL_RING_OFFSET_X, LABEL_RING_OFFSET_X] {
                parent.spawn((
                    Mesh3d(ring.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::from_xyz(x, 0.0, 0.0).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
                ));
            }
        })
        .id();

    (indicator, label)
}

pub fn handle_spawn_marker_commands(
    mut commands: Commands,
    mut events: EventReader<SceneCommand>,
    context: Option<Res<SceneContext>>,
    config: Res<SceneConfig>,
    mut pending: ResMut<PendingMarker>,
    mut next_phase: ResMut<NextState<InteractionPhase>>,
    markers: Query<(&Transform, &Visibility), With<MarkerRoot>>,
    mut responses: EventWriter<SceneResponse>,
) {
    for event in events.read() {
        let SceneCommand::SpawnMarker { request } = event else {
            continue;
        };
        let Some(context) = context.as_deref() else {
            responses.write(SceneResponse::err(request.clone(), SceneError::NoActiveScene));
            continue;
        };

        if pending.is_loading() {
            responses.write(SceneResponse::err(
                request.clone(),
                SceneError::OperationPending("spawn_marker_object"),
            ));
            continue;
        }

        if let Some(parts) = context.marker {
            let handle = markers
                .get(parts.root)
                .map(|(transform, visibility)| MarkerHandle::new(transform, visibility).to_value())
                .unwrap_or(Value::Null);
            responses.write(SceneResponse::ok(request.clone(), handle));
            continue;
        }

        let root = commands
            .spawn((
                Name::new("marker"),
                marker_root_transform(),
                Visibility::default(),
                MarkerRoot,
                SceneOwned,
                ModelRequest::new(
                    config.candidate_paths(MARKER_MODEL),
                    RequestPurpose::Marker,
                    context.generation,
                ),
            ))
            .id();

        info!("Spawning marker object");
        pending.track(root, context.generation, request.clone());
        next_phase.set(InteractionPhase::MarkerSpawning);
    }
}

pub fn finish_marker_spawn(
    mut commands: Commands,
    mut resolved: EventReader<ModelResolved>,
    mut assets: SceneAssets,
    mut context: Option<ResMut<SceneContext>>,
    mut pending: ResMut<PendingMarker>,
    mut next_phase: ResMut<NextState<InteractionPhase>>,
    mut responses: EventWriter<SceneResponse>,
) {
    for event in resolved.read() {
        if event.purpose != RequestPurpose::Marker || pending.entity != Some(event.entity) {
            continue;
        }
        let started_under = pending.generation;
        let waiters = pending.cancel();
        let Some(context) = context.as_deref_mut() else {
            continue;
        };
        if context.generation != event.generation || started_under != event.generation {
            continue;
        }

        let result = if event.outcome == ModelOutcome::Loaded {
            let (indicator, label) = spawn_marker_decor(&mut commands, &mut assets);
            context.marker = Some(MarkerParts {
                root: event.entity,
                indicator,
                label,
            });
            next_phase.set(InteractionPhase::MarkerActive);
            info!("Marker object ready");
            MarkerHandle::new(&marker_root_transform(), &Visibility::Inherited).to_value()
        } else {
            warn!("Marker model {MARKER_MODEL} unavailable; nothing spawned");
            commands.entity(event.entity).try_despawn();
            next_phase.set(InteractionPhase::Idle);
            Value::Null
        };

        for request in waiters {
            responses.write(SceneResponse::ok(request, result.clone()));
        }
    }
}

pub fn spin_marker_decor(mut decor: Query<(&MarkerDecor, &mut Transform)>) {
    for (kind, mut transform) in &mut decor {
        match kind {
            MarkerDecor::Indicator => transform.rotate_x(MARKER_DECOR_SPIN),
            MarkerDecor::Label => transform.rotate_z(MARKER_DECOR_SPIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handle_serializes_position_scale_and_visibility() {
        let handle = MarkerHandle::new(&marker_root_transform(), &Visibility::Inherited);
        assert_eq!(
            handle.to_value(),
            json!({ "position": [0.0, -2.0, 0.0], "scale": 3.0, "visible": true })
        );
        let hidden = MarkerHandle::new(&marker_root_transform(), &Visibility::Hidden);
        assert!(!hidden.visible);
    }

    #[test]
    fn model_z_axis_points_up() {
        let rotation = marker_root_transform().rotation;
        assert!((rotation * Vec3::Z - Vec3::Y).length() < 1e-5);
        assert!((rotation * Vec3::Y - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn decor_spins_a_fixed_angle_per_frame() {
        let mut world = World::new();
        let ring = world
            .spawn((MarkerDecor::Indicator, Transform::default()))
            .id();
        let label = world.spawn((MarkerDecor::Label, Transform::default())).id();
        let mut schedule = Schedule::default();
        schedule.add_systems(spin_marker_decor);
        for _ in 0..10 {
            schedule.run(&mut world);
        }

        let (x, _, _) = world.get::<Transform>(ring).unwrap().rotation.to_euler(EulerRot::XYZ);
        assert!((x - 10.0 * MARKER_DECOR_SPIN).abs() < 1e-5);
        let (_, _, z) = world.get::<Transform>(label).unwrap().rotation.to_euler(EulerRot::XYZ);
        assert!((z - 10.0 * MARKER_DECOR_SPIN).abs() < 1e-5);
    }

    mod scene {
        use serde_json::json;

        use super::super::*;
        use crate::engine::test_app::*;

        fn marker_roots(app: &mut App) -> usize {
            app.world_mut()
                .query_filtered::<Entity, With<MarkerRoot>>()
                .iter(app.world())
                .count()
        }

        #[test]
        fn missing_marker_model_resolves_to_null() {
            let mut app = headless_app();
            init_scene(&mut app);

            send(&mut app, SceneCommand::SpawnMarker { request: request(5) });
            let (result, _) = run_until_response(&mut app, 5, 3);
            assert_eq!(result, Ok(Value::Null));
            app.update();
            assert_eq!(marker_roots(&mut app), 0);
            assert!(context(&app).marker.is_none());
            assert_eq!(phase(&app), InteractionPhase::Idle);

            // A later attempt is allowed and fails the same way.
            send(&mut app, SceneCommand::SpawnMarker { request: request(6) });
            let (result, _) = run_until_response(&mut app, 6, 3);
            assert_eq!(result, Ok(Value::Null));
        }

        #[test]
        fn loaded_marker_gets_decor_and_answers_with_a_handle() {
            let mut app = headless_app();
            init_scene(&mut app);
            let root = begin_marker_load(&mut app, 5);
            assert_eq!(response(&app, 5), None);

            resolve_marker(&mut app, root, ModelOutcome::Loaded);
            app.update();
            let handle = response(&app, 5).unwrap().unwrap();
            assert_eq!(handle["position"], json!([0.0, -2.0, 0.0]));
            assert_eq!(handle["scale"], json!(3.0));
            assert_eq!(handle["visible"], json!(true));

            let parts = context(&app).marker.unwrap();
            assert_eq!(parts.root, root);
            let mut decor = app.world_mut().query::<(Entity, &MarkerDecor)>();
            let decor: Vec<_> = decor.iter(app.world()).collect();
            assert!(decor.contains(&(parts.indicator, &MarkerDecor::Indicator)));
            assert!(decor.contains(&(parts.label, &MarkerDecor::Label)));

            app.update();
            assert_eq!(phase(&app), InteractionPhase::MarkerActive);
            assert_eq!(marker_roots(&mut app), 1);
        }

        #[test]
        fn existing_marker_is_returned_again() {
            let mut app = headless_app();
            init_scene(&mut app);
            attach_marker(&mut app);

            send(&mut app, SceneCommand::SpawnMarker { request: request(5) });
            let (result, frames) = run_until_response(&mut app, 5, 3);
            assert_eq!(frames, 1);
            let handle = result.unwrap();
            assert_eq!(handle["position"], json!([0.0, -2.0, 0.0]));
            assert_eq!(handle["visible"], json!(true));
            assert_eq!(marker_roots(&mut app), 1);
        }

        #[test]
        fn spawning_needs_a_scene() {
            let mut app = headless_app();
            send(&mut app, SceneCommand::SpawnMarker { request: request(5) });
            let (result, _) = run_until_response(&mut app, 5, 2);
            assert_eq!(result, Err(SceneError::NoActiveScene));
        }
    }
}
