//! Headless app for scene-level tests.
//!
//! No renderer, no asset server: every model request resolves to its
//! fallback and the marker model is never found, so tests that need a
//! marker attach a stand-in with [`attach_marker`].

use std::time::Duration;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy::window::PrimaryWindow;
use serde_json::{Value, json};

use constants::assets::CANVAS_SELECTOR;

use crate::engine::api::{SceneCommand, SceneNotification, SceneResponse};
use crate::engine::core::app_setup::{OceanScenePlugin, SceneSet};
use crate::engine::error::SceneError;
use crate::engine::interaction::InteractionPhase;
use crate::engine::interaction::marker::{
    MarkerParts, MarkerRoot, PendingMarker, marker_root_transform, spawn_marker_decor,
};
use crate::engine::loading::model_loader::{ModelOutcome, ModelResolved, RequestPurpose};
use crate::engine::scene_context::{SceneAssets, SceneContext, SceneOwned};

pub const FRAME: Duration = Duration::from_millis(100);

/// Everything the scene sent out, in order.
#[derive(Resource, Default)]
pub struct Outbox {
    pub responses: Vec<SceneResponse>,
    pub notifications: Vec<SceneNotification>,
}

fn collect_outbox(
    mut responses: EventReader<SceneResponse>,
    mut notifications: EventReader<SceneNotification>,
    mut outbox: ResMut<Outbox>,
) {
    outbox.responses.extend(responses.read().cloned());
    outbox.notifications.extend(notifications.read().cloned());
}

pub fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .init_resource::<Assets<Image>>()
        .add_plugins(OceanScenePlugin)
        .init_resource::<Outbox>()
        .add_systems(Update, collect_outbox.after(SceneSet::Interaction));
    app.world_mut().spawn((Window::default(), PrimaryWindow));

    // The first frame has a zero delta.
    app.update();
    app
}

pub fn request(id: u64) -> Option<Value> {
    Some(json!(id))
}

pub fn send(app: &mut App, command: SceneCommand) {
    app.world_mut().send_event(command);
}

pub fn init_command(id: u64) -> SceneCommand {
    SceneCommand::Init {
        request: request(id),
        surface: CANVAS_SELECTOR.to_string(),
        daily_bottle_count: 1,
    }
}

pub fn response(app: &App, id: u64) -> Option<Result<Value, SceneError>> {
    app.world()
        .resource::<Outbox>()
        .responses
        .iter()
        .find(|response| response.request == request(id))
        .map(|response| response.result.clone())
}

pub fn response_count(app: &App, id: u64) -> usize {
    app.world()
        .resource::<Outbox>()
        .responses
        .iter()
        .filter(|response| response.request == request(id))
        .count()
}

pub fn notifications(app: &App, method: &str) -> Vec<Value> {
    app.world()
        .resource::<Outbox>()
        .notifications
        .iter()
        .filter(|notification| notification.method == method)
        .map(|notification| notification.params.clone())
        .collect()
}

/// Update until request `id` is answered. Returns the answer and the number
/// of frames it took.
pub fn run_until_response(
    app: &mut App,
    id: u64,
    max_frames: usize,
) -> (Result<Value, SceneError>, usize) {
    for frame in 1..=max_frames {
        app.update();
        if let Some(result) = response(app, id) {
            return (result, frame);
        }
    }
    panic!("request {id} unanswered after {max_frames} frames");
}

pub fn phase(app: &App) -> InteractionPhase {
    *app.world().resource::<State<InteractionPhase>>().get()
}

pub fn context(app: &App) -> &SceneContext {
    app.world().resource::<SceneContext>()
}

/// Start a scene with request id 1 and wait until it runs.
pub fn init_scene(app: &mut App) -> Value {
    send(app, init_command(1));
    let (result, _) = run_until_response(app, 1, 5);
    app.update();
    result.expect("init failed")
}

/// Attach a marker as if its model had loaded, with one opaque mesh under
/// the root. Returns the parts and the root mesh material.
pub fn attach_marker(app: &mut App) -> (MarkerParts, Handle<StandardMaterial>) {
    let attached = app
        .world_mut()
        .run_system_once(
            |mut commands: Commands,
             mut assets: SceneAssets,
             mut context: ResMut<SceneContext>,
             mut next_phase: ResMut<NextState<InteractionPhase>>| {
                let material = assets.materials.add(StandardMaterial::from(Color::WHITE));
                let mesh = assets.meshes.add(Sphere::new(1.0));
                let root = commands
                    .spawn((
                        Name::new("marker"),
                        marker_root_transform(),
                        Visibility::default(),
                        MarkerRoot,
                        SceneOwned,
                    ))
                    .with_children(|parent| {
                        parent.spawn((Mesh3d(mesh), MeshMaterial3d(material.clone())));
                    })
                    .id();
                let (indicator, label) = spawn_marker_decor(&mut commands, &mut assets);
                let parts = MarkerParts {
                    root,
                    indicator,
                    label,
                };
                context.marker = Some(parts);
                next_phase.set(InteractionPhase::MarkerActive);
                (parts, material)
            },
        )
        .expect("marker attach failed");
    app.update();
    attached
}

/// Start a marker load for request `id` that only resolves through
/// [`resolve_marker`]. Returns the marker root.
pub fn begin_marker_load(app: &mut App, id: u64) -> Entity {
    let world = app.world_mut();
    let generation = world.resource::<SceneContext>().generation;
    let root = world
        .spawn((
            Name::new("marker"),
            marker_root_transform(),
            Visibility::default(),
            MarkerRoot,
            SceneOwned,
        ))
        .id();
    world
        .resource_mut::<PendingMarker>()
        .track(root, generation, request(id));
    world
        .resource_mut::<NextState<InteractionPhase>>()
        .set(InteractionPhase::MarkerSpawning);
    app.update();
    root
}

/// Report the marker model load as finished with `outcome`.
pub fn resolve_marker(app: &mut App, root: Entity, outcome: ModelOutcome) {
    let generation = context(app).generation;
    app.world_mut().send_event(ModelResolved {
        entity: root,
        purpose: RequestPurpose::Marker,
        outcome,
        generation,
    });
}
