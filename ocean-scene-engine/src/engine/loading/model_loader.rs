use std::time::Duration;

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::engine::config::SceneConfig;
use crate::engine::fallback::{FallbackShape, build_fallback, spawn_fallback};
use crate::engine::population::EntityClass;
use crate::engine::scene_context::{SceneContext, is_live};

/// What the requested model is for. Population entities fall back to
/// generated geometry; the marker has no fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPurpose {
    Population { class: EntityClass, index: usize },
    Marker,
}

/// Visual chosen for an entity once its request resolves.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Loaded(Handle<Scene>),
    Fallback(FallbackShape),
}

/// Recorded on the entity when its request resolves.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOutcome {
    Loaded,
    Fallback,
    /// No model and no fallback: only the marker ends up here.
    Absent,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ModelResolved {
    pub entity: Entity,
    pub purpose: RequestPurpose,
    pub outcome: ModelOutcome,
    pub generation: u64,
}

#[derive(Debug)]
struct Attempt {
    path: String,
    handle: Handle<Gltf>,
    elapsed: Duration,
}

/// Pending model load for the entity it is attached to. Candidates are tried
/// in order; the first one that loads wins.
#[derive(Component, Debug)]
pub struct ModelRequest {
    candidates: Vec<String>,
    next_candidate: usize,
    attempt: Option<Attempt>,
    pub purpose: RequestPurpose,
    pub generation: u64,
}

impl ModelRequest {
    pub fn new(candidates: Vec<String>, purpose: RequestPurpose, generation: u64) -> Self {
        Self {
            candidates,
            next_candidate: 0,
            attempt: None,
            purpose,
            generation,
        }
    }

    fn take_next_candidate(&mut self) -> Option<String> {
        let path = self.candidates.get(self.next_candidate).cloned();
        if path.is_some() {
            self.next_candidate += 1;
        }
        path
    }
}

#[derive(Debug)]
enum AttemptStatus {
    Waiting,
    Loaded(Handle<Scene>),
    Failed(&'static str),
}

/// Where model files come from.
trait ModelStore {
    fn begin(&self, path: &str) -> Handle<Gltf>;
    fn status(&self, handle: &Handle<Gltf>) -> AttemptStatus;
}

struct GltfStore<'a> {
    server: &'a AssetServer,
    gltfs: &'a Assets<Gltf>,
}

impl ModelStore for GltfStore<'_> {
    fn begin(&self, path: &str) -> Handle<Gltf> {
        self.server.load(path.to_string())
    }

    fn status(&self, handle: &Handle<Gltf>) -> AttemptStatus {
        if let Some(gltf) = self.gltfs.get(handle) {
            return match gltf
                .default_scene
                .clone()
                .or_else(|| gltf.scenes.first().cloned())
            {
                Some(scene) => AttemptStatus::Loaded(scene),
                None => AttemptStatus::Failed("file contains no scene"),
            };
        }
        match self.server.get_load_state(handle) {
            Some(LoadState::Failed(_)) => AttemptStatus::Failed("load failed"),
            _ => AttemptStatus::Waiting,
        }
    }
}

/// Advance every pending model request by one frame.
pub fn poll_model_requests(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SceneConfig>,
    context: Option<Res<SceneContext>>,
    asset_server: Option<Res<AssetServer>>,
    gltfs: Option<Res<Assets<Gltf>>>,
    mut requests: Query<(Entity, &mut ModelRequest)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut resolved: EventWriter<ModelResolved>,
) {
    let context = context.as_deref();
    let store = match (asset_server.as_deref(), gltfs.as_deref()) {
        (Some(server), Some(gltfs)) if context.is_some_and(|c| c.loader_available) => {
            Some(GltfStore { server, gltfs })
        }
        _ => None,
    };
    let timeout = config.model_load_timeout();

    for (entity, mut request) in &mut requests {
        if !is_live(context, request.generation) {
            commands.entity(entity).remove::<ModelRequest>();
            continue;
        }

        let source = match &store {
            Some(store) => match advance_request(&mut request, time.delta(), timeout, store) {
                Some(source) => source,
                None => continue,
            },
            None => fallback_for(request.purpose),
        };

        let outcome = apply_source(&mut commands, entity, source, &mut meshes, &mut materials);
        commands.entity(entity).remove::<ModelRequest>();

        resolved.write(ModelResolved {
            entity,
            purpose: request.purpose,
            outcome,
            generation: request.generation,
        });
    }
}

/// Give `entity` its resolved visual.
fn apply_source(
    commands: &mut Commands,
    entity: Entity,
    source: Option<ModelSource>,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> ModelOutcome {
    let outcome = match source {
        Some(ModelSource::Loaded(scene)) => {
            commands.entity(entity).try_insert(SceneRoot(scene));
            ModelOutcome::Loaded
        }
        Some(ModelSource::Fallback(shape)) => {
            spawn_fallback(commands, entity, &shape, meshes, materials);
            ModelOutcome::Fallback
        }
        None => ModelOutcome::Absent,
    };
    commands.entity(entity).try_insert(outcome);
    outcome
}

/// Returns `None` while the current attempt is still in flight, otherwise the
/// final source (itself `None` when nothing could be loaded and no fallback
/// applies).
fn advance_request(
    request: &mut ModelRequest,
    delta: Duration,
    timeout: Duration,
    store: &impl ModelStore,
) -> Option<Option<ModelSource>> {
    loop {
        let Some(attempt) = request.attempt.as_mut() else {
            let Some(path) = request.take_next_candidate() else {
                warn!(
                    "No model found for {:?} after {} candidates; using fallback",
                    request.purpose,
                    request.candidates.len()
                );
                return Some(fallback_for(request.purpose));
            };
            debug!("Loading model {path}");
            request.attempt = Some(Attempt {
                handle: store.begin(&path),
                path,
                elapsed: Duration::ZERO,
            });
            return None;
        };

        attempt.elapsed += delta;
        let status = match store.status(&attempt.handle) {
            AttemptStatus::Waiting if attempt.elapsed >= timeout => {
                AttemptStatus::Failed("timed out")
            }
            status => status,
        };
        match status {
            AttemptStatus::Waiting => return None,
            AttemptStatus::Loaded(scene) => {
                debug!("Loaded model {}", attempt.path);
                return Some(Some(ModelSource::Loaded(scene)));
            }
            AttemptStatus::Failed(reason) => {
                debug!("Model {} unavailable: {reason}", attempt.path);
                request.attempt = None;
            }
        }
    }
}

fn fallback_for(purpose: RequestPurpose) -> Option<ModelSource> {
    match purpose {
        RequestPurpose::Population { class, index } => {
            Some(ModelSource::Fallback(build_fallback(class, index)))
        }
        RequestPurpose::Marker => None,
    }
}
