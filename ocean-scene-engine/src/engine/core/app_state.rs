use bevy::prelude::*;
use serde_json::json;

use crate::engine::api::{RequestId, SceneNotification, SceneResponse};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::scene_context::SceneContext;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum SceneLifecycle {
    #[default]
    Idle,
    Populating,
    Running,
}

/// `init` request answered once population completes.
#[derive(Resource, Default, Debug)]
pub struct PendingInit {
    waiter: Option<RequestId>,
    generation: u64,
}

impl PendingInit {
    pub fn wait(&mut self, request: RequestId, generation: u64) {
        self.waiter = Some(request);
        self.generation = generation;
    }

    pub fn cancel(&mut self) -> Option<RequestId> {
        self.waiter.take()
    }
}

// Transition to Running once every entity has its visual.
pub fn transition_to_running(
    context: Option<Res<SceneContext>>,
    progress: Res<LoadingProgress>,
    mut pending: ResMut<PendingInit>,
    mut next_state: ResMut<NextState<SceneLifecycle>>,
    mut responses: EventWriter<SceneResponse>,
    mut notifications: EventWriter<SceneNotification>,
) {
    let Some(context) = context else {
        return;
    };
    if progress.generation != context.generation || !progress.is_complete() {
        return;
    }

    info!(
        "→ Transitioning to Running state ({} of {} entities use fallback geometry)",
        progress.fallbacks, progress.total
    );
    next_state.set(SceneLifecycle::Running);

    let summary = json!(context.summary);
    if pending.generation == context.generation {
        if let Some(request) = pending.cancel() {
            responses.write(SceneResponse::ok(request, summary.clone()));
        }
    }
    notifications.write(SceneNotification::new(
        "scene_ready",
        json!({
            "summary": summary,
            "fallbacks": progress.fallbacks,
            "loader_available": context.loader_available,
        }),
    ));
}
