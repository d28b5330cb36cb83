use bevy::prelude::*;
use serde_json::json;

use crate::engine::api::SceneNotification;
use crate::engine::loading::model_loader::{ModelOutcome, ModelResolved, RequestPurpose};

/// Population progress of the active scene.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct LoadingProgress {
    pub generation: u64,
    pub total: usize,
    pub resolved: usize,
    pub fallbacks: usize,
}

impl LoadingProgress {
    pub fn start(generation: u64, total: usize) -> Self {
        Self {
            generation,
            total,
            resolved: 0,
            fallbacks: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.resolved >= self.total
    }

    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.resolved as f32 / self.total as f32
        }
    }
}

// Count resolved population models and report them once per frame.
pub fn track_population_progress(
    mut resolved: EventReader<ModelResolved>,
    mut progress: ResMut<LoadingProgress>,
    mut notifications: EventWriter<SceneNotification>,
) {
    let before = progress.resolved;
    for event in resolved.read() {
        if event.generation != progress.generation
            || !matches!(event.purpose, RequestPurpose::Population { .. })
        {
            continue;
        }
        progress.resolved += 1;
        if event.outcome == ModelOutcome::Fallback {
            progress.fallbacks += 1;
        }
    }

    if progress.resolved != before {
        notifications.write(SceneNotification::new(
            "loading_progress",
            json!({
                "resolved": progress.resolved,
                "total": progress.total,
                "fallbacks": progress.fallbacks,
                "progress": progress.fraction(),
            }),
        ));
    }
}
