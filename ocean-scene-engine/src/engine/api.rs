//! Messages exchanged between the scene systems and whoever drives them.
//!
//! The RPC bridge turns page requests into [`SceneCommand`]s and forwards
//! [`SceneResponse`]s and [`SceneNotification`]s back. Tests drive the same
//! events directly.

use bevy::prelude::*;
use serde_json::Value;

use crate::engine::error::SceneError;

/// Correlation id of the request that started an operation. `None` for
/// fire-and-forget calls.
pub type RequestId = Option<Value>;

#[derive(Event, Debug, Clone)]
pub enum SceneCommand {
    Init {
        request: RequestId,
        surface: String,
        daily_bottle_count: u64,
    },
    SpawnMarker {
        request: RequestId,
    },
    HideEntities {
        request: RequestId,
    },
    FadeOutMarker {
        request: RequestId,
    },
    /// Hide and fade together; completes when both have finished.
    CleanUp {
        request: RequestId,
    },
    Dispose {
        request: RequestId,
    },
}

/// Completion of a [`SceneCommand`]. Asynchronous commands complete frames
/// after they were issued.
#[derive(Event, Debug, Clone)]
pub struct SceneResponse {
    pub request: RequestId,
    pub result: Result<Value, SceneError>,
}

impl SceneResponse {
    pub fn ok(request: RequestId, value: Value) -> Self {
        Self {
            request,
            result: Ok(value),
        }
    }

    pub fn err(request: RequestId, error: SceneError) -> Self {
        Self {
            request,
            result: Err(error),
        }
    }
}

/// One-way message for the page.
#[derive(Event, Debug, Clone)]
pub struct SceneNotification {
    pub method: &'static str,
    pub params: Value,
}

impl SceneNotification {
    pub fn new(method: &'static str, params: Value) -> Self {
        Self { method, params }
    }
}
