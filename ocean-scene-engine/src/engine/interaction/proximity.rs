use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde_json::json;

use crate::engine::api::SceneNotification;
use crate::engine::camera::ocean_camera::OceanCamera;
use crate::engine::config::SceneConfig;
use crate::engine::interaction::InteractionPhase;
use crate::engine::interaction::marker::{MarkerHandle, MarkerRoot};
use crate::engine::scene_context::SceneContext;

/// True when both positions exist and lie strictly closer than `threshold`.
pub fn check_proximity(camera: Option<Vec3>, marker: Option<Vec3>, threshold: f32) -> bool {
    match (camera, marker) {
        (Some(camera), Some(marker)) => camera.distance(marker) < threshold,
        _ => false,
    }
}

/// Read-only view of the camera and marker.
#[derive(SystemParam)]
pub struct ProximityProbe<'w, 's> {
    context: Option<Res<'w, SceneContext>>,
    config: Res<'w, SceneConfig>,
    cameras: Query<'w, 's, &'static Transform, With<OceanCamera>>,
    markers: Query<'w, 's, (&'static Transform, &'static Visibility), With<MarkerRoot>>,
}

impl ProximityProbe<'_, '_> {
    pub fn camera_position(&self) -> Option<Vec3> {
        self.cameras.single().ok().map(|transform| transform.translation)
    }

    pub fn marker_handle(&self) -> Option<MarkerHandle> {
        let parts = self.context.as_ref()?.marker?;
        let (transform, visibility) = self.markers.get(parts.root).ok()?;
        Some(MarkerHandle::new(transform, visibility))
    }

    pub fn marker_position(&self) -> Option<Vec3> {
        self.marker_handle().map(|handle| Vec3::from_array(handle.position))
    }

    pub fn is_near(&self) -> bool {
        check_proximity(
            self.camera_position(),
            self.marker_position(),
            self.config.proximity_threshold,
        )
    }

    pub fn distance(&self) -> Option<f32> {
        Some(self.camera_position()?.distance(self.marker_position()?))
    }
}

#[derive(Resource)]
pub struct ProximityWatch {
    timer: Timer,
}

impl ProximityWatch {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            timer: Timer::new(config.proximity_poll_interval(), TimerMode::Repeating),
        }
    }
}

impl FromWorld for ProximityWatch {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<SceneConfig>().cloned().unwrap_or_default();
        Self::new(&config)
    }
}

pub fn reset_proximity_watch(mut watch: ResMut<ProximityWatch>, config: Res<SceneConfig>) {
    *watch = ProximityWatch::new(&config);
}

// Poll while the marker is active; the first hit leaves the state, so the
// notification is sent once.
pub fn watch_proximity(
    time: Res<Time>,
    mut watch: ResMut<ProximityWatch>,
    probe: ProximityProbe,
    mut next_phase: ResMut<NextState<InteractionPhase>>,
    mut notifications: EventWriter<SceneNotification>,
) {
    watch.timer.tick(time.delta());
    if !watch.timer.just_finished() || !probe.is_near() {
        return;
    }

    info!("Camera reached the marker");
    next_phase.set(InteractionPhase::ProximityReached);
    notifications.write(SceneNotification::new(
        "proximity_reached",
        json!({ "distance": probe.distance() }),
    ));
}
