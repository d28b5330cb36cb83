//! Staggered bottle hiding, marker fade-out and their join.

use std::mem;

use bevy::color::Alpha;
use bevy::prelude::*;
use serde_json::{Value, json};

use constants::interaction::{FADE_DURATION, FADE_TICK, HIDE_INTERVAL};

use crate::engine::api::{RequestId, SceneCommand, SceneNotification, SceneResponse};
use crate::engine::error::SceneError;
use crate::engine::interaction::InteractionPhase;
use crate::engine::interaction::marker::{MarkerParts, PendingMarker};
use crate::engine::interaction::sequence::{FadeRamp, TimedSteps};
use crate::engine::scene_context::{SceneContext, is_live};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideStep {
    Hide(Entity),
    Finish,
}

/// One bottle per interval in spawn order, then one more interval before
/// the sequence counts as finished.
pub fn hide_steps(bottles: &[Entity]) -> TimedSteps<HideStep> {
    let mut steps = TimedSteps::new();
    for bottle in bottles {
        steps.push(HIDE_INTERVAL, HideStep::Hide(*bottle));
    }
    steps.push(HIDE_INTERVAL, HideStep::Finish);
    steps
}

#[derive(Debug)]
struct FadeTarget {
    material: Handle<StandardMaterial>,
    base_alpha: f32,
}

#[derive(Debug)]
struct MarkerFade {
    ramp: FadeRamp,
    parts: MarkerParts,
    targets: Vec<FadeTarget>,
}

/// Progress of the hide and fade sequences for the active scene, plus the
/// requests waiting on them.
#[derive(Resource, Default, Debug)]
pub struct CleanupTracker {
    generation: u64,
    hide: Option<TimedSteps<HideStep>>,
    hide_done: bool,
    fade: Option<MarkerFade>,
    fade_done: bool,
    join_requested: bool,
    /// The join also waits for the fade: a marker existed when a clean-up
    /// asked for it.
    join_needs_fade: bool,
    hide_waiters: Vec<RequestId>,
    fade_waiters: Vec<RequestId>,
    join_waiters: Vec<RequestId>,
}

impl CleanupTracker {
    /// Drop all sequence state and hand back every waiting request.
    pub fn cancel(&mut self) -> Vec<RequestId> {
        let tracker = mem::take(self);
        tracker
            .hide_waiters
            .into_iter()
            .chain(tracker.fade_waiters)
            .chain(tracker.join_waiters)
            .collect()
    }

    fn adopt(&mut self, generation: u64) {
        if self.generation != generation {
            *self = Self {
                generation,
                ..default()
            };
        }
    }

    fn start_hide(&mut self, bottles: &[Entity]) {
        if self.hide.is_none() && !self.hide_done {
            info!("Hiding {} bottles", bottles.len());
            self.hide = Some(hide_steps(bottles));
        }
    }

    /// Start fading `marker` unless it already is or has been. Returns false
    /// when there is no marker, which leaves the fade state untouched.
    fn start_fade(
        &mut self,
        marker: Option<MarkerParts>,
        targets: impl FnOnce(MarkerParts) -> Vec<FadeTarget>,
    ) -> bool {
        let Some(parts) = marker else {
            return false;
        };
        if self.fade.is_none() && !self.fade_done {
            info!("Fading out marker");
            self.fade = Some(MarkerFade {
                ramp: FadeRamp::new(FADE_DURATION, FADE_TICK),
                parts,
                targets: targets(parts),
            });
        }
        true
    }

    fn join_finished(&self) -> bool {
        self.hide_done && (self.fade_done || !self.join_needs_fade)
    }
}

/// Every distinct material under the marker parts, with its current alpha.
/// Opaque materials switch to blending so the fade shows.
fn collect_fade_targets(
    parts: MarkerParts,
    children: &Query<&Children>,
    mesh_materials: &Query<&MeshMaterial3d<StandardMaterial>>,
    materials: &mut Assets<StandardMaterial>,
) -> Vec<FadeTarget> {
    let mut targets: Vec<FadeTarget> = Vec::new();
    for root in parts.entities() {
        for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
            let Ok(MeshMaterial3d(handle)) = mesh_materials.get(entity) else {
                continue;
            };
            if targets.iter().any(|target| target.material == *handle) {
                continue;
            }
            let Some(material) = materials.get_mut(handle) else {
                continue;
            };
            if matches!(material.alpha_mode, AlphaMode::Opaque | AlphaMode::Mask(_)) {
                material.alpha_mode = AlphaMode::Blend;
            }
            targets.push(FadeTarget {
                material: handle.clone(),
                base_alpha: material.base_color.alpha(),
            });
        }
    }
    targets
}

pub fn handle_cleanup_commands(
    mut commands: Commands,
    mut events: EventReader<SceneCommand>,
    context: Option<Res<SceneContext>>,
    mut tracker: ResMut<CleanupTracker>,
    mut pending_marker: ResMut<PendingMarker>,
    phase: Res<State<InteractionPhase>>,
    mut next_phase: ResMut<NextState<InteractionPhase>>,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut responses: EventWriter<SceneResponse>,
) {
    for event in events.read() {
        let (request, wants_hide, wants_fade) = match event {
            SceneCommand::HideEntities { request } => (request, true, false),
            SceneCommand::FadeOutMarker { request } => (request, false, true),
            SceneCommand::CleanUp { request } => (request, true, true),
            _ => continue,
        };
        let Some(context) = context.as_deref() else {
            responses.write(SceneResponse::err(request.clone(), SceneError::NoActiveScene));
            continue;
        };
        tracker.adopt(context.generation);

        if wants_hide {
            tracker.start_hide(&context.bottles);
        }
        let fading = wants_fade
            && tracker.start_fade(context.marker, |parts| {
                collect_fade_targets(parts, &children, &mesh_materials, &mut materials)
            });

        match event {
            SceneCommand::HideEntities { .. } => tracker.hide_waiters.push(request.clone()),
            SceneCommand::FadeOutMarker { .. } if fading => {
                tracker.fade_waiters.push(request.clone());
            }
            SceneCommand::FadeOutMarker { .. } => {
                debug!("No marker to fade");
                responses.write(SceneResponse::ok(request.clone(), Value::Null));
            }
            _ => {
                if *phase.get() == InteractionPhase::Done {
                    responses.write(SceneResponse::ok(request.clone(), Value::Null));
                    continue;
                }
                // A marker still loading would appear after the clean-up.
                if let Some((root, waiters)) = pending_marker.abandon() {
                    info!("Clean-up abandons the marker still loading");
                    commands.entity(root).try_despawn();
                    for waiter in waiters {
                        responses.write(SceneResponse::ok(waiter, Value::Null));
                    }
                }
                tracker.join_requested = true;
                tracker.join_needs_fade |= fading;
                tracker.join_waiters.push(request.clone());
                next_phase.set(InteractionPhase::CleaningUp);
            }
        }
    }
}

pub fn advance_hide(
    time: Res<Time>,
    context: Option<Res<SceneContext>>,
    mut tracker: ResMut<CleanupTracker>,
    mut visibilities: Query<&mut Visibility>,
) {
    if !is_live(context.as_deref(), tracker.generation) {
        return;
    }
    let Some(steps) = tracker.hide.as_mut() else {
        return;
    };

    let mut finished = false;
    steps.advance(time.delta(), |step| match step {
        HideStep::Hide(bottle) => {
            if let Ok(mut visibility) = visibilities.get_mut(bottle) {
                *visibility = Visibility::Hidden;
            }
        }
        HideStep::Finish => finished = true,
    });

    if finished {
        debug!("All bottles hidden");
        tracker.hide = None;
        tracker.hide_done = true;
    }
}

pub fn advance_fade(
    time: Res<Time>,
    context: Option<Res<SceneContext>>,
    mut tracker: ResMut<CleanupTracker>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut visibilities: Query<&mut Visibility>,
) {
    if !is_live(context.as_deref(), tracker.generation) {
        return;
    }
    let Some(fade) = tracker.fade.as_mut() else {
        return;
    };
    let Some(progress) = fade.ramp.advance(time.delta()) else {
        return;
    };

    let opacity = 1.0 - progress;
    for target in &fade.targets {
        if let Some(material) = materials.get_mut(&target.material) {
            material.base_color.set_alpha(target.base_alpha * opacity);
        }
    }

    if fade.ramp.is_finished() {
        for entity in fade.parts.entities() {
            if let Ok(mut visibility) = visibilities.get_mut(entity) {
                *visibility = Visibility::Hidden;
            }
        }
        debug!("Marker faded out");
        tracker.fade = None;
        tracker.fade_done = true;
    }
}

/// Resolve waiters of finished sequences and complete the clean-up join.
pub fn settle_cleanup(
    mut tracker: ResMut<CleanupTracker>,
    mut next_phase: ResMut<NextState<InteractionPhase>>,
    mut responses: EventWriter<SceneResponse>,
    mut notifications: EventWriter<SceneNotification>,
) {
    let tracker = &mut *tracker;
    let mut resolved = Vec::new();
    if tracker.hide_done {
        resolved.append(&mut tracker.hide_waiters);
    }
    if tracker.fade_done {
        resolved.append(&mut tracker.fade_waiters);
    }
    if tracker.join_requested && tracker.join_finished() {
        tracker.join_requested = false;
        resolved.append(&mut tracker.join_waiters);
        next_phase.set(InteractionPhase::Done);
        info!("Clean-up complete");
        notifications.write(SceneNotification::new("cleanup_complete", json!({})));
    }

    for request in resolved {
        responses.write(SceneResponse::ok(request, Value::Null));
    }
}
