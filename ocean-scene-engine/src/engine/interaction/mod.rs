//! Marker interaction and the clean-up choreography.
//!
//! The page drives the phases: spawn the marker, wait for the visitor to
//! swim close, then hide the bottles and fade the marker out.

/// Staggered bottle hiding, marker fade and the clean-up join.
pub mod cleanup;

/// Marker model, indicator ring and label.
pub mod marker;

/// Camera-to-marker distance checks and the proximity watch.
pub mod proximity;

/// Step sequencer and fade ramp driven by explicit time deltas.
pub mod sequence;

use bevy::prelude::*;

use crate::engine::core::app_setup::SceneSet;
use crate::engine::loading::model_loader::poll_model_requests;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum InteractionPhase {
    #[default]
    Idle,
    MarkerSpawning,
    MarkerActive,
    ProximityReached,
    CleaningUp,
    Done,
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<InteractionPhase>()
            .init_resource::<marker::PendingMarker>()
            .init_resource::<cleanup::CleanupTracker>()
            .init_resource::<proximity::ProximityWatch>()
            .add_systems(
                OnEnter(InteractionPhase::MarkerActive),
                proximity::reset_proximity_watch,
            )
            .add_systems(
                Update,
                (
                    marker::handle_spawn_marker_commands,
                    cleanup::handle_cleanup_commands,
                )
                    .chain()
                    .in_set(SceneSet::Commands),
            )
            .add_systems(
                Update,
                marker::finish_marker_spawn
                    .after(poll_model_requests)
                    .in_set(SceneSet::Loading),
            )
            .add_systems(
                Update,
                marker::spin_marker_decor.in_set(SceneSet::Animation),
            )
            .add_systems(
                Update,
                (
                    proximity::watch_proximity
                        .run_if(in_state(InteractionPhase::MarkerActive)),
                    cleanup::advance_hide,
                    cleanup::advance_fade,
                    cleanup::settle_cleanup,
                )
                    .chain()
                    .in_set(SceneSet::Interaction),
            );
    }
}
