//! `init` and `dispose`: building and tearing down the scene.

use bevy::ecs::system::SystemParam;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use serde_json::Value;

use crate::engine::api::{RequestId, SceneCommand, SceneResponse};
use crate::engine::camera::ocean_camera::{DirectionalPad, spawn_ocean_camera};
use crate::engine::config::SceneConfig;
use crate::engine::core::app_state::{PendingInit, SceneLifecycle};
use crate::engine::core::window_config::validate_surface;
use crate::engine::environment::build_environment;
use crate::engine::error::SceneError;
use crate::engine::interaction::InteractionPhase;
use crate::engine::interaction::cleanup::CleanupTracker;
use crate::engine::interaction::marker::PendingMarker;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::population::{PopulationCounts, SceneRng, populate};
use crate::engine::scene_context::{
    SceneAssets, SceneContext, SceneGeneration, SceneOwned, SceneSummary,
};

pub fn handle_init_commands(
    mut commands: Commands,
    mut events: EventReader<SceneCommand>,
    context: Option<Res<SceneContext>>,
    mut generation: ResMut<SceneGeneration>,
    config: Res<SceneConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    asset_server: Option<Res<AssetServer>>,
    gltfs: Option<Res<Assets<Gltf>>>,
    mut assets: SceneAssets,
    mut rng: ResMut<SceneRng>,
    mut pending: ResMut<PendingInit>,
    mut next_lifecycle: ResMut<NextState<SceneLifecycle>>,
    mut responses: EventWriter<SceneResponse>,
) {
    let mut active = context.is_some();

    for event in events.read() {
        let SceneCommand::Init {
            request,
            surface,
            daily_bottle_count,
        } = event
        else {
            continue;
        };

        if active {
            responses.write(SceneResponse::err(request.clone(), SceneError::AlreadyActive));
            continue;
        }

        let started = SceneSummary::from_daily_usage(*daily_bottle_count).and_then(|summary| {
            validate_surface(surface, &config, windows.single().ok())?;
            Ok(summary)
        });
        let summary = match started {
            Ok(summary) => summary,
            Err(error) => {
                warn!("Scene init rejected: {error}");
                responses.write(SceneResponse::err(request.clone(), error));
                continue;
            }
        };

        let scene_generation = generation.advance();
        let loader_available = asset_server.is_some() && gltfs.is_some();
        if !loader_available {
            error!("glTF loader unavailable; every entity uses fallback geometry");
        }

        build_environment(&mut commands, &mut assets, &mut rng);
        spawn_ocean_camera(&mut commands);

        let counts = PopulationCounts::for_summary(&summary);
        let mut scene = SceneContext::new(scene_generation, summary, loader_available);
        scene.bottles = populate(&mut commands, &mut rng, &config, scene_generation, counts);

        info!(
            "Scene {scene_generation} initialised: {} bottles for a five-year total of {}",
            summary.entity_count, summary.five_year_total
        );
        commands.insert_resource(scene);
        commands.insert_resource(LoadingProgress::start(scene_generation, counts.total()));
        pending.wait(request.clone(), scene_generation);
        next_lifecycle.set(SceneLifecycle::Populating);
        active = true;
    }
}

/// Waiting requests across every in-flight operation.
#[derive(SystemParam)]
pub struct PendingOperations<'w> {
    init: ResMut<'w, PendingInit>,
    marker: ResMut<'w, PendingMarker>,
    cleanup: ResMut<'w, CleanupTracker>,
}

impl PendingOperations<'_> {
    fn cancel_all(&mut self) -> Vec<RequestId> {
        let mut waiters: Vec<_> = self.init.cancel().into_iter().collect();
        waiters.extend(self.marker.cancel());
        waiters.extend(self.cleanup.cancel());
        waiters
    }
}

pub fn handle_dispose_commands(
    mut commands: Commands,
    mut events: EventReader<SceneCommand>,
    context: Option<Res<SceneContext>>,
    mut generation: ResMut<SceneGeneration>,
    owned: Query<Entity, With<SceneOwned>>,
    mut operations: PendingOperations,
    mut pad: ResMut<DirectionalPad>,
    mut next_lifecycle: ResMut<NextState<SceneLifecycle>>,
    mut next_phase: ResMut<NextState<InteractionPhase>>,
    mut responses: EventWriter<SceneResponse>,
) {
    let mut active = context.is_some();

    for event in events.read() {
        let SceneCommand::Dispose { request } = event else {
            continue;
        };

        if active {
            for waiter in operations.cancel_all() {
                responses.write(SceneResponse::err(waiter, SceneError::Cancelled));
            }
            for entity in &owned {
                commands.entity(entity).try_despawn();
            }
            commands.remove_resource::<SceneContext>();
            commands.insert_resource(LoadingProgress::default());
            *pad = DirectionalPad::default();
            let retired = generation.current();
            generation.advance();
            next_lifecycle.set(SceneLifecycle::Idle);
            next_phase.set(InteractionPhase::Idle);
            info!("Scene {retired} disposed");
            active = false;
        }

        responses.write(SceneResponse::ok(request.clone(), Value::Null));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::loading::model_loader::ModelOutcome;
    use crate::engine::test_app::*;

    fn lifecycle(app: &App) -> SceneLifecycle {
        *app.world().resource::<State<SceneLifecycle>>().get()
    }

    fn owned_count(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<SceneOwned>>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn init_without_loader_falls_back_everywhere() {
        let mut app = headless_app();
        let summary = init_scene(&mut app);

        assert_eq!(summary, json!({ "entity_count": 50, "five_year_total": 1825 }));
        assert_eq!(lifecycle(&app), SceneLifecycle::Running);
        assert!(!context(&app).loader_available);
        assert_eq!(context(&app).bottles.len(), 50);

        let expected = PopulationCounts::for_summary(&context(&app).summary).total();
        let outcomes: Vec<ModelOutcome> = app
            .world_mut()
            .query::<&ModelOutcome>()
            .iter(app.world())
            .copied()
            .collect();
        assert_eq!(outcomes.len(), expected);
        assert!(outcomes.iter().all(|outcome| *outcome == ModelOutcome::Fallback));

        let ready = notifications(&app, "scene_ready");
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0]["fallbacks"], json!(expected));
        assert_eq!(ready[0]["loader_available"], json!(false));

        let progress = notifications(&app, "loading_progress");
        assert_eq!(progress.last().map(|p| p["resolved"].clone()), Some(json!(expected)));
    }

    #[test]
    fn second_init_is_rejected_while_active() {
        let mut app = headless_app();
        init_scene(&mut app);
        let generation = context(&app).generation;

        send(&mut app, init_command(2));
        let (result, frames) = run_until_response(&mut app, 2, 3);
        assert_eq!(result, Err(SceneError::AlreadyActive));
        assert_eq!(frames, 1);
        assert_eq!(context(&app).generation, generation);
    }

    #[test]
    fn unknown_surface_is_rejected() {
        let mut app = headless_app();
        send(
            &mut app,
            SceneCommand::Init {
                request: request(1),
                surface: "#missing".to_string(),
                daily_bottle_count: 3,
            },
        );
        let (result, _) = run_until_response(&mut app, 1, 3);
        assert!(matches!(result, Err(SceneError::SurfaceUnavailable(_))));
        assert!(app.world().get_resource::<SceneContext>().is_none());
        assert_eq!(owned_count(&mut app), 0);
    }

    #[test]
    fn init_needs_a_window() {
        let mut app = headless_app();
        let windows: Vec<Entity> = app
            .world_mut()
            .query_filtered::<Entity, With<PrimaryWindow>>()
            .iter(app.world())
            .collect();
        for window in windows {
            app.world_mut().despawn(window);
        }

        send(&mut app, init_command(1));
        let (result, _) = run_until_response(&mut app, 1, 3);
        assert!(matches!(result, Err(SceneError::SurfaceUnavailable(_))));
    }

    #[test]
    fn zero_daily_count_is_invalid_input() {
        let mut app = headless_app();
        send(
            &mut app,
            SceneCommand::Init {
                request: request(1),
                surface: "#ocean-scene".to_string(),
                daily_bottle_count: 0,
            },
        );
        let (result, _) = run_until_response(&mut app, 1, 3);
        assert!(matches!(result, Err(SceneError::InvalidInput(_))));
        assert_eq!(lifecycle(&app), SceneLifecycle::Idle);
    }

    #[test]
    fn dispose_twice_leaves_an_empty_world() {
        let mut app = headless_app();
        init_scene(&mut app);
        assert!(owned_count(&mut app) > 0);

        send(&mut app, SceneCommand::Dispose { request: request(2) });
        send(&mut app, SceneCommand::Dispose { request: request(3) });
        app.update();
        app.update();

        assert_eq!(response(&app, 2), Some(Ok(Value::Null)));
        assert_eq!(response(&app, 3), Some(Ok(Value::Null)));
        assert_eq!(owned_count(&mut app), 0);
        assert!(app.world().get_resource::<SceneContext>().is_none());
        assert_eq!(lifecycle(&app), SceneLifecycle::Idle);

        // The scene can be started again.
        send(&mut app, init_command(4));
        let (result, _) = run_until_response(&mut app, 4, 5);
        assert!(result.is_ok());
    }

    #[test]
    fn dispose_without_scene_is_a_no_op() {
        let mut app = headless_app();
        send(&mut app, SceneCommand::Dispose { request: request(1) });
        let (result, _) = run_until_response(&mut app, 1, 2);
        assert_eq!(result, Ok(Value::Null));
    }

    #[test]
    fn dispose_during_population_cancels_init() {
        let mut app = headless_app();
        send(&mut app, init_command(1));
        app.update();
        assert_eq!(response(&app, 1), None);

        send(&mut app, SceneCommand::Dispose { request: request(2) });
        app.update();
        assert_eq!(response(&app, 1), Some(Err(SceneError::Cancelled)));
        assert_eq!(response(&app, 2), Some(Ok(Value::Null)));

        for _ in 0..3 {
            app.update();
        }
        assert_eq!(response_count(&app, 1), 1);
        assert!(notifications(&app, "scene_ready").is_empty());
        assert_eq!(lifecycle(&app), SceneLifecycle::Idle);
    }
}
