use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::animation::{animate_bottles, animate_swimmers};
use crate::engine::api::{SceneCommand, SceneNotification, SceneResponse};
use crate::engine::camera::ocean_camera::{
    CameraControlPlugin, CameraMoveInput, DirectionalPad, apply_camera_move_input,
    clamp_camera_height,
};
use crate::engine::config::SceneConfig;
use crate::engine::core::app_state::{PendingInit, SceneLifecycle, transition_to_running};
use crate::engine::core::lifecycle::{handle_dispose_commands, handle_init_commands};
use crate::engine::core::window_config::create_window_config;
use crate::engine::environment::EnvironmentPlugin;
use crate::engine::interaction::InteractionPlugin;
use crate::engine::loading::config_loader::{
    ConfigLoader, apply_loaded_config, start_config_loading,
};
use crate::engine::loading::model_loader::{ModelResolved, poll_model_requests};
use crate::engine::loading::progress::{LoadingProgress, track_population_progress};
use crate::engine::population::{SceneRng, settle_fallback_corals};
use crate::engine::scene_context::SceneGeneration;
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::{fps_text_update_system, spawn_fps_overlay};

/// Per-frame ordering of the scene systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneSet {
    /// `init` and `dispose`.
    Lifecycle,
    /// Every other page command.
    Commands,
    Loading,
    Animation,
    Interaction,
}

/// Scene systems, resources and events. Needs no window, renderer or input,
/// so it also runs headless.
pub struct OceanScenePlugin;

impl Plugin for OceanScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SceneLifecycle>()
            .init_resource::<SceneConfig>()
            .init_resource::<SceneGeneration>()
            .init_resource::<SceneRng>()
            .init_resource::<LoadingProgress>()
            .init_resource::<PendingInit>()
            .init_resource::<DirectionalPad>()
            .add_event::<SceneCommand>()
            .add_event::<SceneResponse>()
            .add_event::<SceneNotification>()
            .add_event::<ModelResolved>()
            .add_event::<CameraMoveInput>()
            .configure_sets(
                Update,
                (
                    SceneSet::Lifecycle,
                    SceneSet::Commands,
                    SceneSet::Loading,
                    SceneSet::Animation,
                    SceneSet::Interaction,
                )
                    .chain(),
            )
            .add_plugins((EnvironmentPlugin, InteractionPlugin));

        app.add_systems(
            Update,
            (handle_dispose_commands, handle_init_commands)
                .chain()
                .in_set(SceneSet::Lifecycle),
        )
        .add_systems(
            Update,
            (
                poll_model_requests,
                track_population_progress,
                settle_fallback_corals,
                transition_to_running.run_if(in_state(SceneLifecycle::Populating)),
            )
                .chain()
                .in_set(SceneSet::Loading),
        )
        .add_systems(
            Update,
            (animate_bottles, animate_swimmers)
                .in_set(SceneSet::Animation)
                .run_if(in_state(SceneLifecycle::Running)),
        )
        .add_systems(
            Update,
            (apply_camera_move_input, clamp_camera_height)
                .chain()
                .in_set(SceneSet::Animation),
        );
    }
}

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers SceneConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<SceneConfig>::new(&["config.json"]))
        .add_plugins(OceanScenePlugin)
        .add_plugins(CameraControlPlugin)
        .add_plugins(WebRpcPlugin)
        .init_resource::<ConfigLoader>();

    app.add_systems(Startup, start_config_loading)
        .add_systems(
            Update,
            apply_loaded_config.run_if(in_state(SceneLifecycle::Idle)),
        )
        .add_systems(Update, fps_notification_system);

    // Native builds have no page to drive them: show a scene straight away.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, (spawn_fps_overlay, request_native_scene))
            .add_systems(Update, fps_text_update_system);
    }

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

#[cfg(not(target_arch = "wasm32"))]
fn request_native_scene(config: Res<SceneConfig>, mut commands: EventWriter<SceneCommand>) {
    commands.write(SceneCommand::Init {
        request: None,
        surface: config.canvas_selector.clone(),
        daily_bottle_count: 1,
    });
}
