use bevy::asset::LoadState;
use bevy::prelude::*;

use constants::assets::SCENE_CONFIG_PATH;

use crate::engine::config::SceneConfig;

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<SceneConfig>>,
    settled: bool,
}

// Request the optional config file; defaults stay in place until it arrives.
pub fn start_config_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(SCENE_CONFIG_PATH));
}

pub fn apply_loaded_config(
    mut loader: ResMut<ConfigLoader>,
    mut config: ResMut<SceneConfig>,
    configs: Res<Assets<SceneConfig>>,
    asset_server: Res<AssetServer>,
) {
    if loader.settled {
        return;
    }
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };

    if let Some(loaded) = configs.get(handle) {
        info!("Scene config loaded from {SCENE_CONFIG_PATH}");
        *config = loaded.clone();
        loader.settled = true;
    } else if matches!(
        asset_server.get_load_state(handle),
        Some(LoadState::Failed(_))
    ) {
        info!("No usable {SCENE_CONFIG_PATH}; using built-in defaults");
        loader.settled = true;
    }
}
