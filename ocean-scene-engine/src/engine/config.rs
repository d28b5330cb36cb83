use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use constants::assets::{CANVAS_SELECTOR, MODEL_BASE_PATHS, MODEL_LOAD_TIMEOUT};
use constants::interaction::{PROXIMITY_POLL_INTERVAL, PROXIMITY_THRESHOLD};

/// Runtime knobs for deployment differences.
///
/// Defaults come from the `constants` crate. A JSON file at
/// `constants::assets::SCENE_CONFIG_PATH` may override any subset of fields.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub canvas_selector: String,
    pub model_base_paths: Vec<String>,
    pub model_load_timeout_ms: u64,
    pub proximity_poll_interval_ms: u64,
    pub proximity_threshold: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas_selector: CANVAS_SELECTOR.to_string(),
            model_base_paths: MODEL_BASE_PATHS.iter().map(|p| p.to_string()).collect(),
            model_load_timeout_ms: MODEL_LOAD_TIMEOUT.as_millis() as u64,
            proximity_poll_interval_ms: PROXIMITY_POLL_INTERVAL.as_millis() as u64,
            proximity_threshold: PROXIMITY_THRESHOLD,
        }
    }
}

impl SceneConfig {
    pub fn model_load_timeout(&self) -> Duration {
        Duration::from_millis(self.model_load_timeout_ms)
    }

    pub fn proximity_poll_interval(&self) -> Duration {
        Duration::from_millis(self.proximity_poll_interval_ms.max(1))
    }

    /// Full asset paths to try for `file`, in priority order.
    pub fn candidate_paths(&self, file: &str) -> Vec<String> {
        self.model_base_paths
            .iter()
            .map(|base| {
                let base = base.trim_end_matches('/');
                if base.is_empty() {
                    file.to_string()
                } else {
                    format!("{base}/{file}")
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_paths_follow_base_path_order() {
        let config = SceneConfig::default();
        let paths = config.candidate_paths("fish.glb");
        assert_eq!(
            paths,
            vec![
                "3D-Models/fish.glb",
                "public/3D-Models/fish.glb",
                "models/fish.glb",
                "fish.glb",
            ]
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SceneConfig =
            serde_json::from_str(r#"{ "model_base_paths": ["cdn/models/"] }"#).unwrap();
        assert_eq!(config.candidate_paths("coral.glb"), vec!["cdn/models/coral.glb"]);
        assert_eq!(config.proximity_threshold, PROXIMITY_THRESHOLD);
        assert_eq!(config.canvas_selector, CANVAS_SELECTOR);
    }
}
