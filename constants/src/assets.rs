use std::time::Duration;

/// Base directories tried in order when resolving a model file.
/// An empty entry means the asset root itself.
pub const MODEL_BASE_PATHS: &[&str] = &["3D-Models", "public/3D-Models", "models", ""];

/// A single load attempt is abandoned after this long.
pub const MODEL_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

pub const CORAL_MODELS: &[&str] = &["coral.glb"];
pub const BOTTLE_MODELS: &[&str] = &["waterbottle.glb", "waterbottle2.glb", "waterbottle3.glb"];
pub const FISH_MODELS: &[&str] = &["fish.glb", "fish2.glb", "fish3.glb", "fish4.glb"];
pub const TURTLE_MODELS: &[&str] = &["sea_turtle.glb"];
pub const MARKER_MODEL: &str = "oceanbottle.glb";

/// Optional runtime override for scene configuration, relative to the asset root.
pub const SCENE_CONFIG_PATH: &str = "ocean_scene.config.json";

/// Canvas the WASM build renders into.
pub const CANVAS_SELECTOR: &str = "#ocean-scene";
