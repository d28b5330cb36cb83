//! Asset loading for the scene.
//!
//! Models are requested per entity and polled each frame until they load,
//! time out on every candidate path, or resolve to fallback geometry.

/// Optional JSON override for [`SceneConfig`](crate::engine::config::SceneConfig).
pub mod config_loader;

/// Per-entity glTF requests with ordered candidate paths and timeouts.
///
/// Resolves each request to a loaded scene, fallback geometry, or nothing.
pub mod model_loader;

/// Population progress tracking reported to the page.
pub mod progress;
