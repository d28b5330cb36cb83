//! The ocean scene: population, environment, camera and the marker
//! interaction sequence.
//!
//! Everything the page can ask for arrives as a [`api::SceneCommand`] and is
//! answered with a [`api::SceneResponse`]. Systems run in the
//! [`core::app_setup::SceneSet`] order every frame.

pub mod animation;
pub mod api;
pub mod camera;
pub mod config;
pub mod core;
pub mod environment;
pub mod error;
pub mod fallback;
pub mod interaction;
pub mod loading;
pub mod population;
pub mod scene_context;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_app;
