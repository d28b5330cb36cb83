pub mod constants;
pub mod engine;
pub mod rpc;

pub use engine::core::app_setup::{OceanScenePlugin, SceneSet, create_app};
