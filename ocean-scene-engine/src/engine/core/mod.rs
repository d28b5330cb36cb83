//! Core application setup and scene lifecycle.
//!
//! Handles plugin initialisation, window configuration, the lifecycle state
//! machine and the `init`/`dispose` entry points.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app and the headless-capable scene plugin with its
/// system ordering.
pub mod app_setup;

/// Scene lifecycle states and the transition out of population.
pub mod app_state;

/// Scene construction on `init` and teardown on `dispose`.
pub mod lifecycle;

/// Platform-specific window configuration and drawing surface checks.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
