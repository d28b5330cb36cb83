use bevy::prelude::*;
use bevy::window::PresentMode;

use constants::assets::CANVAS_SELECTOR;

use crate::engine::config::SceneConfig;
use crate::engine::error::SceneError;

pub fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some(CANVAS_SELECTOR.into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Ocean Scene".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

/// Check that `selector` names the surface the engine renders into.
pub fn validate_surface(
    selector: &str,
    config: &SceneConfig,
    window: Option<&Window>,
) -> Result<(), SceneError> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(SceneError::SurfaceUnavailable("empty surface selector".into()));
    }
    if selector != config.canvas_selector && selector != CANVAS_SELECTOR {
        return Err(SceneError::SurfaceUnavailable(format!(
            "engine renders into {}, not {selector}",
            config.canvas_selector
        )));
    }
    let Some(window) = window else {
        return Err(SceneError::SurfaceUnavailable("no primary window".into()));
    };
    surface_exists(selector, window)
}

#[cfg(target_arch = "wasm32")]
fn surface_exists(selector: &str, window: &Window) -> Result<(), SceneError> {
    if window.canvas.as_deref() != Some(selector) {
        return Err(SceneError::SurfaceUnavailable(format!(
            "window is not bound to {selector}"
        )));
    }
    let found = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.query_selector(selector).ok().flatten())
        .is_some();
    if found {
        Ok(())
    } else {
        Err(SceneError::SurfaceUnavailable(format!(
            "{selector} not found in document"
        )))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn surface_exists(_selector: &str, _window: &Window) -> Result<(), SceneError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_selector_with_a_window_is_accepted() {
        let config = SceneConfig::default();
        assert_eq!(
            validate_surface(" #ocean-scene ", &config, Some(&Window::default())),
            Ok(())
        );
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let config = SceneConfig::default();
        let result = validate_surface("#other", &config, Some(&Window::default()));
        assert!(matches!(result, Err(SceneError::SurfaceUnavailable(_))));
        let result = validate_surface("", &config, Some(&Window::default()));
        assert!(matches!(result, Err(SceneError::SurfaceUnavailable(_))));
    }

    #[test]
    fn missing_window_is_rejected() {
        let config = SceneConfig::default();
        let result = validate_surface("#ocean-scene", &config, None);
        assert!(matches!(result, Err(SceneError::SurfaceUnavailable(_))));
    }
}
