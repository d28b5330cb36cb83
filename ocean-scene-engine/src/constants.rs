/// Lighting, fog, camera and environment dimensions used by the renderer.
pub mod render_settings;
