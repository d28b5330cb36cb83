use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::engine::api::SceneNotification;

/// Seconds between `fps_update` notifications.
const FPS_REPORT_INTERVAL: f32 = 0.5;

#[derive(Component)]
pub struct FpsText;

/// Smoothed frame rate, once the diagnostic has samples.
pub fn current_fps(diagnostics: &DiagnosticsStore) -> Option<f32> {
    diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .map(|value| value as f32)
}

pub fn fps_notification_system(
    mut notifications: EventWriter<SceneNotification>,
    diagnostics: Res<DiagnosticsStore>,
    mut last_send_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();
    if current_time - *last_send_time < FPS_REPORT_INTERVAL {
        return;
    }
    if let Some(fps) = current_fps(&diagnostics) {
        notifications.write(SceneNotification::new(
            "fps_update",
            serde_json::json!({ "fps": fps }),
        ));
        *last_send_time = current_time;
    }
}

pub fn spawn_fps_overlay(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 1., 1.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

pub fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    let Some(fps) = current_fps(&diagnostics) else {
        return;
    };
    for mut text in &mut query {
        text.0 = format!("FPS: {fps:.1}");
    }
}
