use core::time::Duration;

use bevy::prelude::*;

use crate::FONT;

/// How far a floating text rises over its lifetime, in pixels.
const RISE: f32 = 60.0;

/// World-space text that drifts up and fades out, then despawns itself.
#[derive(Component)]
pub struct FloatingText {
    timer: Timer,
    origin: Vec2,
    color: Srgba,
}

pub fn spawn_floating_text(
    commands: &mut Commands,
    asset_server: &AssetServer,
    position: Vec2,
    text: &str,
    color: Srgba,
    lifetime: Duration,
) {
    commands.spawn((
        Text2d::new(text),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 30.0,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        TextLayout::new_with_justify(JustifyText::Center),
        Transform::from_translation(position.extend(10.0)),
        FloatingText {
            timer: Timer::new(lifetime, TimerMode::Once),
            origin: position,
            color,
        },
    ));
}

pub fn animate_floating_text(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut TextColor, &mut FloatingText)>,
) {
    for (entity, mut transform, mut text_color, mut floating) in &mut query {
        floating.timer.tick(time.delta());
        let progress = floating.timer.fraction();

        transform.translation.y = RISE.mul_add(progress, floating.origin.y);
        text_color.0 = Color::Srgba(floating.color.with_alpha(1.0 - progress));

        if floating.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
