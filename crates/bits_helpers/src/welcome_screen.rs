use bevy::prelude::*;

use crate::FONT;

#[derive(Component)]
pub struct WelcomeScreenElement;

/// Text shown on a bit's welcome screen.
pub struct WelcomeText<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub start_label: &'a str,
}

/// Spawns a centred title, subtitle and start button. `start_button` is
/// inserted on the button entity so the bit can recognise presses.
pub fn spawn_welcome_screen(
    commands: &mut Commands,
    asset_server: &AssetServer,
    text: &WelcomeText<'_>,
    start_button: impl Bundle,
) {
    let font = asset_server.load(FONT);

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
            WelcomeScreenElement,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(text.title),
                TextFont {
                    font: font.clone(),
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                TextLayout::new_with_justify(JustifyText::Center),
            ));

            parent.spawn((
                Text::new(text.subtitle),
                TextFont {
                    font: font.clone(),
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.8)),
                TextLayout::new_with_justify(JustifyText::Center),
            ));

            parent
                .spawn((
                    Node {
                        width: Val::Px(200.0),
                        height: Val::Px(60.0),
                        margin: UiRect::top(Val::Px(24.0)),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                    BorderRadius::all(Val::Px(30.0)),
                    Button,
                    start_button,
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Text::new(text.start_label),
                        TextFont {
                            font: font.clone(),
                            font_size: 26.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                });
        });
}

pub fn despawn_welcome_screen(
    mut commands: Commands,
    welcome_elements: Query<Entity, With<WelcomeScreenElement>>,
) {
    for entity in welcome_elements.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
