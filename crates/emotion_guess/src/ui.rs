use core::time::Duration;

use bevy::prelude::*;
use bits_helpers::floating_text::{animate_floating_text, spawn_floating_text};
use bits_helpers::welcome_screen::{WelcomeText, despawn_welcome_screen, spawn_welcome_screen};
use bits_helpers::{FONT, WINDOW_HEIGHT};
use strum::IntoEnumIterator;

use crate::camera::CameraStatus;
use crate::config::{
    ACCENT, ACHIEVEMENT_COLOR, BODY_FONT_SIZE, BUTTON_SIZE, CONTROL_BUTTON_SIZE,
    EMOTION_FONT_SIZE, HUD_FONT_SIZE, RESULT_BAR_SIZE, RESULT_FONT_SIZE, STREAK_COLOR,
    TITLE_FONT_SIZE,
};
use crate::gameplay::{
    AchievementUnlocked, GameState, PlayerIntent, Round, RoundNotification, RoundSystems, Stats,
};
use crate::emotion::CATALOG;
use crate::grading::{Grade, ScoreBand};
use crate::round::RoundEvent;
use crate::stats::{Achievement, SessionStats};

/// A button that turns into a [`PlayerIntent`] when pressed.
#[derive(Component, Debug, Clone, Copy)]
pub struct ControlButton(pub PlayerIntent);

/// Despawned when the screen it belongs to is left.
#[derive(Component)]
struct ScreenElement;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum HudText {
    Score,
    Streak,
    Facing,
}

#[derive(Component)]
struct CountdownText;

/// Session controls, hidden until the camera can be used.
#[derive(Component)]
struct ControlBar;

pub struct ScreensPlugin;

impl Plugin for ScreensPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_camera, spawn_hud))
            .add_systems(
                OnEnter(GameState::CameraPermission),
                spawn_permission_screen,
            )
            .add_systems(OnExit(GameState::CameraPermission), cleanup_screen)
            .add_systems(OnEnter(GameState::Waiting), spawn_waiting_screen)
            .add_systems(
                OnExit(GameState::Waiting),
                (despawn_welcome_screen, cleanup_screen),
            )
            .add_systems(OnEnter(GameState::Playing), spawn_playing_screen)
            .add_systems(OnExit(GameState::Playing), cleanup_screen)
            .add_systems(OnEnter(GameState::Result), spawn_result_screen)
            .add_systems(OnExit(GameState::Result), cleanup_screen)
            .add_systems(Update, handle_control_buttons.before(RoundSystems))
            .add_systems(
                Update,
                (
                    update_hud,
                    show_controls.run_if(state_changed::<GameState>),
                    update_countdown.run_if(in_state(GameState::Playing)),
                    spawn_feedback_texts,
                    animate_floating_text,
                )
                    .after(RoundSystems),
            );
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn srgb([r, g, b]: [u8; 3]) -> Color {
    Color::srgb_u8(r, g, b)
}

fn text_bundle(
    font: Handle<Font>,
    text: impl Into<String>,
    size: f32,
    color: Color,
) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font,
            font_size: size,
            ..default()
        },
        TextColor(color),
        TextLayout::new_with_justify(JustifyText::Center),
    )
}

fn spawn_button(
    parent: &mut ChildBuilder,
    font: &Handle<Font>,
    label: &str,
    size: Vec2,
    intent: PlayerIntent,
) {
    parent
        .spawn((
            Node {
                width: Val::Px(size.x),
                height: Val::Px(size.y),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.2)),
            BorderRadius::all(Val::Px(size.y / 2.0)),
            Button,
            ControlButton(intent),
        ))
        .with_children(|parent| {
            parent.spawn(text_bundle(font.clone(), label, BODY_FONT_SIZE, Color::WHITE));
        });
}

/// Full-screen column container for one screen's content.
fn screen_root() -> impl Bundle {
    (
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            row_gap: Val::Px(16.0),
            ..default()
        },
        ScreenElement,
    )
}

/// Score and streak along the top, session controls along the bottom.
fn spawn_hud(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font = asset_server.load(FONT);

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            top: Val::Px(10.0),
            padding: UiRect::horizontal(Val::Px(16.0)),
            justify_content: JustifyContent::SpaceBetween,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                text_bundle(font.clone(), "Score: 0", HUD_FONT_SIZE, Color::WHITE),
                HudText::Score,
            ));
            parent.spawn((
                text_bundle(font.clone(), "", HUD_FONT_SIZE, Color::Srgba(STREAK_COLOR)),
                HudText::Streak,
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                bottom: Val::Px(20.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(8.0),
                ..default()
            },
            Visibility::Hidden,
            ControlBar,
        ))
        .with_children(|parent| {
            parent.spawn((
                text_bundle(
                    font.clone(),
                    "",
                    HUD_FONT_SIZE * 0.8,
                    Color::srgba(1.0, 1.0, 1.0, 0.6),
                ),
                HudText::Facing,
            ));
            parent
                .spawn(Node {
                    column_gap: Val::Px(24.0),
                    ..default()
                })
                .with_children(|parent| {
                    spawn_button(
                        parent,
                        &font,
                        "Reset",
                        CONTROL_BUTTON_SIZE,
                        PlayerIntent::ResetSession,
                    );
                    spawn_button(
                        parent,
                        &font,
                        "Flip",
                        CONTROL_BUTTON_SIZE,
                        PlayerIntent::FlipCamera,
                    );
                });
        });
}

fn spawn_permission_screen(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font = asset_server.load(FONT);

    commands.spawn(screen_root()).with_children(|parent| {
        parent.spawn(text_bundle(
            font.clone(),
            "Camera Access Required",
            TITLE_FONT_SIZE * 0.7,
            Color::WHITE,
        ));
        parent.spawn(text_bundle(
            font.clone(),
            "We need camera access to analyze\nyour facial expressions for the game",
            BODY_FONT_SIZE * 0.8,
            Color::srgba(1.0, 1.0, 1.0, 0.7),
        ));
        spawn_button(
            parent,
            &font,
            "Grant Permission",
            BUTTON_SIZE,
            PlayerIntent::GrantCameraPermission,
        );
    });
}

fn spawn_waiting_screen(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    stats: Res<Stats>,
) {
    spawn_welcome_screen(
        &mut commands,
        &asset_server,
        &WelcomeText {
            title: "EmotionGuess",
            subtitle: "Express the emotion shown to you!",
            start_label: "Start Game",
        },
        ControlButton(PlayerIntent::StartRound),
    );

    let font = asset_server.load(FONT);
    let dim = Color::srgba(1.0, 1.0, 1.0, 0.7);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(WINDOW_HEIGHT * 0.08),
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(4.0),
                ..default()
            },
            ScreenElement,
        ))
        .with_children(|parent| {
            for line in stats_overview(&stats) {
                parent.spawn(text_bundle(font.clone(), line, HUD_FONT_SIZE * 0.7, dim));
            }
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(WINDOW_HEIGHT * 0.18),
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(4.0),
                ..default()
            },
            ScreenElement,
        ))
        .with_children(|parent| {
            for (line, unlocked) in achievement_lines(&stats) {
                let color = if unlocked {
                    Color::Srgba(ACHIEVEMENT_COLOR)
                } else {
                    Color::srgba(1.0, 1.0, 1.0, 0.35)
                };
                parent.spawn(text_bundle(font.clone(), line, HUD_FONT_SIZE * 0.65, color));
            }
        });
}

/// Summary of the rounds played so far. Empty before the first round.
fn stats_overview(stats: &SessionStats) -> Vec<String> {
    let Some(accuracy) = stats.average_accuracy() else {
        return Vec::new();
    };

    let mut lines = vec![
        format!(
            "Rounds {}  Wins {}  Accuracy {accuracy}%",
            stats.rounds_played(),
            stats.successful_rounds()
        ),
        format!(
            "Total {}  Best {}%  Best streak {}",
            stats.cumulative_score(),
            stats.best_score().unwrap_or(0),
            stats.best_streak()
        ),
    ];

    let recent: Vec<String> = stats
        .recent()
        .map(|(emotion, score)| format!("{emotion} {score}%"))
        .collect();
    lines.push(format!("Recent: {}", recent.join(", ")));

    let averages: Vec<String> = CATALOG
        .iter()
        .filter_map(|emotion| {
            let average = stats.emotion(*emotion).average()?;
            Some(format!("{emotion} {average}%"))
        })
        .collect();
    lines.extend(averages.chunks(3).map(|chunk| chunk.join("  ")));

    lines
}

fn achievement_lines(stats: &SessionStats) -> Vec<(String, bool)> {
    Achievement::iter()
        .map(|achievement| {
            (
                format!("{achievement}: {}", achievement.description()),
                stats.is_unlocked(achievement),
            )
        })
        .collect()
}

fn spawn_playing_screen(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    round: Res<Round>,
) {
    let state = round.snapshot();
    let Some(emotion) = state.current_emotion else {
        error!("Entered Playing without an emotion");
        return;
    };
    info!("Showing {} {}", emotion.emoji(), emotion.name());
    let font = asset_server.load(FONT);

    commands.spawn(screen_root()).with_children(|parent| {
        parent
            .spawn((
                Node {
                    width: Val::Px(80.0),
                    height: Val::Px(80.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    margin: UiRect::bottom(Val::Px(24.0)),
                    ..default()
                },
                BackgroundColor(ACCENT),
                BorderRadius::MAX,
            ))
            .with_children(|parent| {
                parent.spawn((
                    text_bundle(
                        font.clone(),
                        state.time_remaining.to_string(),
                        TITLE_FONT_SIZE,
                        Color::WHITE,
                    ),
                    CountdownText,
                ));
            });

        parent.spawn(text_bundle(
            font.clone(),
            emotion.name(),
            EMOTION_FONT_SIZE,
            srgb(emotion.color()),
        ));
        parent.spawn(text_bundle(
            font.clone(),
            emotion.prompt(),
            BODY_FONT_SIZE,
            Color::WHITE,
        ));
    });
}

fn update_countdown(round: Res<Round>, mut countdown: Query<&mut Text, With<CountdownText>>) {
    let remaining = round.snapshot().time_remaining.to_string();
    for mut text in &mut countdown {
        if text.0 != remaining {
            text.0.clone_from(&remaining);
        }
    }
}

fn spawn_result_screen(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    round: Res<Round>,
) {
    let Some(score) = round.snapshot().last_round_score else {
        error!("Entered Result without a score");
        return;
    };
    let band = srgb(ScoreBand::from_score(score).color());
    let font = asset_server.load(FONT);

    commands.spawn(screen_root()).with_children(|parent| {
        parent.spawn(text_bundle(
            font.clone(),
            format!("{score}%"),
            RESULT_FONT_SIZE,
            Color::WHITE,
        ));
        parent.spawn(text_bundle(
            font.clone(),
            Grade::from_score(score).to_string(),
            TITLE_FONT_SIZE * 0.8,
            Color::WHITE,
        ));
        parent
            .spawn((
                Node {
                    width: Val::Px(RESULT_BAR_SIZE.x),
                    height: Val::Px(RESULT_BAR_SIZE.y),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.2)),
                BorderRadius::all(Val::Px(RESULT_BAR_SIZE.y / 2.0)),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Node {
                        width: Val::Percent(f32::from(score)),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(band),
                    BorderRadius::all(Val::Px(RESULT_BAR_SIZE.y / 2.0)),
                ));
            });
    });
}

fn cleanup_screen(mut commands: Commands, query: Query<Entity, With<ScreenElement>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn handle_control_buttons(
    interactions: Query<(&Interaction, &ControlButton), Changed<Interaction>>,
    mut intents: EventWriter<PlayerIntent>,
) {
    for (interaction, button) in &interactions {
        if *interaction == Interaction::Pressed {
            intents.send(button.0);
        }
    }
}

fn update_hud(
    round: Res<Round>,
    camera: Res<CameraStatus>,
    mut hud_query: Query<(&mut Text, &HudText)>,
) {
    let state = round.snapshot();

    for (mut text, hud) in &mut hud_query {
        let value = match hud {
            HudText::Score => format!("Score: {}", state.total_score),
            HudText::Streak if state.streak > 0 => format!("Streak {}", state.streak),
            HudText::Streak => String::new(),
            HudText::Facing => format!("{} camera", camera.facing),
        };
        if text.0 != value {
            text.0 = value;
        }
    }
}

fn controls_visibility(state: GameState) -> Visibility {
    if state == GameState::CameraPermission {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    }
}

fn show_controls(
    state: Res<State<GameState>>,
    mut bars: Query<&mut Visibility, With<ControlBar>>,
) {
    let visibility = controls_visibility(*state.get());
    for mut bar in &mut bars {
        bar.set_if_neq(visibility);
    }
}

fn spawn_feedback_texts(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut notifications: EventReader<RoundNotification>,
    mut achievements: EventReader<AchievementUnlocked>,
) {
    for notification in notifications.read() {
        if let RoundEvent::StreakMilestone { streak } = notification.0 {
            spawn_floating_text(
                &mut commands,
                &asset_server,
                Vec2::new(0.0, WINDOW_HEIGHT * 0.25),
                &format!("Streak x{streak}!"),
                STREAK_COLOR,
                Duration::from_millis(1_200),
            );
        }
    }

    for AchievementUnlocked(achievement) in achievements.read() {
        spawn_floating_text(
            &mut commands,
            &asset_server,
            Vec2::new(0.0, -WINDOW_HEIGHT * 0.2),
            &format!("{achievement} unlocked!\n{}", achievement.description()),
            ACHIEVEMENT_COLOR,
            Duration::from_secs(2),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::Emotion;

    #[test]
    fn overview_is_empty_before_first_round() {
        assert!(stats_overview(&SessionStats::default()).is_empty());
    }

    #[test]
    fn overview_lists_totals_recent_and_averages() {
        let mut stats = SessionStats::default();
        stats.record(Emotion::Happy, 90, 1);
        stats.record(Emotion::Sad, 60, 0);
        stats.record(Emotion::Happy, 80, 1);

        assert_eq!(
            stats_overview(&stats),
            vec![
                "Rounds 3  Wins 2  Accuracy 76%".to_owned(),
                "Total 230  Best 90%  Best streak 1".to_owned(),
                "Recent: Happy 80%, Sad 60%, Happy 90%".to_owned(),
                "Happy 85%  Sad 60%".to_owned(),
            ]
        );
    }

    #[test]
    fn achievements_are_listed_with_their_state() {
        let mut stats = SessionStats::default();
        stats.record(Emotion::Angry, 100, 1);

        let lines = achievement_lines(&stats);
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines.first(),
            Some(&("Perfect Score: Got 100% on an emotion".to_owned(), true))
        );
        assert!(lines.iter().skip(1).all(|(_, unlocked)| !unlocked));
    }

    #[test]
    fn controls_hidden_only_behind_permission_screen() {
        assert_eq!(
            controls_visibility(GameState::CameraPermission),
            Visibility::Hidden
        );
        for state in [GameState::Waiting, GameState::Playing, GameState::Result] {
            assert_eq!(controls_visibility(state), Visibility::Inherited);
        }
    }
}
