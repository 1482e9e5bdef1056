use bevy::prelude::*;

use crate::camera::CameraStatus;
use crate::config::GameSettings;
use crate::round::{Phase, RoundController, RoundEvent};
use crate::stats::{Achievement, SessionStats};

/// Screen currently shown. Follows the round phase once the camera is
/// usable; never set directly.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum GameState {
    #[default]
    CameraPermission,
    Waiting,
    Playing,
    Result,
}

impl GameState {
    pub const fn mirror(camera: &CameraStatus, phase: Phase) -> Self {
        if !camera.permission_granted {
            return Self::CameraPermission;
        }
        match phase {
            Phase::Waiting => Self::Waiting,
            Phase::Playing => Self::Playing,
            Phase::Result => Self::Result,
        }
    }
}

#[derive(Resource, Default, Deref, DerefMut)]
pub struct Round(pub RoundController);

#[derive(Resource, Default, Deref, DerefMut)]
pub struct Stats(pub SessionStats);

/// Something the player asked for through the UI.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerIntent {
    StartRound,
    ResetSession,
    FlipCamera,
    GrantCameraPermission,
}

/// A [`RoundEvent`] re-published for any system to read.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Deref)]
pub struct RoundNotification(pub RoundEvent);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementUnlocked(pub Achievement);

/// Every system that mutates the round. Presentation runs around it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoundSystems;

pub struct RoundPlugin;

impl Plugin for RoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<Round>()
            .init_resource::<Stats>()
            .init_resource::<CameraStatus>()
            .init_resource::<GameSettings>()
            .add_event::<PlayerIntent>()
            .add_event::<RoundNotification>()
            .add_event::<AchievementUnlocked>()
            .add_systems(
                Update,
                (
                    apply_player_intents,
                    advance_round_clock,
                    publish_round_events,
                    (auto_start_next_round, record_completed_rounds),
                    sync_game_state,
                )
                    .chain()
                    .in_set(RoundSystems),
            );
    }
}

fn apply_player_intents(
    mut intents: EventReader<PlayerIntent>,
    mut round: ResMut<Round>,
    mut camera: ResMut<CameraStatus>,
) {
    for intent in intents.read() {
        match intent {
            PlayerIntent::StartRound => {
                if !camera.permission_granted {
                    warn!("Start ignored, camera permission not granted");
                    continue;
                }
                if let Err(err) = round.start_round() {
                    info!("{err}");
                }
            }
            PlayerIntent::ResetSession => round.reset_session(),
            PlayerIntent::FlipCamera => {
                camera.flip();
                info!("Camera facing {}", camera.facing);
            }
            PlayerIntent::GrantCameraPermission => {
                if !camera.permission_granted {
                    info!("Camera permission granted");
                    camera.permission_granted = true;
                }
            }
        }
    }
}

fn advance_round_clock(time: Res<Time>, mut round: ResMut<Round>) {
    round.advance(time.delta());
}

fn publish_round_events(
    mut round: ResMut<Round>,
    mut notifications: EventWriter<RoundNotification>,
) {
    for event in round.drain_events() {
        notifications.send(RoundNotification(event));
    }
}

fn auto_start_next_round(
    mut notifications: EventReader<RoundNotification>,
    settings: Res<GameSettings>,
    camera: Res<CameraStatus>,
    mut round: ResMut<Round>,
) {
    let dismissed = notifications
        .read()
        .any(|notification| notification.0 == RoundEvent::ResultDismissed);

    if dismissed && settings.auto_start && camera.permission_granted {
        if let Err(err) = round.start_round() {
            warn!("Auto-start failed: {err}");
        }
    }
}

fn record_completed_rounds(
    mut notifications: EventReader<RoundNotification>,
    mut stats: ResMut<Stats>,
    mut unlocked: EventWriter<AchievementUnlocked>,
) {
    for notification in notifications.read() {
        let RoundEvent::RoundEnded {
            emotion,
            score,
            streak,
            ..
        } = notification.0
        else {
            continue;
        };

        for achievement in stats.record(emotion, score, streak) {
            info!("Achievement unlocked: {achievement}");
            unlocked.send(AchievementUnlocked(achievement));
        }
    }
}

fn sync_game_state(
    round: Res<Round>,
    camera: Res<CameraStatus>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let target = GameState::mirror(&camera, round.phase());
    if *state.get() != target {
        next_state.set(target);
    }
}
