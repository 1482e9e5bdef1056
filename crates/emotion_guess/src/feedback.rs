use bevy::prelude::*;

use crate::config::GameSettings;
use crate::gameplay::{AchievementUnlocked, RoundNotification, RoundSystems};
use crate::round::RoundEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Streak,
    Achievement,
}

/// A side effect for the device: a vibration or a sound. Emitted only for
/// the channels enabled in [`GameSettings`].
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    /// Medium impact vibration.
    Haptic,
    Sound(SoundCue),
}

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FeedbackCue>().add_systems(
            Update,
            (emit_feedback_cues, log_feedback_cues)
                .chain()
                .after(RoundSystems),
        );
    }
}

fn emit_feedback_cues(
    settings: Res<GameSettings>,
    mut notifications: EventReader<RoundNotification>,
    mut achievements: EventReader<AchievementUnlocked>,
    mut cues: EventWriter<FeedbackCue>,
) {
    for notification in notifications.read() {
        if let RoundEvent::StreakMilestone { .. } = notification.0 {
            if settings.haptics_enabled {
                cues.send(FeedbackCue::Haptic);
            }
            if settings.sound_enabled {
                cues.send(FeedbackCue::Sound(SoundCue::Streak));
            }
        }
    }

    for _ in achievements.read() {
        if settings.sound_enabled {
            cues.send(FeedbackCue::Sound(SoundCue::Achievement));
        }
    }
}

// There is no haptics or audio backend yet; the cues are only traced.
fn log_feedback_cues(mut cues: EventReader<FeedbackCue>) {
    for cue in cues.read() {
        debug!("Feedback: {cue:?}");
    }
}
