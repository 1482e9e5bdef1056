//! In-memory statistics over every round completed while the game runs.

use std::collections::VecDeque;

use strum::{Display, EnumCount, EnumIter};

use crate::config::{HOT_STREAK_LENGTH, RECENT_ROUNDS, SUCCESS_THRESHOLD};
use crate::emotion::Emotion;
use crate::round::MAX_SCORE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum Achievement {
    #[strum(to_string = "Perfect Score")]
    PerfectScore,
    #[strum(to_string = "Hot Streak")]
    HotStreak,
    #[strum(to_string = "Master Actor")]
    MasterActor,
}

impl Achievement {
    pub const fn description(self) -> &'static str {
        match self {
            Self::PerfectScore => "Got 100% on an emotion",
            Self::HotStreak => "10 games in a row above 80%",
            Self::MasterActor => "Played all 6 emotions",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmotionRecord {
    pub rounds: u32,
    pub total_score: u32,
}

impl EmotionRecord {
    pub const fn average(&self) -> Option<u32> {
        if self.rounds == 0 {
            None
        } else {
            Some(self.total_score / self.rounds)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    rounds_played: u32,
    successful_rounds: u32,
    cumulative_score: u32,
    best_score: Option<u8>,
    best_streak: u32,
    per_emotion: [EmotionRecord; Emotion::COUNT],
    recent: VecDeque<(Emotion, u8)>,
    unlocked: Vec<Achievement>,
}

impl SessionStats {
    /// Folds one completed round in. Returns achievements unlocked by it.
    pub fn record(&mut self, emotion: Emotion, score: u8, streak: u32) -> Vec<Achievement> {
        self.rounds_played += 1;
        if score >= SUCCESS_THRESHOLD {
            self.successful_rounds += 1;
        }
        self.cumulative_score = self.cumulative_score.saturating_add(u32::from(score));
        self.best_score = self.best_score.max(Some(score));
        self.best_streak = self.best_streak.max(streak);

        if let Some(record) = self.per_emotion.get_mut(emotion.index()) {
            record.rounds += 1;
            record.total_score += u32::from(score);
        }

        self.recent.push_front((emotion, score));
        self.recent.truncate(RECENT_ROUNDS);

        let mut newly_unlocked = Vec::new();
        let earned = [
            (Achievement::PerfectScore, score == MAX_SCORE),
            (Achievement::HotStreak, streak >= HOT_STREAK_LENGTH),
            (
                Achievement::MasterActor,
                self.per_emotion.iter().all(|r| r.rounds > 0),
            ),
        ];
        for (achievement, condition) in earned {
            if condition && !self.unlocked.contains(&achievement) {
                self.unlocked.push(achievement);
                newly_unlocked.push(achievement);
            }
        }
        newly_unlocked
    }

    pub const fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub const fn successful_rounds(&self) -> u32 {
        self.successful_rounds
    }

    pub const fn cumulative_score(&self) -> u32 {
        self.cumulative_score
    }

    pub const fn best_score(&self) -> Option<u8> {
        self.best_score
    }

    pub const fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Mean score in percent, rounded down.
    pub const fn average_accuracy(&self) -> Option<u32> {
        if self.rounds_played == 0 {
            None
        } else {
            Some(self.cumulative_score / self.rounds_played)
        }
    }

    pub fn emotion(&self, emotion: Emotion) -> EmotionRecord {
        self.per_emotion
            .get(emotion.index())
            .copied()
            .unwrap_or_default()
    }

    /// Newest first.
    pub fn recent(&self) -> impl Iterator<Item = (Emotion, u8)> + '_ {
        self.recent.iter().copied()
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::emotion::CATALOG;

    #[test]
    fn empty_stats_have_no_averages() {
        let stats = SessionStats::default();
        assert_eq!(stats.rounds_played(), 0);
        assert_eq!(stats.average_accuracy(), None);
        assert_eq!(stats.best_score(), None);
        assert_eq!(stats.emotion(Emotion::Happy).average(), None);
        assert_eq!(stats.recent().count(), 0);
    }

    #[test]
    fn aggregates_per_emotion_and_overall() {
        let mut stats = SessionStats::default();
        stats.record(Emotion::Happy, 90, 1);
        stats.record(Emotion::Happy, 71, 0);
        stats.record(Emotion::Sad, 85, 1);

        assert_eq!(stats.rounds_played(), 3);
        assert_eq!(stats.successful_rounds(), 2);
        assert_eq!(stats.cumulative_score(), 246);
        assert_eq!(stats.average_accuracy(), Some(82));
        assert_eq!(stats.best_score(), Some(90));
        assert_eq!(stats.best_streak(), 1);
        assert_eq!(
            stats.emotion(Emotion::Happy),
            EmotionRecord {
                rounds: 2,
                total_score: 161
            }
        );
        assert_eq!(stats.emotion(Emotion::Happy).average(), Some(80));
        assert_eq!(stats.emotion(Emotion::Angry).rounds, 0);
    }

    #[test]
    fn keeps_three_most_recent_newest_first() {
        let mut stats = SessionStats::default();
        for (emotion, score) in [
            (Emotion::Happy, 60),
            (Emotion::Sad, 70),
            (Emotion::Angry, 80),
            (Emotion::Fearful, 90),
        ] {
            stats.record(emotion, score, 0);
        }
        let recent: Vec<_> = stats.recent().collect();
        assert_eq!(
            recent,
            vec![
                (Emotion::Fearful, 90),
                (Emotion::Angry, 80),
                (Emotion::Sad, 70)
            ]
        );
    }

    #[test]
    fn achievements_unlock_once() {
        let mut stats = SessionStats::default();
        assert_eq!(
            stats.record(Emotion::Happy, 100, 1),
            vec![Achievement::PerfectScore]
        );
        assert!(stats.record(Emotion::Happy, 100, 2).is_empty());

        assert_eq!(
            stats.record(Emotion::Sad, 85, HOT_STREAK_LENGTH),
            vec![Achievement::HotStreak]
        );

        let mut unlocked = Vec::new();
        for emotion in CATALOG {
            unlocked.extend(stats.record(emotion, 50, 0));
        }
        assert_eq!(unlocked, vec![Achievement::MasterActor]);
        assert!(Achievement::iter().all(|achievement| stats.is_unlocked(achievement)));
    }
}
