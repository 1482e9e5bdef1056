//! The round lifecycle: `Waiting -> Playing -> Result -> Waiting`.
//!
//! [`RoundController`] is the only thing allowed to mutate a [`RoundState`].
//! It owns its own clock and [`WakeupTimer`]s, so the countdown and the
//! result display window can be driven by frame time in the game and by
//! hand in tests. Side effects are reported as [`RoundEvent`]s and drained by the
//! caller.

use core::time::Duration;

use bevy::time::{Stopwatch, TimerMode};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{
    RESULT_DISPLAY_SECS, ROUND_DURATION_SECS, SUCCESS_THRESHOLD, TICK_INTERVAL_SECS,
};
use crate::detection::{DetectionProvider, SimulatedDetector};
use crate::emotion::{CATALOG, Emotion};
use crate::random::RandomSource;
use crate::wakeup::{FiredWakeup, Wakeup, WakeupTimer};

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    /// Countdown length, in ticks.
    pub round_duration: u32,
    pub tick_interval: Duration,
    /// How long the result stays up before returning to `Waiting`.
    pub result_display: Duration,
    /// Minimum score that extends the streak.
    pub success_threshold: u8,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_duration: ROUND_DURATION_SECS,
            tick_interval: Duration::from_secs(TICK_INTERVAL_SECS),
            result_display: Duration::from_secs(RESULT_DISPLAY_SECS),
            success_threshold: SUCCESS_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Waiting,
    Playing,
    Result,
}

/// Everything the presentation layer needs to render a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundState {
    pub phase: Phase,
    /// Set on entering `Playing` and kept through `Result`.
    pub current_emotion: Option<Emotion>,
    pub time_remaining: u32,
    pub total_score: u32,
    pub streak: u32,
    /// `None` until a round has completed.
    pub last_round_score: Option<u8>,
    /// Rounds completed since the last reset.
    pub rounds_played: u32,
}

impl RoundState {
    const fn new(round_duration: u32) -> Self {
        Self {
            phase: Phase::Waiting,
            current_emotion: None,
            time_remaining: round_duration,
            total_score: 0,
            streak: 0,
            last_round_score: None,
            rounds_played: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    RoundStarted {
        emotion: Emotion,
    },
    RoundEnded {
        emotion: Emotion,
        score: u8,
        total_score: u32,
        streak: u32,
        /// The detector failed and the score fell back to zero.
        detection_failed: bool,
    },
    StreakMilestone {
        streak: u32,
    },
    /// The result window closed and the controller is back in `Waiting`.
    ResultDismissed,
    SessionReset,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    #[error("A round can only start while waiting (currently {phase:?})")]
    NotWaiting { phase: Phase },
}

pub struct RoundController {
    config: RoundConfig,
    state: RoundState,
    detector: Box<dyn DetectionProvider>,
    rng: Box<dyn RandomSource>,
    clock: Stopwatch,
    countdown: Option<WakeupTimer>,
    dismissal: Option<WakeupTimer>,
    events: Vec<RoundEvent>,
}

impl Default for RoundController {
    fn default() -> Self {
        Self::new(
            RoundConfig::default(),
            SimulatedDetector::new(),
            fastrand::Rng::new(),
        )
    }
}

impl RoundController {
    pub fn new(
        config: RoundConfig,
        detector: impl DetectionProvider,
        rng: impl RandomSource,
    ) -> Self {
        Self {
            config,
            state: RoundState::new(config.round_duration),
            detector: Box::new(detector),
            rng: Box::new(rng),
            clock: Stopwatch::new(),
            countdown: None,
            dismissal: None,
            events: Vec::new(),
        }
    }

    pub const fn snapshot(&self) -> RoundState {
        self.state
    }

    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Time on the controller's own clock.
    pub fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Wake-ups armed and not yet fired.
    pub fn pending_wakeups(&self) -> usize {
        self.armed_wakeups().count()
    }

    /// What an external timer may deliver through [`Self::fire`].
    pub fn armed_wakeups(&self) -> impl Iterator<Item = FiredWakeup> + '_ {
        self.countdown
            .iter()
            .chain(self.dismissal.iter())
            .map(WakeupTimer::fired)
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn start_round(&mut self) -> Result<Emotion, RoundError> {
        if self.state.phase != Phase::Waiting {
            debug!("Start rejected in {:?}", self.state.phase);
            return Err(RoundError::NotWaiting {
                phase: self.state.phase,
            });
        }

        let index = self.rng.pick(CATALOG.len()) % CATALOG.len();
        let emotion = Emotion::from_index(index).unwrap_or(Emotion::Happy);

        self.state.phase = Phase::Playing;
        self.state.current_emotion = Some(emotion);
        self.state.time_remaining = self.config.round_duration;
        self.countdown = Some(WakeupTimer::new(
            self.config.tick_interval,
            TimerMode::Repeating,
            Wakeup::CountdownTick,
        ));

        info!("Round started: {emotion}");
        self.events.push(RoundEvent::RoundStarted { emotion });

        if self.state.time_remaining == 0 {
            self.finish_round();
        }

        Ok(emotion)
    }

    /// Counts one second off the round. Ignored outside `Playing`.
    pub fn tick(&mut self) {
        if self.state.phase != Phase::Playing {
            debug!("Tick ignored in {:?}", self.state.phase);
            return;
        }

        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        debug!("Tick, {} left", self.state.time_remaining);

        if self.state.time_remaining == 0 {
            self.finish_round();
        }
    }

    pub fn reset_session(&mut self) {
        self.cancel_wakeups();

        self.state.phase = Phase::Waiting;
        self.state.total_score = 0;
        self.state.streak = 0;
        self.state.rounds_played = 0;
        self.state.time_remaining = self.config.round_duration;

        info!("Session reset");
        self.events.push(RoundEvent::SessionReset);
    }

    /// Moves the clock forward by `dt`, firing every wake-up that falls due
    /// in deadline order. A wake-up armed while handling another runs on
    /// whatever is left of `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let mut left = dt;
        loop {
            let next_deadline = self
                .countdown
                .iter()
                .chain(self.dismissal.iter())
                .map(WakeupTimer::remaining)
                .min();
            let Some(step) = next_deadline.filter(|step| *step <= left) else {
                break;
            };

            let fired: Vec<FiredWakeup> = self
                .countdown
                .iter_mut()
                .chain(self.dismissal.iter_mut())
                .filter_map(|timer| timer.tick(step))
                .collect();
            self.clock.tick(step);
            left -= step;

            if fired.is_empty() {
                break;
            }
            for wakeup in fired {
                self.fire(wakeup);
            }
        }

        for timer in self.countdown.iter_mut().chain(self.dismissal.iter_mut()) {
            timer.tick(left);
        }
        self.clock.tick(left);
    }

    /// Delivers a wake-up. Anything but the currently armed countdown or
    /// dismissal is stale and ignored.
    pub fn fire(&mut self, fired: FiredWakeup) {
        match fired.wakeup {
            Wakeup::CountdownTick
                if self.countdown.as_ref().is_some_and(|t| t.matches(fired)) =>
            {
                if let Some(countdown) = self.countdown.as_mut() {
                    countdown.restart();
                }
                self.tick();
            }
            Wakeup::DismissResult
                if self.dismissal.as_ref().is_some_and(|t| t.matches(fired)) =>
            {
                self.dismissal = None;
                self.dismiss_result();
            }
            _ => debug!("Ignoring stale wake-up {:?}", fired),
        }
    }

    fn finish_round(&mut self) {
        self.countdown = None;

        let Some(emotion) = self.state.current_emotion else {
            return;
        };

        let (score, detection_failed) = match self.detector.score_expression(emotion) {
            Ok(raw) => (clamp_score(raw), false),
            Err(err) => {
                warn!("Detection failed for {emotion}, scoring 0: {err}");
                (0, true)
            }
        };

        self.state.phase = Phase::Result;
        self.state.time_remaining = 0;
        self.state.last_round_score = Some(score);
        self.state.total_score = self.state.total_score.saturating_add(u32::from(score));
        self.state.rounds_played = self.state.rounds_played.saturating_add(1);

        let success = score >= self.config.success_threshold;
        if success {
            self.state.streak = self.state.streak.saturating_add(1);
        } else {
            self.state.streak = 0;
        }

        info!(
            "Round ended: {emotion} scored {score}, total {}, streak {}",
            self.state.total_score, self.state.streak
        );
        self.events.push(RoundEvent::RoundEnded {
            emotion,
            score,
            total_score: self.state.total_score,
            streak: self.state.streak,
            detection_failed,
        });
        if success {
            self.events.push(RoundEvent::StreakMilestone {
                streak: self.state.streak,
            });
        }

        self.dismissal = Some(WakeupTimer::new(
            self.config.result_display,
            TimerMode::Once,
            Wakeup::DismissResult,
        ));
    }

    fn dismiss_result(&mut self) {
        if self.state.phase != Phase::Result {
            return;
        }
        self.state.phase = Phase::Waiting;
        self.events.push(RoundEvent::ResultDismissed);
    }

    fn cancel_wakeups(&mut self) {
        self.countdown = None;
        self.dismissal = None;
    }
}

fn clamp_score(raw: i32) -> u8 {
    let clamped = raw.clamp(0, i32::from(MAX_SCORE));
    if clamped != raw {
        warn!("Detector returned {raw}, clamped to {clamped}");
    }
    u8::try_from(clamped).unwrap_or(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DetectionError, ScriptedDetector};
    use crate::random::SequenceSource;

    const SECOND: Duration = Duration::from_secs(1);

    fn controller(scores: impl IntoIterator<Item = i32>) -> RoundController {
        RoundController::new(
            RoundConfig::default(),
            ScriptedDetector::scores(scores),
            SequenceSource::new([0]),
        )
    }

    fn play_round(controller: &mut RoundController) {
        controller.start_round().unwrap();
        for _ in 0..5 {
            controller.tick();
        }
    }

    fn assert_invariants(state: &RoundState) {
        assert!(state.time_remaining <= ROUND_DURATION_SECS);
        if let Some(score) = state.last_round_score {
            assert!(score <= MAX_SCORE);
        }
    }

    #[test]
    fn fresh_session_is_waiting() {
        let controller = controller([]);
        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.total_score, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.last_round_score, None);
        assert_eq!(controller.pending_wakeups(), 0);
    }

    #[test]
    fn start_picks_emotion_and_arms_countdown() {
        let mut controller = RoundController::new(
            RoundConfig::default(),
            ScriptedDetector::scores([]),
            SequenceSource::new([3]),
        );

        assert_eq!(controller.start_round(), Ok(Emotion::Surprised));
        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.current_emotion, Some(Emotion::Surprised));
        assert_eq!(state.time_remaining, 5);
        assert_eq!(controller.pending_wakeups(), 1);
        assert_eq!(
            controller.drain_events(),
            vec![RoundEvent::RoundStarted {
                emotion: Emotion::Surprised
            }]
        );
    }

    #[test]
    fn start_is_rejected_outside_waiting() {
        let mut controller = controller([85]);
        controller.start_round().unwrap();
        assert_eq!(
            controller.start_round(),
            Err(RoundError::NotWaiting {
                phase: Phase::Playing
            })
        );

        for _ in 0..5 {
            controller.tick();
        }
        // The dismissal wake-up is still pending.
        assert_eq!(
            controller.start_round(),
            Err(RoundError::NotWaiting {
                phase: Phase::Result
            })
        );
    }

    #[test]
    fn five_ticks_end_the_round_with_one_detection() {
        let detector = ScriptedDetector::scores([85, 10]);
        let detections = detector.call_log();
        let mut controller =
            RoundController::new(RoundConfig::default(), detector, SequenceSource::new([0]));
        controller.start_round().unwrap();

        for expected in (1..5).rev() {
            controller.tick();
            let state = controller.snapshot();
            assert_eq!(state.phase, Phase::Playing);
            assert_eq!(state.time_remaining, expected);
        }
        controller.tick();

        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Result);
        assert_eq!(state.time_remaining, 0);
        assert_eq!(state.last_round_score, Some(85));
        assert_eq!(detections.calls(), vec![Emotion::Happy]);

        // Extra ticks in Result must not consult the detector again.
        controller.tick();
        controller.advance(Duration::from_millis(2_999));
        assert_eq!(controller.snapshot(), state);
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn successful_round_fires_streak_milestone() {
        let mut controller = controller([85]);
        play_round(&mut controller);

        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Result);
        assert_eq!(state.last_round_score, Some(85));
        assert_eq!(state.total_score, 85);
        assert_eq!(state.streak, 1);

        let events = controller.drain_events();
        let milestones: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, RoundEvent::StreakMilestone { .. }))
            .collect();
        assert_eq!(milestones, vec![&RoundEvent::StreakMilestone { streak: 1 }]);
        assert!(events.contains(&RoundEvent::RoundEnded {
            emotion: Emotion::Happy,
            score: 85,
            total_score: 85,
            streak: 1,
            detection_failed: false,
        }));
    }

    #[test]
    fn second_round_below_threshold_breaks_streak() {
        let mut controller = controller([85, 60]);
        play_round(&mut controller);
        controller.advance(3 * SECOND);
        assert_eq!(controller.phase(), Phase::Waiting);

        play_round(&mut controller);
        let state = controller.snapshot();
        assert_eq!(state.total_score, 145);
        assert_eq!(state.streak, 0);
        assert_eq!(state.rounds_played, 2);
    }

    #[test]
    fn streak_follows_threshold_law() {
        let scores = [80, 95, 79, 100, 81, 82, 0, 90];
        let mut controller = controller(scores);
        let mut expected_streak = 0;
        let mut previous_total = 0;

        for score in scores {
            play_round(&mut controller);
            expected_streak = if score >= 80 { expected_streak + 1 } else { 0 };

            let state = controller.snapshot();
            assert_eq!(state.streak, expected_streak);
            assert!(state.total_score >= previous_total);
            previous_total = state.total_score;
            assert_invariants(&state);

            controller.advance(3 * SECOND);
        }
        assert_eq!(previous_total, scores.iter().sum::<i32>() as u32);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let mut controller = controller([150, -10]);
        play_round(&mut controller);
        assert_eq!(controller.snapshot().last_round_score, Some(100));

        controller.advance(3 * SECOND);
        play_round(&mut controller);
        let state = controller.snapshot();
        assert_eq!(state.last_round_score, Some(0));
        assert_eq!(state.total_score, 100);
        assert_eq!(state.streak, 0);
    }

    #[test]
    fn detection_failure_scores_zero() {
        let mut controller = RoundController::new(
            RoundConfig::default(),
            ScriptedDetector::new([Ok(90), Err(DetectionError::NoFaceDetected)]),
            SequenceSource::new([1]),
        );
        play_round(&mut controller);
        controller.advance(3 * SECOND);
        controller.drain_events();

        play_round(&mut controller);
        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Result);
        assert_eq!(state.last_round_score, Some(0));
        assert_eq!(state.total_score, 90);
        assert_eq!(state.streak, 0);
        assert!(controller.drain_events().contains(&RoundEvent::RoundEnded {
            emotion: Emotion::Sad,
            score: 0,
            total_score: 90,
            streak: 0,
            detection_failed: true,
        }));
    }

    #[test]
    fn advance_drives_countdown_and_dismissal() {
        let mut controller = controller([70]);
        controller.start_round().unwrap();

        controller.advance(Duration::from_millis(2_500));
        assert_eq!(controller.snapshot().time_remaining, 3);

        controller.advance(Duration::from_millis(2_500));
        assert_eq!(controller.phase(), Phase::Result);
        assert_eq!(controller.snapshot().last_round_score, Some(70));

        controller.advance(Duration::from_millis(2_999));
        assert_eq!(controller.phase(), Phase::Result);
        controller.advance(Duration::from_millis(1));
        assert_eq!(controller.phase(), Phase::Waiting);
        assert_eq!(controller.pending_wakeups(), 0);
        assert_eq!(
            controller.drain_events().last(),
            Some(&RoundEvent::ResultDismissed)
        );
    }

    #[test]
    fn one_large_step_runs_the_whole_round() {
        let mut controller = controller([88]);
        controller.start_round().unwrap();
        controller.advance(60 * SECOND);

        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.total_score, 88);
        assert_eq!(controller.now(), 60 * SECOND);
    }

    #[test]
    fn result_to_waiting_only_changes_phase() {
        let mut controller = controller([92]);
        play_round(&mut controller);
        let before = controller.snapshot();

        controller.advance(3 * SECOND);
        let after = controller.snapshot();
        assert_eq!(after.phase, Phase::Waiting);
        assert_eq!(
            after,
            RoundState {
                phase: Phase::Waiting,
                ..before
            }
        );
    }

    #[test]
    fn reset_from_every_phase() {
        for phase in [Phase::Waiting, Phase::Playing, Phase::Result] {
            let mut controller = controller([95]);
            match phase {
                Phase::Waiting => {}
                Phase::Playing => {
                    controller.start_round().unwrap();
                    controller.tick();
                }
                Phase::Result => play_round(&mut controller),
            }
            assert_eq!(controller.phase(), phase);

            controller.reset_session();
            let state = controller.snapshot();
            assert_eq!(state.phase, Phase::Waiting);
            assert_eq!(state.total_score, 0);
            assert_eq!(state.streak, 0);
            assert_eq!(controller.pending_wakeups(), 0);
            assert_eq!(
                controller.drain_events().last(),
                Some(&RoundEvent::SessionReset)
            );

            // Stale timers and spurious ticks are harmless.
            controller.tick();
            controller.advance(30 * SECOND);
            assert_eq!(controller.snapshot(), state);
        }
    }

    #[test]
    fn stale_countdown_does_not_touch_next_round() {
        let mut controller = controller([50, 50]);
        controller.start_round().unwrap();
        controller.advance(Duration::from_millis(900));
        controller.reset_session();

        controller.start_round().unwrap();
        // The first round's tick would have been due at 1s.
        controller.advance(Duration::from_millis(200));
        assert_eq!(controller.snapshot().time_remaining, 5);
        controller.advance(Duration::from_millis(800));
        assert_eq!(controller.snapshot().time_remaining, 4);
    }

    #[test]
    fn externally_delivered_stale_wakeup_is_ignored() {
        let mut controller = controller([85]);
        controller.start_round().unwrap();
        let stale: Vec<_> = controller.armed_wakeups().collect();
        controller.reset_session();
        let before = controller.snapshot();

        for fired in stale {
            controller.fire(fired);
        }
        assert_eq!(controller.snapshot(), before);
    }

    #[test]
    fn wakeup_from_another_controller_is_ignored() {
        let mut other = controller([85]);
        let mut controller = controller([85]);
        controller.start_round().unwrap();
        other.start_round().unwrap();

        let foreign: Vec<_> = other.armed_wakeups().collect();
        assert_eq!(foreign.len(), 1);
        let unrelated = WakeupTimer::new(SECOND, TimerMode::Once, Wakeup::CountdownTick);

        for fired in foreign.into_iter().chain([unrelated.fired()]) {
            controller.fire(fired);
        }
        assert_eq!(controller.snapshot().time_remaining, 5);
        assert_eq!(controller.pending_wakeups(), 1);
    }

    #[test]
    fn armed_countdown_can_be_delivered_externally() {
        let mut controller = controller([85]);
        controller.start_round().unwrap();
        controller.advance(Duration::from_millis(600));

        let Some(countdown) = controller.armed_wakeups().next() else {
            panic!("countdown should be armed while playing");
        };
        assert_eq!(countdown.wakeup, Wakeup::CountdownTick);
        controller.fire(countdown);
        assert_eq!(controller.snapshot().time_remaining, 4);

        // Delivery restarts the interval.
        controller.advance(Duration::from_millis(999));
        assert_eq!(controller.snapshot().time_remaining, 4);
        controller.advance(Duration::from_millis(1));
        assert_eq!(controller.snapshot().time_remaining, 3);
    }

    #[test]
    fn emotion_may_repeat_between_rounds() {
        let mut controller = RoundController::new(
            RoundConfig::default(),
            ScriptedDetector::scores([85, 85]),
            SequenceSource::new([4]),
        );
        play_round(&mut controller);
        controller.advance(3 * SECOND);
        play_round(&mut controller);
        assert_eq!(
            controller.snapshot().current_emotion,
            Some(Emotion::Disgusted)
        );
    }
}
