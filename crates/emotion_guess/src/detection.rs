use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::emotion::Emotion;

/// Range the simulated detector draws its accuracy from.
pub const SIMULATED_SCORE_RANGE: RangeInclusive<i32> = 60..=100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("No face detected in the camera frame")]
    NoFaceDetected,

    #[error("Camera permission was revoked during the round")]
    PermissionRevoked,

    #[error("Camera is unavailable")]
    CameraUnavailable,

    #[error("Expression model failed: {0}")]
    Model(String),
}

/// Scores how well the player acted out an emotion.
///
/// Implementations may return any integer; the round controller clamps the
/// result to `0..=100` and treats an error as a score of zero.
pub trait DetectionProvider: Send + Sync + 'static {
    fn score_expression(&mut self, emotion: Emotion) -> Result<i32, DetectionError>;
}

/// Stand-in for a real expression model: a uniform score in
/// [`SIMULATED_SCORE_RANGE`], whatever the emotion.
pub struct SimulatedDetector {
    rng: fastrand::Rng,
}

impl SimulatedDetector {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for SimulatedDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionProvider for SimulatedDetector {
    fn score_expression(&mut self, _emotion: Emotion) -> Result<i32, DetectionError> {
        Ok(self.rng.i32(SIMULATED_SCORE_RANGE))
    }
}

/// Emotions a [`ScriptedDetector`] was asked about, in call order. Clones
/// share the log, so it stays readable after the detector is handed over.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Emotion>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Emotion> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    fn push(&self, emotion: Emotion) {
        self.0.lock().push(emotion);
    }
}

/// Replays a fixed list of outcomes, one per round. Once the script runs
/// out every further call fails with [`DetectionError::CameraUnavailable`].
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    outcomes: VecDeque<Result<i32, DetectionError>>,
    calls: CallLog,
}

impl ScriptedDetector {
    pub fn new(outcomes: impl IntoIterator<Item = Result<i32, DetectionError>>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            calls: CallLog::default(),
        }
    }

    pub fn scores(scores: impl IntoIterator<Item = i32>) -> Self {
        Self::new(scores.into_iter().map(Ok))
    }

    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }
}

impl DetectionProvider for ScriptedDetector {
    fn score_expression(&mut self, emotion: Emotion) -> Result<i32, DetectionError> {
        self.calls.push(emotion);
        self.outcomes
            .pop_front()
            .unwrap_or(Err(DetectionError::CameraUnavailable))
    }
}
