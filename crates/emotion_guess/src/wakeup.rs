//! Cancellable wake-ups built on [`Timer`].
//!
//! A [`WakeupTimer`] is a `Timer` tagged with a [`WakeupHandle`]. The round
//! controller owns at most one per purpose and cancels it by dropping it.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

use bevy::time::{Timer, TimerMode};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

/// Names one armed wake-up. Unique for the whole process, so a handle
/// taken from one controller never matches a timer armed by another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WakeupHandle(u64);

impl WakeupHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wakeup {
    CountdownTick,
    DismissResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredWakeup {
    pub handle: WakeupHandle,
    pub wakeup: Wakeup,
}

#[derive(Debug, Clone)]
pub struct WakeupTimer {
    handle: WakeupHandle,
    wakeup: Wakeup,
    timer: Timer,
}

impl WakeupTimer {
    pub fn new(after: Duration, mode: TimerMode, wakeup: Wakeup) -> Self {
        Self {
            handle: WakeupHandle::next(),
            wakeup,
            timer: Timer::new(after, mode),
        }
    }

    pub const fn handle(&self) -> WakeupHandle {
        self.handle
    }

    pub const fn wakeup(&self) -> Wakeup {
        self.wakeup
    }

    pub const fn fired(&self) -> FiredWakeup {
        FiredWakeup {
            handle: self.handle,
            wakeup: self.wakeup,
        }
    }

    /// Time until the timer next finishes.
    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn matches(&self, fired: FiredWakeup) -> bool {
        self.handle == fired.handle && self.wakeup == fired.wakeup
    }

    /// Ticks the timer. Returns the wake-up if it finished during this tick.
    pub fn tick(&mut self, delta: Duration) -> Option<FiredWakeup> {
        self.timer.tick(delta);
        self.timer.just_finished().then(|| self.fired())
    }

    /// Starts the current interval over.
    pub fn restart(&mut self) {
        self.timer.reset();
    }
}
