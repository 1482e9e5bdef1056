pub mod camera;
pub mod config;
pub mod detection;
pub mod emotion;
pub mod feedback;
pub mod gameplay;
pub mod grading;
pub mod random;
pub mod round;
pub mod stats;
pub mod wakeup;

mod ribbit;
mod ui;

pub use ribbit::EmotionGuess;

use crate::feedback::FeedbackPlugin;
use crate::gameplay::RoundPlugin;
use crate::ui::ScreensPlugin;

pub fn run() {
    bits_helpers::get_default_app::<EmotionGuess>(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
    .add_plugins((RoundPlugin, FeedbackPlugin, ScreensPlugin))
    .run();
}
