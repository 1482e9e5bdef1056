use bevy::prelude::*;

// Round timing
pub const ROUND_DURATION_SECS: u32 = 5;
pub const TICK_INTERVAL_SECS: u64 = 1;
pub const RESULT_DISPLAY_SECS: u64 = 3;
pub const SUCCESS_THRESHOLD: u8 = 80;

// Session statistics
pub const RECENT_ROUNDS: usize = 3;
pub const HOT_STREAK_LENGTH: u32 = 10;

// Layout
pub const TITLE_FONT_SIZE: f32 = 40.0;
pub const EMOTION_FONT_SIZE: f32 = 48.0;
pub const BODY_FONT_SIZE: f32 = 24.0;
pub const HUD_FONT_SIZE: f32 = 22.0;
pub const RESULT_FONT_SIZE: f32 = 64.0;
pub const RESULT_BAR_SIZE: Vec2 = Vec2::new(240.0, 14.0);
pub const BUTTON_SIZE: Vec2 = Vec2::new(200.0, 60.0);
pub const CONTROL_BUTTON_SIZE: Vec2 = Vec2::new(110.0, 44.0);

pub const ACCENT: Color = Color::srgb(0.388, 0.4, 0.945);
pub const STREAK_COLOR: Srgba = Srgba::rgb(0.961, 0.62, 0.043);
pub const ACHIEVEMENT_COLOR: Srgba = Srgba::rgb(0.545, 0.361, 0.965);

/// Player-facing toggles.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub sound_enabled: bool,
    pub haptics_enabled: bool,
    /// Start the next round as soon as the result is dismissed.
    pub auto_start: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            haptics_enabled: true,
            auto_start: false,
        }
    }
}
