use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// An emotion the player is asked to act out.
///
/// The catalog is fixed and ordered; see [`CATALOG`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumCount, EnumIter,
    IntoStaticStr,
)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Disgusted,
    Fearful,
}

pub const CATALOG: [Emotion; Emotion::COUNT] = [
    Emotion::Happy,
    Emotion::Sad,
    Emotion::Angry,
    Emotion::Surprised,
    Emotion::Disgusted,
    Emotion::Fearful,
];

impl Emotion {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Instruction shown to the player while the round is running.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Happy => "Show your biggest smile!",
            Self::Sad => "Look really sad and disappointed",
            Self::Angry => "Show your angriest face!",
            Self::Surprised => "Act like you're shocked!",
            Self::Disgusted => "Something smells terrible!",
            Self::Fearful => "You're really scared!",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😢",
            Self::Angry => "😠",
            Self::Surprised => "😲",
            Self::Disgusted => "🤢",
            Self::Fearful => "😨",
        }
    }

    /// Accent colour as sRGB bytes.
    pub const fn color(self) -> [u8; 3] {
        match self {
            Self::Happy => [0xF5, 0x9E, 0x0B],
            Self::Sad => [0x3B, 0x82, 0xF6],
            Self::Angry => [0xEF, 0x44, 0x44],
            Self::Surprised => [0x8B, 0x5C, 0xF6],
            Self::Disgusted => [0x10, 0xB9, 0x81],
            Self::Fearful => [0xF9, 0x73, 0x16],
        }
    }

    /// Position in [`CATALOG`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        CATALOG.get(index).copied()
    }
}
