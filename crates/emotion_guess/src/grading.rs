use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Grade {
    #[strum(to_string = "Perfect!")]
    Perfect,
    #[strum(to_string = "Great!")]
    Great,
    #[strum(to_string = "Good!")]
    Good,
    #[strum(to_string = "Keep trying!")]
    KeepTrying,
}

impl Grade {
    pub const fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::Perfect,
            80..=89 => Self::Great,
            70..=79 => Self::Good,
            _ => Self::KeepTrying,
        }
    }
}

/// Colour band of the result bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Success,
    Fair,
    Poor,
}

impl ScoreBand {
    pub const fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Success,
            60..=79 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub const fn color(self) -> [u8; 3] {
        match self {
            Self::Success => [0x10, 0xB9, 0x81],
            Self::Fair => [0xF5, 0x9E, 0x0B],
            Self::Poor => [0xEF, 0x44, 0x44],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_score(100), Grade::Perfect);
        assert_eq!(Grade::from_score(90), Grade::Perfect);
        assert_eq!(Grade::from_score(89), Grade::Great);
        assert_eq!(Grade::from_score(80), Grade::Great);
        assert_eq!(Grade::from_score(79), Grade::Good);
        assert_eq!(Grade::from_score(70), Grade::Good);
        assert_eq!(Grade::from_score(69), Grade::KeepTrying);
        assert_eq!(Grade::from_score(0), Grade::KeepTrying);
        assert_eq!(Grade::KeepTrying.to_string(), "Keep trying!");
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Success);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(60), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(59), ScoreBand::Poor);
    }
}
