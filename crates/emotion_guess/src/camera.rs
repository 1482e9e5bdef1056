use bevy::prelude::*;
use strum::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

impl CameraFacing {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// What the device camera reports. The round logic never looks at the
/// picture itself; without permission no round can start.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraStatus {
    pub facing: CameraFacing,
    pub permission_granted: bool,
}

impl CameraStatus {
    pub const fn granted() -> Self {
        Self {
            facing: CameraFacing::Front,
            permission_granted: true,
        }
    }

    pub fn flip(&mut self) {
        self.facing = self.facing.flipped();
    }
}
