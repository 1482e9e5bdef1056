use bevy::log::info;
use bevy::prelude::World;
use bits_helpers::RibbitMessageHandler;
use ribbit_bits::{BitDuration, BitResult};

use crate::gameplay::Round;

#[derive(Default, Clone, Copy)]
pub struct EmotionGuess;

impl RibbitMessageHandler for EmotionGuess {
    fn restart(world: &mut World) {
        info!("Restarting EmotionGuess");
        world.resource_mut::<Round>().reset_session();
    }

    fn end(world: &mut World) -> BitResult {
        let total_score = world.resource::<Round>().snapshot().total_score;
        info!("Ending EmotionGuess with {total_score}");
        BitResult::HighestScore(total_score.into())
    }

    fn duration(_world: &mut World) -> BitDuration {
        // Rounds repeat until the host ends the bit.
        BitDuration::max_duration()
    }
}
