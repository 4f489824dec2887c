use log::*;
use rand::Rng;
use ticker_common::{
    bundles::Side,
    game::GameRecord,
    timing::{FIELD_GOAL_PROBABILITY, TOUCHDOWN_PROBABILITY},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPlay {
    Touchdown,
    FieldGoal,
}

impl ScoringPlay {
    /// Maps a uniform draw in `[0, 1)` onto the outcome of one scoring tick
    pub fn from_draw(r: f64) -> Option<Self> {
        if r < TOUCHDOWN_PROBABILITY {
            Some(Self::Touchdown)
        } else if r < TOUCHDOWN_PROBABILITY + FIELD_GOAL_PROBABILITY {
            Some(Self::FieldGoal)
        } else {
            None
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Self::Touchdown => 7,
            Self::FieldGoal => 3,
        }
    }
}

/// Gives every live game one chance to score. Returns the number of games
/// whose score changed.
pub fn tick<R: Rng>(games: &mut [GameRecord], rng: &mut R) -> usize {
    let mut changed = 0;
    for game in games.iter_mut().filter(|g| g.is_live()) {
        let Some(play) = ScoringPlay::from_draw(rng.random()) else {
            continue;
        };
        let side = if rng.random_bool(0.5) { Side::A } else { Side::B };
        game.scores[side] = game.scores[side].saturating_add(play.points());
        trace!("{play:?} for {}: {game}", game.teams[side]);
        changed += 1;
    }
    changed
}
