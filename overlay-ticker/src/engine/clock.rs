use log::*;
use ticker_common::game::{
    FIRST_QUARTER, GameRecord, GameStatus, LAST_QUARTER, QUARTER_LENGTH_SECS,
};

/// Runs one second off a game's clock, rolling over quarters and ending the
/// game at the end of the fourth.
///
/// A stored time of zero is treated the same as an unset clock and is
/// reloaded to a full quarter before the decrement.
pub fn advance(game: &mut GameRecord) {
    if game.status != GameStatus::Live {
        return;
    }

    let quarter = *game.quarter.get_or_insert(FIRST_QUARTER);
    let remaining = match game.time_remaining {
        Some(secs) if secs > 0 => secs,
        _ => QUARTER_LENGTH_SECS,
    } - 1;

    if remaining > 0 {
        game.time_remaining = Some(remaining);
    } else if quarter < LAST_QUARTER {
        game.quarter = Some(quarter + 1);
        game.time_remaining = Some(QUARTER_LENGTH_SECS);
        debug!("{game}: starting Q{}", quarter + 1);
    } else {
        game.time_remaining = Some(0);
        game.status = GameStatus::Final;
        info!("Game over: {game}");
    }
}
