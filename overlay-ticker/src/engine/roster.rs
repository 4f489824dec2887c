use log::*;
use rand::{Rng, seq::SliceRandom};
use ticker_common::{bundles::TeamBundle, game::GameRecord, timing::MAX_GAMES};

/// Initial scores of a synthesized game are drawn from `0..NEW_GAME_MAX_SCORE`
const NEW_GAME_MAX_SCORE: u32 = 7;

/// The ordered set of every game the ticker knows about.
///
/// Only the roster can change how many games there are; everything else
/// gets a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    games: Vec<GameRecord>,
    max_games: usize,
}

impl Roster {
    pub fn new(mut games: Vec<GameRecord>) -> Self {
        if games.len() > MAX_GAMES {
            warn!(
                "Seed roster has {} games, keeping the first {MAX_GAMES}",
                games.len()
            );
            games.truncate(MAX_GAMES);
        }
        Self {
            games,
            max_games: MAX_GAMES,
        }
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn games_mut(&mut self) -> &mut [GameRecord] {
        &mut self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.games.len() >= self.max_games
    }

    /// Appends a new game at the start of its first quarter. Returns `false`
    /// without touching the roster if it is already full.
    pub fn add_game<R: Rng>(&mut self, team_a: String, team_b: String, rng: &mut R) -> bool {
        if self.is_full() {
            trace!("Roster full, not adding {team_a} vs {team_b}");
            return false;
        }

        let scores = TeamBundle::new(
            rng.random_range(0..NEW_GAME_MAX_SCORE),
            rng.random_range(0..NEW_GAME_MAX_SCORE),
        );
        let game = GameRecord::kickoff(team_a, team_b, scores);
        info!("Adding game #{}: {game}", self.games.len() + 1);
        self.games.push(game);
        true
    }

    /// Picks two distinct entries of `pool` at random and starts a game
    /// between them
    pub fn synthesize_from_pool<R: Rng>(&mut self, pool: &[String], rng: &mut R) -> bool {
        if pool.len() < 2 || self.is_full() {
            trace!(
                "Skipping game synthesis (pool size {}, roster size {})",
                pool.len(),
                self.games.len()
            );
            return false;
        }

        let mut names = pool.to_vec();
        names.shuffle(rng);
        let mut names = names.into_iter();
        match (names.next(), names.next()) {
            (Some(a), Some(b)) => self.add_game(a, b, rng),
            _ => false,
        }
    }
}
