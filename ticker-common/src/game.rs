use crate::bundles::TeamBundle;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const QUARTER_LENGTH_SECS: u16 = 300;
pub const FIRST_QUARTER: u8 = 1;
pub const LAST_QUARTER: u8 = 4;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    Live,
    Final,
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Live => write!(f, "LIVE"),
            Self::Final => write!(f, "FINAL"),
        }
    }
}

/// A single simulated game shown in the ticker.
///
/// `quarter` and `time_remaining` are optional because seeded games may be
/// created already FINAL, and a LIVE game's clock is allowed to start unset
/// until its first tick.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub teams: TeamBundle<String>,
    pub scores: TeamBundle<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u16>,
    pub status: GameStatus,
}

impl GameRecord {
    /// A freshly started game at the top of the first quarter
    pub fn kickoff(team_a: String, team_b: String, scores: TeamBundle<u32>) -> Self {
        Self {
            teams: TeamBundle::new(team_a, team_b),
            scores,
            quarter: Some(FIRST_QUARTER),
            time_remaining: Some(QUARTER_LENGTH_SECS),
            status: GameStatus::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == GameStatus::Live
    }
}

impl Display for GameRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} vs {} {} ({})",
            self.teams.a, self.scores.a, self.teams.b, self.scores.b, self.status
        )
    }
}
