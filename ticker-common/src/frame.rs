use crate::{
    bundles::TeamBundle,
    game::{GameRecord, GameStatus},
    timing::WINDOW_SIZE,
};
use serde::{Deserialize, Serialize};

/// Everything an overlay renderer needs to draw the current state. One of
/// these is sent, as a line of JSON, after every change.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub slots: [Option<SlotView>; WINDOW_SIZE],
    pub cue: Option<TickerCue>,
    pub scoreboard: String,
    /// Only set on the frame that should start the animation
    pub animation: Option<Animation>,
}

/// Pre-formatted strings for one ticker slot
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct SlotView {
    pub score_line: TeamBundle<String>,
    pub meta_line: String,
}

impl From<&GameRecord> for SlotView {
    fn from(game: &GameRecord) -> Self {
        let score_line = TeamBundle::new(
            format!("{} {}", game.teams.a, game.scores.a),
            format!("{} {}", game.teams.b, game.scores.b),
        );

        let meta_line = match game.status {
            GameStatus::Final => "FINAL".to_string(),
            GameStatus::Live => {
                let quarter = game.quarter.unwrap_or(crate::game::FIRST_QUARTER);
                match game.time_remaining {
                    Some(secs) => format!("Q{quarter} • {}", format_time(secs)),
                    None => format!("Q{quarter} • --:--"),
                }
            }
        };

        Self {
            score_line,
            meta_line,
        }
    }
}

/// Visual transition applied to all ticker slots during a rotation
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TickerCue {
    /// Slots are fading out, still showing the old games
    Exiting,
    /// Slots are fading in with the new games
    Entering,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Animation {
    Touchdown,
    FieldGoal,
}

impl Animation {
    pub fn clip(self) -> &'static str {
        match self {
            Self::Touchdown => "touchdown.mp4",
            Self::FieldGoal => "fieldgoal.mp4",
        }
    }
}

pub fn format_time(secs: u16) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn format_scoreboard(score: u32) -> String {
    format!("Score: {score}")
}
