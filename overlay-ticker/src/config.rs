use serde::{Deserialize, Serialize};
use ticker_common::{
    bundles::TeamBundle,
    game::{GameRecord, GameStatus},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// WebSocket URL of the event feed. Empty disables the feed.
    pub url: String,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8765".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub port: u16,
}

impl Default for Overlay {
    fn default() -> Self {
        Self { port: 8001 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSeed {
    pub names: Vec<String>,
    pub games: Vec<GameRecord>,
}

impl Default for RosterSeed {
    fn default() -> Self {
        let game = |a: &str,
                    b: &str,
                    scores: (u32, u32),
                    quarter: Option<u8>,
                    time: Option<u16>,
                    status: GameStatus| GameRecord {
            teams: TeamBundle::new(a.to_string(), b.to_string()),
            scores: TeamBundle::new(scores.0, scores.1),
            quarter,
            time_remaining: time,
            status,
        };

        Self {
            names: [
                "TylerFPS",
                "CozyBear",
                "PixelWitch",
                "NightOwl",
                "FrostyMike",
                "AstroCat",
                "BlueNova",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            games: vec![
                game(
                    "NightOwl",
                    "CozyBear",
                    (21, 18),
                    Some(4),
                    Some(185),
                    GameStatus::Live,
                ),
                game(
                    "PixelFox",
                    "AstroCat",
                    (10, 10),
                    Some(3),
                    Some(522),
                    GameStatus::Live,
                ),
                game(
                    "FrostyMike",
                    "BlueNova",
                    (14, 24),
                    None,
                    None,
                    GameStatus::Final,
                ),
            ],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub feed: Feed,
    pub overlay: Overlay,
    pub roster: RosterSeed,
}
