use log::*;
use ticker_common::{
    feed_event::FeedEvent,
    frame::Animation,
    timing::{DONATION_POINTS, DONATION_SCORE_DELAY, SUBSCRIBER_POINTS},
};
use tokio::time::Duration;

/// The kinds of points the feed can put on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Award {
    Touchdown,
    FieldGoal,
}

impl Award {
    pub fn points(self) -> u32 {
        match self {
            Self::Touchdown => SUBSCRIBER_POINTS,
            Self::FieldGoal => DONATION_POINTS,
        }
    }

    pub fn animation(self) -> Animation {
        match self {
            Self::Touchdown => Animation::Touchdown,
            Self::FieldGoal => Animation::FieldGoal,
        }
    }

    /// The line announced when the event arrives, before any delay
    pub fn announcement(self, name: &str) -> String {
        format!("{name} scored a {}!", self.abbreviation())
    }

    fn abbreviation(self) -> &'static str {
        match self {
            Self::Touchdown => "TD",
            Self::FieldGoal => "FG",
        }
    }

    /// What a feed event earns, and how long to wait before it lands. The
    /// donation amount doesn't affect either.
    pub fn for_event(event: &FeedEvent) -> (Self, Duration) {
        match event {
            FeedEvent::Subscriber { .. } => (Self::Touchdown, Duration::ZERO),
            FeedEvent::Donation { .. } => (Self::FieldGoal, DONATION_SCORE_DELAY),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    score: u32,
}

impl Scoreboard {
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn award(&mut self, award: Award, name: &str) -> u32 {
        self.score = self.score.saturating_add(award.points());
        info!(
            "{} points for {name}, scoreboard is now {}",
            award.points(),
            self.score
        );
        self.score
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_award_points() {
        let mut board = Scoreboard::default();
        assert_eq!(board.award(Award::Touchdown, "Ann"), 6);
        assert_eq!(board.award(Award::FieldGoal, "Bo"), 9);
        assert_eq!(board.score(), 9);
    }

    #[test]
    fn test_announcement() {
        assert_eq!(Award::Touchdown.announcement("Ann"), "Ann scored a TD!");
        assert_eq!(Award::FieldGoal.announcement("Bo"), "Bo scored a FG!");
    }

    #[test]
    fn test_event_mapping_ignores_amount() {
        let sub = FeedEvent::Subscriber {
            name: "Ann".to_string(),
        };
        assert_eq!(Award::for_event(&sub), (Award::Touchdown, Duration::ZERO));

        for amount in [0.0, 1.0, 25.0, 10_000.0] {
            let donation = FeedEvent::Donation {
                name: "Bo".to_string(),
                amount,
            };
            assert_eq!(
                Award::for_event(&donation),
                (Award::FieldGoal, Duration::from_millis(3000))
            );
        }
    }
}
