pub mod bundles;

pub mod game;

pub mod feed_event;

pub mod frame;

pub mod timing {
    use core::time::Duration;

    pub const MAX_GAMES: usize = 24;
    pub const WINDOW_SIZE: usize = 3;

    pub const CLOCK_TICK_INTERVAL: Duration = Duration::from_secs(1);
    pub const SCORE_TICK_INTERVAL: Duration = Duration::from_secs(5);
    pub const ROSTER_GROWTH_INTERVAL: Duration = Duration::from_secs(15);
    pub const ROTATION_INTERVAL: Duration = Duration::from_secs(15);

    /// Length of each half of the fade-out/fade-in rotation choreography
    pub const ROTATION_TRANSITION_DELAY: Duration = Duration::from_millis(500);
    pub const DONATION_SCORE_DELAY: Duration = Duration::from_millis(3000);

    pub const TOUCHDOWN_PROBABILITY: f64 = 0.1;
    pub const FIELD_GOAL_PROBABILITY: f64 = 0.2;

    pub const SUBSCRIBER_POINTS: u32 = 6;
    pub const DONATION_POINTS: u32 = 3;
}
