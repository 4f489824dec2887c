use crate::{
    render::RenderTarget,
    scheduler::{Scheduler, Ticket},
};
use log::*;
use rand::rngs::StdRng;
use ticker_common::{
    feed_event::FeedEvent,
    frame::{SlotView, TickerCue},
    game::GameRecord,
    timing::{
        CLOCK_TICK_INTERVAL, ROSTER_GROWTH_INTERVAL, ROTATION_INTERVAL,
        ROTATION_TRANSITION_DELAY, SCORE_TICK_INTERVAL, WINDOW_SIZE,
    },
};
use tokio::time::{Duration, Instant};

pub mod clock;
pub mod roster;
pub mod rotation;
pub mod scoreboard;
pub mod simulator;

use roster::Roster;
use rotation::{Rotation, RotationState};
use scoreboard::{Award, Scoreboard};

/// Work the engine can have waiting on the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    ClockTick,
    ScoreTick,
    RosterGrowth,
    Rotate,
    RotationSwap,
    RotationSettle,
    Award { award: Award, name: String },
}

impl Task {
    /// Periodic tasks put themselves back on the schedule every time they run
    fn interval(&self) -> Option<Duration> {
        match self {
            Self::ClockTick => Some(CLOCK_TICK_INTERVAL),
            Self::ScoreTick => Some(SCORE_TICK_INTERVAL),
            Self::RosterGrowth => Some(ROSTER_GROWTH_INTERVAL),
            Self::Rotate => Some(ROTATION_INTERVAL),
            Self::RotationSwap | Self::RotationSettle | Self::Award { .. } => None,
        }
    }
}

/// Owns every piece of ticker and scoreboard state.
///
/// All mutation happens through `start`, `update` and `handle_feed_event`,
/// each of which runs to completion and takes the current time from the
/// caller. Rendering goes to whatever `RenderTarget` is passed in.
#[derive(Debug)]
pub struct TickerEngine {
    roster: Roster,
    name_pool: Vec<String>,
    rotation: Rotation,
    scoreboard: Scoreboard,
    scheduler: Scheduler<Task>,
    rng: StdRng,
    started: bool,
}

impl TickerEngine {
    pub fn new(games: Vec<GameRecord>, name_pool: Vec<String>, rng: StdRng) -> Self {
        Self {
            roster: Roster::new(games),
            name_pool,
            rotation: Rotation::new(),
            scoreboard: Scoreboard::default(),
            scheduler: Scheduler::new(),
            rng,
            started: false,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn cursor(&self) -> usize {
        self.rotation.cursor()
    }

    pub fn rotation_state(&self) -> RotationState {
        self.rotation.state()
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub fn visible_games(&self) -> [Option<&GameRecord>; WINDOW_SIZE] {
        self.rotation.window(self.roster.games())
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = (Ticket, Instant, &Task)> {
        self.scheduler.pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Draws the initial state and starts the periodic timers
    pub fn start(&mut self, now: Instant, target: &mut impl RenderTarget) {
        if self.started {
            warn!("Ticker engine already started");
            return;
        }
        info!(
            "Starting ticker with {} games and {} names in the pool",
            self.roster.len(),
            self.name_pool.len()
        );
        if self.roster.is_empty() {
            info!("Roster is empty, the ticker stays blank until a game is added");
        }

        self.draw_ticker(target);
        target.draw_scoreboard(self.scoreboard.score());

        for task in [
            Task::ClockTick,
            Task::ScoreTick,
            Task::RosterGrowth,
            Task::Rotate,
        ] {
            if let Some(interval) = task.interval() {
                self.scheduler.schedule(now + interval, task);
            }
        }
        self.started = true;
    }

    /// Runs every task that is due at `now`, oldest first. Returns how many
    /// tasks ran.
    pub fn update(&mut self, now: Instant, target: &mut impl RenderTarget) -> usize {
        let mut ran = 0;
        while let Some((due, task)) = self.scheduler.pop_due(now) {
            if let Some(interval) = task.interval() {
                self.scheduler.schedule(due + interval, task.clone());
            }
            self.run_task(task, due, target);
            ran += 1;
        }
        ran
    }

    pub fn handle_feed_event(
        &mut self,
        event: &FeedEvent,
        now: Instant,
        target: &mut impl RenderTarget,
    ) {
        let (award, delay) = Award::for_event(event);
        let name = event.name().to_string();
        info!("{}", award.announcement(&name));
        if delay.is_zero() {
            self.apply_award(award, &name, target);
        } else {
            debug!("Got {event}, points land in {delay:?}");
            self.scheduler.schedule(now + delay, Task::Award { award, name });
        }
    }

    /// Cancels everything still waiting on the scheduler. Returns how many
    /// tasks were cancelled.
    pub fn shutdown(&mut self) -> usize {
        self.started = false;
        if self.scheduler.is_empty() {
            info!("Ticker engine stopped with nothing pending");
            return 0;
        }

        debug!("Cancelling {} pending tasks", self.scheduler.len());
        let tickets: Vec<Ticket> = self.pending_tasks().map(|(ticket, _, _)| ticket).collect();
        let cancelled = tickets
            .into_iter()
            .filter_map(|ticket| self.scheduler.cancel(ticket))
            .count();
        info!("Ticker engine stopped, {cancelled} pending tasks cancelled");
        cancelled
    }

    /// `due` is when the task was meant to run; follow-up delays are measured
    /// from it so that late wakeups don't stretch the choreography
    fn run_task(&mut self, task: Task, due: Instant, target: &mut impl RenderTarget) {
        trace!("Running {task:?}");
        match task {
            Task::ClockTick => {
                self.roster.games_mut().iter_mut().for_each(clock::advance);
                self.draw_ticker(target);
            }
            Task::ScoreTick => {
                simulator::tick(self.roster.games_mut(), &mut self.rng);
                self.draw_ticker(target);
            }
            Task::RosterGrowth => {
                self.roster.synthesize_from_pool(&self.name_pool, &mut self.rng);
            }
            Task::Rotate => {
                if self.rotation.begin(self.roster.len()) {
                    target.set_ticker_cue(Some(TickerCue::Exiting));
                    self.scheduler
                        .schedule(due + ROTATION_TRANSITION_DELAY, Task::RotationSwap);
                }
            }
            Task::RotationSwap => {
                if self.rotation.swap(self.roster.len()) {
                    self.draw_ticker(target);
                    target.set_ticker_cue(Some(TickerCue::Entering));
                    self.scheduler
                        .schedule(due + ROTATION_TRANSITION_DELAY, Task::RotationSettle);
                }
            }
            Task::RotationSettle => {
                if self.rotation.settle() {
                    target.set_ticker_cue(None);
                }
            }
            Task::Award { award, name } => self.apply_award(award, &name, target),
        }
    }

    fn apply_award(&mut self, award: Award, name: &str, target: &mut impl RenderTarget) {
        let score = self.scoreboard.award(award, name);
        target.draw_scoreboard(score);
        target.play_animation(award.animation());
    }

    fn draw_ticker(&self, target: &mut impl RenderTarget) {
        target.draw_ticker(self.visible_games().map(|game| game.map(SlotView::from)));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::render::FrameOutput;
    use rand::SeedableRng;
    use std::sync::Once;
    use ticker_common::{
        bundles::TeamBundle,
        frame::{Animation, OverlayFrame},
        game::GameStatus,
        timing::{DONATION_SCORE_DELAY, MAX_GAMES},
    };

    static INIT: Once = Once::new();

    pub fn initialize() {
        INIT.call_once(|| {
            env_logger::init();
        });
    }

    type Output = FrameOutput<Vec<OverlayFrame>>;

    fn numbered_games(count: usize) -> Vec<GameRecord> {
        (1..=count)
            .map(|i| GameRecord::kickoff(format!("G{i}"), format!("H{i}"), TeamBundle::default()))
            .collect()
    }

    fn seed_games() -> Vec<GameRecord> {
        vec![
            GameRecord {
                teams: TeamBundle::new("NightOwl".to_string(), "CozyBear".to_string()),
                scores: TeamBundle::new(21, 18),
                quarter: Some(4),
                time_remaining: Some(185),
                status: GameStatus::Live,
            },
            GameRecord {
                teams: TeamBundle::new("FrostyMike".to_string(), "BlueNova".to_string()),
                scores: TeamBundle::new(14, 24),
                quarter: None,
                time_remaining: None,
                status: GameStatus::Final,
            },
        ]
    }

    fn engine(games: Vec<GameRecord>, pool: &[&str]) -> TickerEngine {
        TickerEngine::new(
            games,
            pool.iter().map(|s| s.to_string()).collect(),
            StdRng::seed_from_u64(99),
        )
    }

    fn visible_names(engine: &TickerEngine) -> Vec<Option<String>> {
        engine
            .visible_games()
            .iter()
            .map(|g| g.map(|g| g.teams.a.clone()))
            .collect()
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_start_draws_and_schedules() {
        initialize();
        let mut tk = engine(seed_games(), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();

        tk.start(start, &mut out);

        let frame = out.frame();
        assert_eq!(frame.scoreboard, "Score: 0");
        let first = frame.slots[0].as_ref().unwrap();
        assert_eq!(first.score_line.a, "NightOwl 21");
        assert_eq!(first.meta_line, "Q4 • 3:05");
        assert_eq!(frame.slots[1].as_ref().unwrap().meta_line, "FINAL");
        // Two games wrap around into the third slot
        assert_eq!(frame.slots[2], frame.slots[0]);

        let mut pending: Vec<_> = tk
            .pending_tasks()
            .map(|(_, at, task)| (at - start, task.clone()))
            .collect();
        pending.sort_by_key(|(d, _)| *d);
        assert_eq!(
            pending,
            vec![
                (secs(1), Task::ClockTick),
                (secs(5), Task::ScoreTick),
                (secs(15), Task::RosterGrowth),
                (secs(15), Task::Rotate),
            ]
        );

        // Starting twice doesn't double the timers
        tk.start(start, &mut out);
        assert_eq!(tk.pending_tasks().count(), 4);
    }

    #[test]
    fn test_clock_runs_every_second() {
        initialize();
        let mut tk = engine(seed_games(), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);

        assert_eq!(tk.update(start + millis(999), &mut out), 0);
        tk.update(start + secs(1), &mut out);
        assert_eq!(tk.roster().games()[0].time_remaining, Some(184));

        // A late wakeup catches up on every missed tick
        tk.update(start + secs(60), &mut out);
        assert_eq!(tk.roster().games()[0].time_remaining, Some(125));
        assert_eq!(out.frame().slots[0].as_ref().unwrap().meta_line, "Q4 • 2:05");

        // The game ends 185 seconds in and the FINAL one never changes
        tk.update(start + secs(600), &mut out);
        assert_eq!(tk.roster().games()[0].status, GameStatus::Final);
        assert_eq!(tk.roster().games()[0].time_remaining, Some(0));
        assert_eq!(tk.roster().games()[1], seed_games()[1]);
        assert_eq!(out.frame().slots[0].as_ref().unwrap().meta_line, "FINAL");
    }

    #[test]
    fn test_final_games_keep_their_scores() {
        initialize();
        let mut tk = engine(seed_games(), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);

        tk.update(start + secs(3600), &mut out);
        assert_eq!(tk.roster().games()[1], seed_games()[1]);
    }

    #[test]
    fn test_rotation_cycle_with_five_games() {
        initialize();
        let mut tk = engine(numbered_games(5), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);
        assert_eq!(tk.cursor(), 0);

        tk.update(start + secs(15), &mut out);
        assert_eq!(
            tk.rotation_state(),
            RotationState::Transitioning(rotation::TransitionStep::FadingOut)
        );
        assert_eq!(out.frame().cue, Some(TickerCue::Exiting));
        // Still showing the old window until the swap
        assert_eq!(tk.cursor(), 0);
        assert_eq!(
            visible_names(&tk),
            vec![Some("G1".into()), Some("G2".into()), Some("G3".into())]
        );

        tk.update(start + secs(15) + millis(499), &mut out);
        assert_eq!(tk.cursor(), 0);

        tk.update(start + secs(15) + millis(500), &mut out);
        assert_eq!(tk.cursor(), 3);
        assert_eq!(
            tk.rotation_state(),
            RotationState::Transitioning(rotation::TransitionStep::FadingIn)
        );
        assert_eq!(out.frame().cue, Some(TickerCue::Entering));
        assert_eq!(
            visible_names(&tk),
            vec![Some("G4".into()), Some("G5".into()), Some("G1".into())]
        );
        assert!(
            out.frame().slots[0]
                .as_ref()
                .unwrap()
                .score_line
                .a
                .starts_with("G4 ")
        );

        tk.update(start + secs(16), &mut out);
        assert_eq!(tk.rotation_state(), RotationState::Stable);
        assert_eq!(out.frame().cue, None);
        assert_eq!(tk.cursor(), 3);
    }

    #[test]
    fn test_cursor_after_many_cycles() {
        initialize();
        let len = 9;
        let mut tk = engine(numbered_games(len), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);

        for n in 1..=10u64 {
            tk.update(start + secs(15 * n + 1), &mut out);
            assert_eq!(tk.cursor(), (3 * n as usize) % len);
            assert_eq!(tk.rotation_state(), RotationState::Stable);
        }
    }

    #[test]
    fn test_no_rotation_with_three_games() {
        initialize();
        let mut tk = engine(numbered_games(3), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);

        tk.update(start + secs(600), &mut out);
        assert_eq!(tk.cursor(), 0);
        assert_eq!(tk.rotation_state(), RotationState::Stable);
        assert!(out.sink().iter().all(|frame| frame.cue.is_none()));
    }

    #[test]
    fn test_roster_grows_from_pool() {
        initialize();
        let mut tk = engine(vec![], &["TylerFPS", "CozyBear", "PixelWitch"]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);
        assert_eq!(out.frame().slots, [None, None, None]);

        tk.update(start + secs(15), &mut out);
        assert_eq!(tk.roster().len(), 1);
        tk.update(start + secs(45), &mut out);
        assert_eq!(tk.roster().len(), 3);

        tk.update(start + secs(15 * 40), &mut out);
        assert_eq!(tk.roster().len(), MAX_GAMES);
    }

    #[test]
    fn test_subscriber_scores_immediately() {
        initialize();
        let mut tk = engine(seed_games(), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);

        let event = FeedEvent::Subscriber {
            name: "Ann".to_string(),
        };
        tk.handle_feed_event(&event, start, &mut out);

        assert_eq!(tk.score(), 6);
        assert_eq!(out.frame().scoreboard, "Score: 6");
        assert_eq!(
            out.sink().last().unwrap().animation,
            Some(Animation::Touchdown)
        );
        // Nothing extra was left on the schedule
        assert_eq!(tk.pending_tasks().count(), 4);
    }

    #[test]
    fn test_donation_scores_after_delay() {
        initialize();
        let mut tk = engine(seed_games(), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);

        let event = FeedEvent::Donation {
            name: "Bo".to_string(),
            amount: 25.0,
        };
        let received = start + millis(200);
        tk.handle_feed_event(&event, received, &mut out);
        assert_eq!(tk.score(), 0);

        tk.update(received + DONATION_SCORE_DELAY - millis(1), &mut out);
        assert_eq!(tk.score(), 0);

        tk.update(received + DONATION_SCORE_DELAY, &mut out);
        assert_eq!(tk.score(), 3);
        assert_eq!(out.frame().scoreboard, "Score: 3");
        assert!(
            out.sink()
                .iter()
                .any(|frame| frame.animation == Some(Animation::FieldGoal))
        );
    }

    #[test]
    fn test_shutdown_cancels_pending_work() {
        initialize();
        let mut tk = engine(numbered_games(5), &[]);
        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);

        // Mid-rotation, with the swap still pending
        tk.update(start + secs(15), &mut out);
        assert!(
            tk.pending_tasks()
                .any(|(_, _, task)| *task == Task::RotationSwap)
        );

        let event = FeedEvent::Donation {
            name: "Bo".to_string(),
            amount: 5.0,
        };
        tk.handle_feed_event(&event, start + secs(15), &mut out);

        let tickets: Vec<_> = tk.pending_tasks().map(|(ticket, _, _)| ticket).collect();
        assert_eq!(tickets.len(), 6);
        assert_eq!(tk.shutdown(), 6);
        assert_eq!(tk.pending_tasks().count(), 0);
        assert_eq!(tk.next_deadline(), None);
        assert_eq!(tk.update(start + secs(60), &mut out), 0);
        assert_eq!(tk.score(), 0);
        assert_eq!(tk.cursor(), 0);
    }

    #[test]
    fn test_shutdown_with_nothing_pending() {
        initialize();
        let mut tk = engine(seed_games(), &[]);
        assert_eq!(tk.shutdown(), 0);

        let mut out = Output::new(Vec::new());
        let start = Instant::now();
        tk.start(start, &mut out);
        assert_eq!(tk.shutdown(), 4);
        assert_eq!(tk.shutdown(), 0);
        assert_eq!(tk.next_deadline(), None);
    }
}
