use clap::Parser;
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    error::Error,
    future::Future,
    path::PathBuf,
    pin::Pin,
    task::{Context, Poll},
};
use ticker_common::{feed_event::FeedEvent, frame::format_scoreboard};
use tokio::{
    select,
    sync::mpsc,
    time::{Instant, Sleep, sleep_until},
};

mod engine;
mod feed;
mod render;
mod scheduler;
mod update_sender;

mod config;
use config::Config;
use engine::TickerEngine;
use render::FrameOutput;
use update_sender::UpdateSender;

const APP_NAME: &str = "overlay-ticker";
const LOGGER_NAME: &str = "overlay_ticker";
const COMMON_LOGGER_NAME: &str = "ticker_common";
const FEED_CHANNEL_LEN: usize = 16;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long, short)]
    /// Port renderers connect to for overlay frames, overrides the config file
    port: Option<u16>,

    #[clap(long)]
    /// WebSocket URL of the event feed, overrides the config file
    feed_url: Option<String>,

    #[clap(long, conflicts_with = "feed_url")]
    /// Don't connect to the event feed
    no_feed: bool,

    #[clap(long)]
    /// Seed for the score simulator, random if not given
    seed: Option<u64>,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match args.log_location {
        Some(ref path) => path.clone(),
        None => {
            let mut path = directories::BaseDirs::new()
                .ok_or("Could not find a directory to store logs")?
                .data_local_dir()
                .to_path_buf();
            path.push("overlay-ticker-logs");
            path
        }
    };
    let mut log_path = log_base_path.clone();
    let mut archived_log_path = log_base_path;
    log_path.push(format!("{APP_NAME}-log.txt"));
    archived_log_path.push(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(debug_assertions)]
    println!("Log path: {}", log_path.display());

    // Only log to the console in debug mode
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("Log path is not valid UTF-8")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))?;

    // Everything outside this crate only logs errors
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config.loggers(crate_loggers(log_level)).build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();
    Ok(())
}

/// Both workspace crates log at the requested level
fn crate_loggers(log_level: LevelFilter) -> [Logger; 2] {
    [LOGGER_NAME, COMMON_LOGGER_NAME].map(|name| Logger::builder().build(name, log_level))
}

fn load_config() -> Result<Config, Box<dyn Error>> {
    info!(
        "Reading config file from {:?}",
        confy::get_configuration_file_path(APP_NAME, None)?
    );

    let config = match confy::load(APP_NAME, None) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            confy::store(APP_NAME, None, &config)?;
            config
        }
    };
    Ok(config)
}

enum Wakeup {
    Never(core::future::Pending<()>),
    At(Pin<Box<Sleep>>),
}

impl Wakeup {
    fn new(deadline: Option<Instant>) -> Self {
        match deadline {
            Some(at) => Self::At(Box::pin(sleep_until(at))),
            None => Self::Never(core::future::pending()),
        }
    }
}

impl Future for Wakeup {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match *self {
            Self::Never(ref mut pend) => Pin::new(pend).poll(cx),
            Self::At(ref mut slp) => slp.as_mut().poll(cx),
        }
    }
}

async fn next_event(rx: &mut Option<mpsc::Receiver<FeedEvent>>) -> Option<FeedEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => core::future::pending().await,
    }
}

enum Step {
    Timer,
    Feed(Option<FeedEvent>),
    Stop(std::io::Result<()>),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    init_logging(&args)?;

    info!("Starting Overlay Ticker");
    let config = load_config()?;

    let port = args.port.unwrap_or(config.overlay.port);
    let feed_url = if args.no_feed {
        None
    } else {
        Some(args.feed_url.unwrap_or(config.feed.url))
    }
    .filter(|url| !url.trim().is_empty());

    let rng = match args.seed {
        Some(seed) => {
            info!("Using score simulator seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let mut engine = TickerEngine::new(config.roster.games, config.roster.names, rng);
    let mut output = FrameOutput::new(UpdateSender::new(port));

    let (mut feed_rx, feed_join) = match feed_url {
        Some(url) => {
            let (tx, rx) = mpsc::channel(FEED_CHANNEL_LEN);
            (Some(rx), Some(tokio::spawn(feed::feed_loop(url, tx))))
        }
        None => {
            info!("Event feed disabled");
            (None, None)
        }
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    engine.start(Instant::now(), &mut output);

    loop {
        let step = select! {
            _ = Wakeup::new(engine.next_deadline()) => Step::Timer,
            event = next_event(&mut feed_rx) => Step::Feed(event),
            res = &mut ctrl_c => Step::Stop(res),
        };

        match step {
            Step::Timer => {
                engine.update(Instant::now(), &mut output);
            }
            Step::Feed(Some(event)) => {
                engine.handle_feed_event(&event, Instant::now(), &mut output);
            }
            Step::Feed(None) => {
                warn!("Event feed stopped, continuing without it");
                feed_rx = None;
            }
            Step::Stop(res) => {
                if let Err(e) = res {
                    error!("Failed to listen for Ctrl-C: {e}");
                }
                break;
            }
        }
    }

    info!("Shutting down");
    debug!("Last frame sent: {:?}", output.frame());
    for (ticket, at, task) in engine.pending_tasks() {
        trace!("Still pending: {ticket:?} {task:?} due at {at:?}");
    }
    info!(
        "Final {}, {} games in the roster, ticker showing from game #{} ({})",
        format_scoreboard(engine.score()),
        engine.roster().len(),
        engine.cursor() + 1,
        engine.rotation_state()
    );
    let cancelled = engine.shutdown();
    debug!("{cancelled} tasks were still pending");
    drop(feed_rx);
    if let Some(join) = feed_join {
        join.abort();
    }

    Ok(())
}
