use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Subcommand;
use sitetime_core::timer::apply_rollover;
use sitetime_core::{
    format_hms, Config, Database, Event, IndicatorPalette, LifecycleController, Origin,
    Position, RecordRepo, RuleBook, TimerState, TICK_MS,
};

use super::now_ms;
use super::terminal::TerminalIndicator;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Track a foreground session on a site, ticking once per second
    Run {
        /// Hostname or URL of the site
        origin: Origin,
        /// How long to keep the session in the foreground
        #[arg(long, default_value = "60")]
        seconds: u64,
    },
    /// Print a site's stored timer as JSON
    Status {
        origin: Origin,
    },
    /// List every stored site timer as JSON
    List,
    /// Zero a site's elapsed time, keeping its indicator position
    Reset {
        origin: Origin,
    },
    /// Move a site's indicator back to the top-left corner
    ResetPosition {
        origin: Origin,
    },
    /// Delete every stored site timer
    ResetAll,
}

fn load_rules(config: &Config) -> Result<RuleBook, Box<dyn std::error::Error>> {
    Ok(RuleBook::from_config(config)?)
}

fn print_json(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

/// How often a waiting session checks for an interrupt.
const INTERRUPT_POLL: Duration = Duration::from_millis(100);

/// Flag raised by SIGINT/SIGTERM so the session can save before exiting.
fn interrupt_flag() -> Result<Arc<AtomicBool>, Box<dyn std::error::Error>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
    Ok(interrupted)
}

fn run_session(
    origin: Origin,
    seconds: u64,
    config: &Config,
    db: Database,
) -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rules(config)?;
    let mut ctl = LifecycleController::new(origin, &rules, db, TerminalIndicator::default())
        .with_palette(IndicatorPalette::from(&config.indicator));

    let interrupted = interrupt_flag()?;

    ctl.resume(now_ms());
    let started = Instant::now();
    'ticks: for tick in 1..=seconds {
        let deadline = started + Duration::from_millis(tick * TICK_MS);
        while let Some(wait) = deadline.checked_duration_since(Instant::now()) {
            if interrupted.load(Ordering::SeqCst) {
                break 'ticks;
            }
            thread::sleep(wait.min(INTERRUPT_POLL));
        }
        ctl.tick(now_ms());
        for event in ctl.take_events() {
            if let Event::RuleFired { .. } | Event::DayRolledOver { .. } = event {
                eprintln!();
                eprintln!("{}", serde_json::to_string(&event)?);
            }
        }
    }
    eprintln!();

    ctl.suspend(now_ms())?;
    print_json(&ctl.snapshot(now_ms()))
}

fn status(
    origin: Origin,
    config: &Config,
    repo: &RecordRepo<Database>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rules(config)?;
    let palette = IndicatorPalette::from(&config.indicator);
    let now = now_ms();

    let record = repo.load(&origin);
    let mut elapsed_ms = record.elapsed_ms;
    let mut last_update = record.last_update_epoch_ms;
    apply_rollover(&mut elapsed_ms, &mut last_update, now);

    let threshold_ms = rules.get(&origin).map(|r| r.threshold_ms());
    let expired = threshold_ms.is_some_and(|t| elapsed_ms >= t);
    let state = if expired {
        TimerState::Expired
    } else {
        TimerState::Paused
    };

    print_json(&Event::StateSnapshot {
        origin,
        state,
        elapsed_ms,
        display: format_hms(elapsed_ms),
        color: palette.color(state, expired).to_string(),
        position: record.position(),
        threshold_ms,
        at: sitetime_core::events::event_time(now),
    })
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        TimerAction::Run { origin, seconds } => run_session(origin, seconds, &config, db)?,
        TimerAction::Status { origin } => status(origin, &config, &RecordRepo::new(db))?,
        TimerAction::List => {
            let repo = RecordRepo::new(db);
            let entries: Vec<serde_json::Value> = repo
                .list()?
                .into_iter()
                .map(|(origin, record)| {
                    serde_json::json!({
                        "origin": origin,
                        "elapsed_ms": record.elapsed_ms,
                        "display": format_hms(record.elapsed_ms),
                        "position": record.position(),
                        "last_update_epoch_ms": record.last_update_epoch_ms,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        TimerAction::Reset { origin } => {
            let repo = RecordRepo::new(db);
            let mut record = repo.load(&origin);
            record.elapsed_ms = 0;
            record.last_update_epoch_ms = now_ms();
            repo.save(&origin, &record)?;
            println!("{{\"type\": \"timer_reset\", \"origin\": \"{origin}\"}}");
        }
        TimerAction::ResetPosition { origin } => {
            let repo = RecordRepo::new(db);
            let mut record = repo.load(&origin);
            record.set_position(Position::ORIGIN);
            repo.save(&origin, &record)?;
            println!("{{\"type\": \"position_reset\", \"origin\": \"{origin}\"}}");
        }
        TimerAction::ResetAll => {
            RecordRepo::new(db).reset_all()?;
            println!("{{\"type\": \"all_timers_reset\"}}");
        }
    }
    Ok(())
}
