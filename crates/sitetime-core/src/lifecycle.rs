//! Lifecycle controller.
//!
//! Binds one origin's [`TimerEngine`] to page visibility. Resume loads the
//! stored record and starts ticking; suspend stops ticking and persists.
//!
//! ## State Transitions
//!
//! ```text
//! (load) -> Running -> Expired          rule threshold reached on a tick
//! Running | Expired -> Paused           suspend (hidden, unload, click)
//! Paused -> Running | Expired           resume (visible, click)
//! ```
//!
//! Expired survives pause/resume for the controller's lifetime. Only a new
//! controller (page reload) or [`LifecycleController::reset_current_timer`]
//! clears it.

use crate::error::StoreError;
use crate::events::{event_time, Event};
use crate::indicator::{Indicator, IndicatorPalette};
use crate::origin::Origin;
use crate::rules::{RuleBook, RuleEvaluator, RuleFiring};
use crate::storage::{OriginRecord, Position, RecordRepo, Store};
use crate::timer::{TimerEngine, TimerState};

/// Host notifications the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Hidden,
    Visible,
    BeforeUnload,
    /// Click on the indicator that was not the end of a drag.
    Click,
}

/// Menu commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ResetTimer,
    ResetPosition,
    ResetAll,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub total_ms: u64,
    pub display: String,
    pub state: TimerState,
    pub rolled_over: bool,
    pub fired: Option<RuleFiring>,
}

/// Per-page session state for the active origin.
#[derive(Debug)]
struct Session {
    origin: Origin,
    engine: TimerEngine,
    evaluator: RuleEvaluator,
    expired: bool,
    /// Set by the first resume; nothing is persisted before it.
    loaded: bool,
}

pub struct LifecycleController<S: Store, I: Indicator> {
    repo: RecordRepo<S>,
    session: Session,
    indicator: I,
    palette: IndicatorPalette,
    events: Vec<Event>,
}

impl<S: Store, I: Indicator> LifecycleController<S, I> {
    pub fn new(origin: Origin, rules: &RuleBook, store: S, indicator: I) -> Self {
        let evaluator = RuleEvaluator::new(rules, &origin);
        Self {
            repo: RecordRepo::new(store),
            session: Session {
                origin,
                engine: TimerEngine::new(),
                evaluator,
                expired: false,
                loaded: false,
            },
            indicator,
            palette: IndicatorPalette::default(),
            events: Vec::new(),
        }
    }

    pub fn with_palette(mut self, palette: IndicatorPalette) -> Self {
        self.palette = palette;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn origin(&self) -> &Origin {
        &self.session.origin
    }

    pub fn state(&self) -> TimerState {
        if !self.session.engine.is_ticking() {
            TimerState::Paused
        } else if self.session.expired {
            TimerState::Expired
        } else {
            TimerState::Running
        }
    }

    pub fn is_expired(&self) -> bool {
        self.session.expired
    }

    pub fn running_total_ms(&self) -> u64 {
        self.session.engine.running_total_ms()
    }

    pub fn display(&self) -> &str {
        self.session.engine.display()
    }

    pub fn color(&self) -> &str {
        self.palette.color(self.state(), self.session.expired)
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    pub fn repo(&self) -> &RecordRepo<S> {
        &self.repo
    }

    /// Events produced since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self, now_ms: i64) -> Event {
        Event::StateSnapshot {
            origin: self.session.origin.clone(),
            state: self.state(),
            elapsed_ms: self.running_total_ms(),
            display: self.display().to_string(),
            color: self.color().to_string(),
            position: self.indicator.position(),
            threshold_ms: self.session.evaluator.threshold_ms(),
            at: event_time(now_ms),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the stored record and start ticking.
    ///
    /// Ignored (returns `false`) while already ticking: reloading then would
    /// replace the live total with an older snapshot.
    pub fn resume(&mut self, now_ms: i64) -> bool {
        if self.session.engine.is_ticking() {
            tracing::warn!("Ignoring resume for {}: already running", self.session.origin);
            return false;
        }

        let record = self.repo.load(&self.session.origin);
        let rolled_over =
            self.session
                .engine
                .load(record.elapsed_ms, record.last_update_epoch_ms, now_ms);
        self.session.loaded = true;
        self.indicator.move_to(record.position());

        self.events.push(Event::TimerResumed {
            origin: self.session.origin.clone(),
            elapsed_ms: self.session.engine.running_total_ms(),
            rolled_over,
            at: event_time(now_ms),
        });

        // A budget already spent earlier today expires the page right away.
        self.evaluate_rule(now_ms);

        self.session.engine.start(now_ms);
        tracing::debug!(
            "Resumed {} at {} ms",
            self.session.origin,
            self.session.engine.running_total_ms()
        );
        self.render();
        true
    }

    /// Stop ticking and persist elapsed time and indicator position.
    ///
    /// Safe to call repeatedly. A store failure is returned, but the
    /// in-memory session keeps its values and the next suspend retries.
    pub fn suspend(&mut self, now_ms: i64) -> Result<(), StoreError> {
        if !self.session.loaded {
            tracing::debug!("Nothing to persist for {}: never resumed", self.session.origin);
            return Ok(());
        }

        self.session.engine.stop();
        self.session.engine.stamp(now_ms);

        let mut record = OriginRecord {
            elapsed_ms: self.session.engine.running_total_ms(),
            last_update_epoch_ms: now_ms,
            ..Default::default()
        };
        record.set_position(self.indicator.position());

        self.render();
        self.events.push(Event::TimerSuspended {
            origin: self.session.origin.clone(),
            elapsed_ms: record.elapsed_ms,
            position: record.position(),
            at: event_time(now_ms),
        });

        self.repo.save(&self.session.origin, &record).map_err(|e| {
            tracing::warn!("Failed to persist {}: {e}", self.session.origin);
            e
        })
    }

    /// Advance one tick. Returns `None` while paused.
    pub fn tick(&mut self, now_ms: i64) -> Option<TickReport> {
        let outcome = self.session.engine.tick(now_ms)?;
        if outcome.rolled_over {
            self.events.push(Event::DayRolledOver {
                origin: self.session.origin.clone(),
                at: event_time(now_ms),
            });
        }

        let fired = self.evaluate_rule(now_ms);
        self.render();

        Some(TickReport {
            total_ms: self.session.engine.running_total_ms(),
            display: self.display().to_string(),
            state: self.state(),
            rolled_over: outcome.rolled_over,
            fired,
        })
    }

    /// Click on the indicator: pause when active, resume when paused.
    pub fn toggle(&mut self, now_ms: i64) -> Result<(), StoreError> {
        if self.session.engine.is_ticking() {
            self.suspend(now_ms)
        } else {
            self.resume(now_ms);
            Ok(())
        }
    }

    pub fn handle(&mut self, event: PageEvent, now_ms: i64) -> Result<(), StoreError> {
        match event {
            PageEvent::Hidden | PageEvent::BeforeUnload => self.suspend(now_ms),
            PageEvent::Visible => {
                self.resume(now_ms);
                Ok(())
            }
            PageEvent::Click => self.toggle(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn command(&mut self, command: Command, now_ms: i64) -> Result<(), StoreError> {
        match command {
            Command::ResetTimer => {
                self.reset_current_timer(now_ms);
                Ok(())
            }
            Command::ResetPosition => {
                self.reset_position(now_ms);
                Ok(())
            }
            Command::ResetAll => self.reset_all_origins(now_ms),
        }
    }

    /// Zero the in-memory total and clear Expired. Persisted at the next
    /// suspend; position is left alone.
    pub fn reset_current_timer(&mut self, now_ms: i64) {
        self.session.engine.reset();
        self.session.expired = false;
        self.session.evaluator.rearm();
        tracing::info!("Timer reset for {}", self.session.origin);
        self.events.push(Event::TimerReset {
            origin: self.session.origin.clone(),
            at: event_time(now_ms),
        });
        self.render();
    }

    /// Move the indicator back to the top-left corner.
    pub fn reset_position(&mut self, now_ms: i64) {
        self.indicator.move_to(Position::ORIGIN);
        self.events.push(Event::PositionReset {
            origin: self.session.origin.clone(),
            at: event_time(now_ms),
        });
    }

    /// Delete every stored record. The live session is untouched and will
    /// write its own record again at the next suspend.
    pub fn reset_all_origins(&mut self, now_ms: i64) -> Result<(), StoreError> {
        self.repo.reset_all()?;
        tracing::info!("All stored timers deleted");
        self.events.push(Event::AllTimersReset {
            at: event_time(now_ms),
        });
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn evaluate_rule(&mut self, now_ms: i64) -> Option<RuleFiring> {
        if self.session.expired {
            return None;
        }
        let firing = self
            .session
            .evaluator
            .check(self.session.engine.running_total_ms())?;
        self.session.expired = true;
        self.events.push(Event::RuleFired {
            origin: self.session.origin.clone(),
            threshold_ms: firing.threshold_ms,
            elapsed_ms: firing.total_ms,
            action: firing.status.clone(),
            at: event_time(now_ms),
        });
        Some(firing)
    }

    fn render(&mut self) {
        let color = self.palette.color(self.state(), self.session.expired).to_string();
        let text = self.session.engine.display().to_string();
        self.indicator.render(&text, &color);
    }
}
