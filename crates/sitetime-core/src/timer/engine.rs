//! Timer engine implementation.
//!
//! The engine counts active time for one origin. It does not use internal
//! threads - the host calls `tick()` once per [`TICK_MS`] while the engine is
//! started, and every call adds exactly one tick period.
//!
//! A tick that crosses midnight redraws the display after the reset, so the
//! indicator shows `00:00:00` right away.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.load(record.elapsed_ms, record.last_update_epoch_ms, now);
//! engine.start(now);
//! // Every second:
//! engine.tick(now);
//! ```

use serde::{Deserialize, Serialize};

use super::rollover::apply_rollover;

/// Length of one tick, and the amount each tick adds.
pub const TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Running,
    Paused,
    /// Budget spent. Time keeping continues; only presentation changes.
    Expired,
}

/// Handle to the periodic tick. Exists only while the engine is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    pub started_at_ms: i64,
    pub ticks: u64,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub total_ms: u64,
    pub rolled_over: bool,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    running_total_ms: u64,
    last_update_ms: i64,
    tick: Option<TickHandle>,
    display: String,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            running_total_ms: 0,
            last_update_ms: 0,
            tick: None,
            display: format_hms(0),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn running_total_ms(&self) -> u64 {
        self.running_total_ms
    }

    pub fn last_update_ms(&self) -> i64 {
        self.last_update_ms
    }

    /// Current `HH:MM:SS` text.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_ticking(&self) -> bool {
        self.tick.is_some()
    }

    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.tick
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the working copy with a loaded snapshot and roll it over if
    /// it belongs to an earlier day. Returns whether it rolled over.
    pub fn load(&mut self, total_ms: u64, last_update_ms: i64, now_ms: i64) -> bool {
        self.running_total_ms = total_ms;
        self.last_update_ms = last_update_ms;
        let rolled = self.apply_rollover(now_ms);
        self.refresh_display();
        rolled
    }

    /// Begin ticking. Returns `false` if a tick handle already exists.
    pub fn start(&mut self, now_ms: i64) -> bool {
        if self.tick.is_some() {
            return false;
        }
        self.tick = Some(TickHandle {
            started_at_ms: now_ms,
            ticks: 0,
        });
        true
    }

    /// Stop ticking, returning the handle if one was active.
    pub fn stop(&mut self) -> Option<TickHandle> {
        self.tick.take()
    }

    /// Zero the working total. The tick keeps its current state.
    pub fn reset(&mut self) {
        self.running_total_ms = 0;
        self.refresh_display();
    }

    /// Record that the working copy was persisted at `now_ms`.
    pub fn stamp(&mut self, now_ms: i64) {
        self.last_update_ms = now_ms;
    }

    pub fn apply_rollover(&mut self, now_ms: i64) -> bool {
        let rolled = apply_rollover(&mut self.running_total_ms, &mut self.last_update_ms, now_ms);
        if rolled {
            tracing::debug!("Day boundary crossed, timer reset");
        }
        rolled
    }

    /// Advance one tick period. Returns `None` when the engine is stopped.
    pub fn tick(&mut self, now_ms: i64) -> Option<TickOutcome> {
        let handle = self.tick.as_mut()?;
        handle.ticks += 1;

        self.running_total_ms = self.running_total_ms.saturating_add(TICK_MS);
        self.refresh_display();

        let rolled_over = self.apply_rollover(now_ms);
        if rolled_over {
            self.refresh_display();
        }

        Some(TickOutcome {
            total_ms: self.running_total_ms,
            rolled_over,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn refresh_display(&mut self) {
        self.display = format_hms(self.running_total_ms);
    }
}

/// Format a duration as zero-padded `HH:MM:SS`, wrapping every 24 hours.
pub fn format_hms(ms: u64) -> String {
    let secs = ms / 1000;
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
