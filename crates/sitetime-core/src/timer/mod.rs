mod engine;
pub mod rollover;

pub use engine::{format_hms, TickHandle, TickOutcome, TimerEngine, TimerState, TICK_MS};
pub use rollover::{apply_rollover, local_midnight_ms};
