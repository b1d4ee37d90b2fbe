use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::origin::Origin;
use crate::rules::ActionStatus;
use crate::storage::Position;
use crate::timer::TimerState;

/// Every state change in a session produces an Event.
/// Hosts drain them from the controller; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerResumed {
        origin: Origin,
        elapsed_ms: u64,
        /// The loaded record belonged to an earlier day.
        rolled_over: bool,
        at: DateTime<Utc>,
    },
    TimerSuspended {
        origin: Origin,
        elapsed_ms: u64,
        position: Position,
        at: DateTime<Utc>,
    },
    /// A running session crossed local midnight.
    DayRolledOver {
        origin: Origin,
        at: DateTime<Utc>,
    },
    RuleFired {
        origin: Origin,
        threshold_ms: u64,
        elapsed_ms: u64,
        action: ActionStatus,
        at: DateTime<Utc>,
    },
    TimerReset {
        origin: Origin,
        at: DateTime<Utc>,
    },
    PositionReset {
        origin: Origin,
        at: DateTime<Utc>,
    },
    AllTimersReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        origin: Origin,
        state: TimerState,
        elapsed_ms: u64,
        display: String,
        color: String,
        position: Position,
        threshold_ms: Option<u64>,
        at: DateTime<Utc>,
    },
}

/// Convert an epoch-millisecond timestamp to an event time.
pub fn event_time(epoch_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_ms).unwrap_or_default()
}
