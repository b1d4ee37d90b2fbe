//! Origin settings record: the unit of persistence.
//!
//! Encoded as a JSON object:
//!
//! ```text
//! { "elapsedMs": 5000, "positionX": 12, "positionY": 40, "lastUpdateEpochMs": 1760400000000 }
//! ```
//!
//! Older records written with `timer`/`elX`/`elY`/`lastUpdate` are still read.
//! Decoding never rejects a record outright: each field is read on its own
//! and falls back to its default when it is missing or has the wrong shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// On-screen offset of the indicator, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginRecord {
    /// Accumulated active time today, in milliseconds.
    #[serde(alias = "timer")]
    pub elapsed_ms: u64,
    #[serde(alias = "elX")]
    pub position_x: i32,
    #[serde(alias = "elY")]
    pub position_y: i32,
    /// When elapsed time was last persisted or reset (epoch milliseconds).
    #[serde(alias = "lastUpdate")]
    pub last_update_epoch_ms: i64,
}

impl OriginRecord {
    pub fn position(&self) -> Position {
        Position::new(self.position_x, self.position_y)
    }

    pub fn set_position(&mut self, position: Position) {
        self.position_x = position.x;
        self.position_y = position.y;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored value, defaulting unreadable fields individually.
    pub fn from_json_lenient(raw: &str) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Stored record is not JSON, using defaults: {e}");
                return Self::default();
            }
        };
        let Some(obj) = value.as_object() else {
            tracing::warn!("Stored record is not an object, using defaults");
            return Self::default();
        };

        Self {
            elapsed_ms: field(obj, &["elapsedMs", "timer"], as_u64),
            position_x: field(obj, &["positionX", "elX"], as_i32),
            position_y: field(obj, &["positionY", "elY"], as_i32),
            last_update_epoch_ms: field(obj, &["lastUpdateEpochMs", "lastUpdate"], as_i64),
        }
    }
}

fn field<T: Default>(obj: &Map<String, Value>, names: &[&str], read: fn(&Value) -> Option<T>) -> T {
    let Some((name, value)) = names
        .iter()
        .find_map(|name| obj.get(*name).map(|v| (*name, v)))
    else {
        return T::default();
    };
    match read(value) {
        Some(v) => v,
        None => {
            tracing::warn!("Ignoring malformed record field '{name}': {value}");
            T::default()
        }
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    })
}

fn as_u64(value: &Value) -> Option<u64> {
    as_i64(value).and_then(|v| u64::try_from(v).ok())
}

fn as_i32(value: &Value) -> Option<i32> {
    as_i64(value).and_then(|v| i32::try_from(v).ok())
}
