pub mod config;
pub mod rules;
pub mod terminal;
pub mod timer;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
