//! # sitetime Core Library
//!
//! This library provides the core logic for sitetime, which tracks how long
//! a user spends on each website per day and applies per-site time budgets.
//! The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: counts active time for one origin; the host calls
//!   `tick()` once per second while the page is visible
//! - **Lifecycle Controller**: resumes from and suspends to storage on
//!   visibility changes, and owns the Running/Paused/Expired state
//! - **Rules**: per-origin thresholds whose action fires once per page load
//! - **Storage**: key-value stores (SQLite, in-memory) holding one record per
//!   origin, and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Tick counter with midnight rollover
//! - [`LifecycleController`]: Session state machine
//! - [`RuleBook`]: Static origin -> rule table
//! - [`Database`]: SQLite-backed [`Store`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod indicator;
pub mod lifecycle;
pub mod origin;
pub mod rules;
pub mod storage;
pub mod timer;

pub use error::{ActionError, ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use indicator::{HeadlessIndicator, Indicator, IndicatorPalette};
pub use lifecycle::{Command, LifecycleController, PageEvent, TickReport};
pub use origin::Origin;
pub use rules::{Rule, RuleAction, RuleBook, RuleEvaluator};
pub use storage::{Config, Database, MemoryStore, OriginRecord, Position, RecordRepo, Store};
pub use timer::{format_hms, TimerEngine, TimerState, TICK_MS};
