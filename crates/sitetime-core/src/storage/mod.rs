mod config;
pub mod database;
pub mod memory;
pub mod record;
pub mod repo;

pub use config::{ActionConfig, Config, IndicatorConfig, RuleConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use record::{OriginRecord, Position};
pub use repo::RecordRepo;

use std::path::PathBuf;
use std::rc::Rc;

use crate::error::StoreError;

/// Key-value persistence substrate.
///
/// One key per origin; values are opaque strings (JSON records). A `set`
/// replaces the whole value for its key in one step.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<S: Store + ?Sized> Store for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }
}

/// Returns `~/.config/sitetime[-dev]/` based on SITETIME_ENV.
///
/// Set SITETIME_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SITETIME_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("sitetime-dev")
    } else {
        base_dir.join("sitetime")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
