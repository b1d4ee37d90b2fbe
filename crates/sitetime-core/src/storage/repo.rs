//! Origin record repository over a [`Store`].

use super::record::OriginRecord;
use super::Store;
use crate::error::StoreError;
use crate::origin::Origin;

/// Reads and writes [`OriginRecord`]s keyed by origin.
pub struct RecordRepo<S: Store> {
    store: S,
}

impl<S: Store> RecordRepo<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the record for `origin`.
    ///
    /// Never fails: an absent record, an unreadable store and a malformed
    /// value all resolve to (possibly partial) defaults.
    pub fn load(&self, origin: &Origin) -> OriginRecord {
        match self.store.get(origin.as_str()) {
            Ok(Some(raw)) => OriginRecord::from_json_lenient(&raw),
            Ok(None) => OriginRecord::default(),
            Err(e) => {
                tracing::warn!("Failed to read record for {origin}, using defaults: {e}");
                OriginRecord::default()
            }
        }
    }

    /// Replace the stored record for `origin`.
    pub fn save(&self, origin: &Origin, record: &OriginRecord) -> Result<(), StoreError> {
        let json = record.to_json().map_err(|e| StoreError::Encode {
            key: origin.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(origin.as_str(), &json)
    }

    /// Store the default record for `origin`.
    pub fn reset_origin(&self, origin: &Origin) -> Result<(), StoreError> {
        self.save(origin, &OriginRecord::default())
    }

    /// Delete every stored record.
    pub fn reset_all(&self) -> Result<(), StoreError> {
        for key in self.store.keys()? {
            self.store.delete(&key)?;
        }
        Ok(())
    }

    /// All stored records, ordered by origin. Keys that are not valid
    /// origins are skipped.
    pub fn list(&self) -> Result<Vec<(Origin, OriginRecord)>, StoreError> {
        let mut records = Vec::new();
        for key in self.store.keys()? {
            let Ok(origin) = Origin::parse(&key) else {
                tracing::warn!("Skipping stored key that is not an origin: {key}");
                continue;
            };
            records.push((origin.clone(), self.load(&origin)));
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Position};

    fn origin(s: &str) -> Origin {
        Origin::parse(s).unwrap()
    }

    #[test]
    fn absent_record_loads_as_default() {
        let repo = RecordRepo::new(MemoryStore::new());
        assert_eq!(repo.load(&origin("example.com")), OriginRecord::default());
    }

    #[test]
    fn save_then_load() {
        let repo = RecordRepo::new(MemoryStore::new());
        let mut record = OriginRecord {
            elapsed_ms: 7000,
            last_update_epoch_ms: 123,
            ..Default::default()
        };
        record.set_position(Position::new(40, 80));
        repo.save(&origin("example.com"), &record).unwrap();
        assert_eq!(repo.load(&origin("example.com")), record);
        assert_eq!(repo.load(&origin("other.com")), OriginRecord::default());
    }

    #[test]
    fn reset_all_removes_every_key() {
        let repo = RecordRepo::new(MemoryStore::new());
        let record = OriginRecord {
            elapsed_ms: 1000,
            ..Default::default()
        };
        repo.save(&origin("a.com"), &record).unwrap();
        repo.save(&origin("b.com"), &record).unwrap();
        repo.reset_all().unwrap();
        assert!(repo.store().is_empty());
        assert_eq!(repo.load(&origin("a.com")), OriginRecord::default());
    }

    #[test]
    fn reset_origin_writes_defaults() {
        let repo = RecordRepo::new(MemoryStore::new());
        let record = OriginRecord {
            elapsed_ms: 1000,
            position_x: 9,
            ..Default::default()
        };
        repo.save(&origin("a.com"), &record).unwrap();
        repo.reset_origin(&origin("a.com")).unwrap();
        assert_eq!(repo.load(&origin("a.com")), OriginRecord::default());
        assert_eq!(repo.store().len(), 1);
    }

    #[test]
    fn list_skips_foreign_keys() {
        let store = MemoryStore::new();
        store.set("not a host/", "{}").unwrap();
        let repo = RecordRepo::new(store);
        repo.save(&origin("b.com"), &OriginRecord::default()).unwrap();
        repo.save(&origin("a.com"), &OriginRecord::default()).unwrap();
        let origins: Vec<String> = repo
            .list()
            .unwrap()
            .into_iter()
            .map(|(o, _)| o.to_string())
            .collect();
        assert_eq!(origins, vec!["a.com", "b.com"]);
    }
}
