//! Persisted State
//!
//! The whole group list lives under one key as a JSON array. It is read once at
//! startup and rewritten after every change.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use thiserror::Error;

use crate::groups::{AppState, Group};

pub const STATE_KEY: &str = "lumina_groups";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored value is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Minimal get/set string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        info!("Opened state store at {}", path.as_ref().display());
        Ok(Self { db })
    }

    /// Store backed by a throwaway database that is removed on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.db.get(key.as_bytes())? {
            Some(ivec) => Ok(Some(String::from_utf8(ivec.to_vec())?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the saved groups. Missing, unreadable or malformed data all give the
/// default state.
pub fn load_state(store: &dyn KeyValueStore) -> AppState {
    let raw = match store.get(STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("No saved groups, starting with the default group");
            return AppState::new();
        }
        Err(e) => {
            warn!("Failed to read saved groups: {}", e);
            return AppState::new();
        }
    };

    match serde_json::from_str::<Vec<Group>>(&raw) {
        Ok(groups) => {
            debug!("Loaded {} group(s)", groups.len());
            AppState::from_groups(groups)
        }
        Err(e) => {
            warn!("Saved groups are corrupt, using defaults: {}", e);
            AppState::new()
        }
    }
}

/// Write the full group list. Selection and edit mode are not saved.
pub fn save_state(store: &dyn KeyValueStore, state: &AppState) -> Result<(), StoreError> {
    let json = serde_json::to_string(state.groups())?;
    store.set(STATE_KEY, &json)?;
    debug!("Saved {} group(s)", state.groups().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Status;

    #[test]
    fn absent_key_gives_default_state() {
        let store = MemoryStore::default();
        assert_eq!(load_state(&store), AppState::new());
    }

    #[test]
    fn corrupt_value_gives_default_state() {
        let store = MemoryStore::default();

        store.set(STATE_KEY, "{not json").unwrap();
        assert_eq!(load_state(&store), AppState::new());

        store.set(STATE_KEY, r#"[{"id":3,"name":"x","schedule":["on"]}]"#).unwrap();
        assert_eq!(load_state(&store), AppState::new());

        store.set(STATE_KEY, r#"{"id":3}"#).unwrap();
        assert_eq!(load_state(&store), AppState::new());
    }

    #[test]
    fn empty_array_gives_default_state() {
        let store = MemoryStore::default();
        store.set(STATE_KEY, "[]").unwrap();
        assert_eq!(load_state(&store), AppState::new());
    }

    #[test]
    fn reads_format_written_by_the_web_page() {
        let mut slots = vec!["\"on\""; 24];
        slots[0] = "\"off\"";
        slots[5] = "\"maybe\"";
        let raw = format!(
            r#"[{{"id":1,"name":"Мій графік","schedule":[{}]}}]"#,
            slots.join(",")
        );

        let store = MemoryStore::default();
        store.set(STATE_KEY, &raw).unwrap();
        let state = load_state(&store);

        let group = state.active_group();
        assert_eq!(group.name, "Мій графік");
        assert_eq!(group.schedule.status_at(0), Status::Unavailable);
        assert_eq!(group.schedule.status_at(5), Status::Uncertain);
    }

    #[test]
    fn sled_store_round_trips_state() {
        let store = SledStore::temporary().unwrap();

        let mut state = AppState::new();
        state.toggle_mode();
        state.apply_text("06-09").unwrap();
        state.add_group(Some("Office"), 2_000).unwrap();
        save_state(&store, &state).unwrap();

        let loaded = load_state(&store);
        assert_eq!(loaded.groups(), state.groups());
        // edit mode is transient
        assert!(!loaded.is_editing());
    }
}
