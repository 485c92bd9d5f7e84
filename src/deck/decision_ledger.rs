use crate::app::ports::KeyValueStore;
use crate::common::constants::{MATCHES_KEY, STATS_KEY};
use crate::common::error::{Result, SwipeError};
use crate::domain::{Character, CharacterId};
use crate::observability::metrics::SessionMetrics;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifetime decision tallies. They never decrease when a match is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub passes: u64,
}

impl Stats {
    pub fn total(&self) -> u64 {
        self.likes + self.passes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Inserted,
    AlreadyPresent,
}

/// Accepted characters (set semantics on id, insertion ordered) and like/pass
/// counters. Every mutation is written through to the store immediately.
pub struct DecisionLedger {
    store: Arc<dyn KeyValueStore>,
    accepted: Vec<Character>,
    stats: Stats,
}

impl DecisionLedger {
    /// Seeds the ledger from the store. Missing or malformed slots start empty.
    /// A store that cannot be read is an error: starting empty would let the
    /// next write replace data that is still there.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let accepted: Vec<Character> = read_slot_or_default(store.as_ref(), MATCHES_KEY)?;
        let stats: Stats = read_slot_or_default(store.as_ref(), STATS_KEY)?;

        let mut seen = HashSet::new();
        let before = accepted.len();
        let accepted: Vec<Character> = accepted.into_iter().filter(|c| seen.insert(c.id)).collect();
        if accepted.len() != before {
            warn!(
                dropped = before - accepted.len(),
                "Dropped duplicate ids from stored matches"
            );
        }

        debug!(
            matches = accepted.len(),
            likes = stats.likes,
            passes = stats.passes,
            backend = store.backend_name(),
            "Loaded decision ledger"
        );
        Ok(Self { store, accepted, stats })
    }

    /// Counts a like and stores the character unless its id is already accepted.
    /// The like is counted either way.
    pub fn accept(&mut self, item: Character) -> Result<AcceptOutcome> {
        let outcome = if self.contains(item.id) {
            AcceptOutcome::AlreadyPresent
        } else {
            self.accepted.push(item);
            AcceptOutcome::Inserted
        };
        self.stats.likes += 1;

        let matches_written = match outcome {
            AcceptOutcome::Inserted => self.flush_matches(),
            AcceptOutcome::AlreadyPresent => Ok(()),
        };
        let stats_written = self.flush_stats();
        matches_written.and(stats_written)?;
        Ok(outcome)
    }

    pub fn reject(&mut self) -> Result<()> {
        self.stats.passes += 1;
        self.flush_stats()
    }

    /// Removes an accepted character. Counters are untouched; unknown ids are a no-op.
    pub fn remove(&mut self, id: CharacterId) -> Result<bool> {
        let Some(index) = self.accepted.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        self.accepted.remove(index);
        self.flush_matches()?;
        Ok(true)
    }

    pub fn all(&self) -> &[Character] {
        &self.accepted
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.accepted.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    fn flush_matches(&self) -> Result<()> {
        write_slot(self.store.as_ref(), MATCHES_KEY, &self.accepted)
    }

    fn flush_stats(&self) -> Result<()> {
        write_slot(self.store.as_ref(), STATS_KEY, &self.stats)
    }
}

fn read_slot<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| SwipeError::MalformedStoredData {
            key: key.to_string(),
            message: e.to_string(),
        })
}

fn read_slot_or_default<T: DeserializeOwned + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<T> {
    match read_slot(store, key) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(e @ SwipeError::MalformedStoredData { .. }) => {
            warn!(slot = key, error = %e, "Discarding stored slot, starting from empty");
            Ok(T::default())
        }
        Err(e) => {
            warn!(slot = key, error = %e, "Could not read stored slot");
            Err(e)
        }
    }
}

fn write_slot<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let result = serde_json::to_string(value)
        .map_err(|e| SwipeError::persistence(key, e))
        .and_then(|json| store.set(key, &json));
    if let Err(e) = &result {
        warn!(slot = key, error = %e, "Failed to persist slot");
        SessionMetrics::record_persistence_error(key);
    }
    result
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Store whose writes always fail; reads return whatever it was seeded with.
    /// Keys listed in `unreadable` fail on read as well.
    pub struct ReadOnlyStore {
        pub seeded: std::collections::HashMap<String, String>,
        pub unreadable: Vec<&'static str>,
    }

    impl ReadOnlyStore {
        pub fn empty() -> Self {
            Self {
                seeded: Default::default(),
                unreadable: Vec::new(),
            }
        }

        pub fn with_slot(mut self, key: &str, value: &str) -> Self {
            self.seeded.insert(key.to_string(), value.to_string());
            self
        }
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.unreadable.iter().any(|k| *k == key) {
                return Err(SwipeError::persistence(key, "database is locked"));
            }
            Ok(self.seeded.get(key).cloned())
        }

        fn set(&self, key: &str, _value: &str) -> Result<()> {
            Err(SwipeError::persistence(key, "quota exceeded"))
        }

        fn backend_name(&self) -> &'static str {
            "read-only"
        }
    }
}
