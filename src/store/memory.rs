//! In-process option store.

use std::collections::BTreeMap;

use super::{OptionStore, StoreError};

/// Option store backed by a map. Counts writes so callers can tell
/// whether a value was rewritten.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            writes: 0,
        }
    }

    /// Number of successful `update_option`/`delete_option` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl OptionStore for MemoryStore {
    fn get_option(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn update_option(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn delete_option(&mut self, key: &str) -> Result<bool, StoreError> {
        let existed = self.values.remove(key).is_some();
        if existed {
            self.writes += 1;
        }
        Ok(existed)
    }
}
