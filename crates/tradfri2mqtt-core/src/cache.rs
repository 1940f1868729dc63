//! Last-published attribute cache.
//!
//! The cache records, per device, the last value handed to the publish
//! sink for each attribute key. It only gates republication: entries
//! are never evicted, and a removed device keeps its entry so that a
//! reappearing device does not republish unchanged values.

use std::collections::HashMap;

/// Last-published values for one device, keyed by attribute key.
pub type CacheEntry = HashMap<String, String>;

/// Mapping from device instance id to its [`CacheEntry`].
///
/// Mutated only from the single sequential event path; no internal
/// synchronization. A host that fans out across devices must shard per
/// device id or lock externally.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: HashMap<u32, CacheEntry>,
}

impl AttributeCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cache entry for a device.
    #[must_use]
    pub fn get(&self, device_id: u32) -> Option<&CacheEntry> {
        self.entries.get(&device_id)
    }

    /// Record a value and report whether it differs from the stored one.
    ///
    /// The entry is created lazily and the value is stored
    /// unconditionally. Returns `true` iff no value was stored for the
    /// key before, or the stored value differs by exact string
    /// equality. First observation of any key is always a change.
    pub fn observe(&mut self, device_id: u32, key: &str, value: &str) -> bool {
        let entry = self.entries.entry(device_id).or_default();
        match entry.insert(key.to_string(), value.to_string()) {
            Some(previous) => previous != value,
            None => true,
        }
    }
}
