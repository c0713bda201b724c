use std::{any::Any, collections::HashMap, fmt, sync::Arc};

/// Well-known key holding related-entity eager-loading hints.
pub const INCLUDE_KEY: &str = "include";

/// Shared metadata payload.
pub type MetadataValue = Arc<dyn Any + Send + Sync>;

///
/// MetadataBag
///
/// Opaque key/value annotations that travel with a spec. Engines never read
/// it. Writes are copy-on-write: a spec generation never observes entries
/// added by a later one. Last write wins.
///

#[derive(Clone, Default)]
pub struct MetadataBag {
    entries: Arc<HashMap<String, MetadataValue>>,
}

impl MetadataBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a bag with `key` set to `value`, leaving `self` untouched.
    #[must_use]
    pub fn with<V: Any + Send + Sync>(&self, key: impl Into<String>, value: V) -> Self {
        self.with_shared(key, Arc::new(value))
    }

    #[must_use]
    pub fn with_shared(&self, key: impl Into<String>, value: MetadataValue) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(key.into(), value);

        Self {
            entries: Arc::new(entries),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Typed read; `None` if absent or stored under a different type.
    #[must_use]
    pub fn get_as<V: Any>(&self, key: &str) -> Option<&V> {
        self.entries.get(key)?.downcast_ref::<V>()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an include hint (a related-entity path) to the `include` entry.
    #[must_use]
    pub fn with_include(&self, path: impl Into<String>) -> Self {
        let mut includes = self.includes();
        let path = path.into();
        if !includes.contains(&path) {
            includes.push(path);
        }

        self.with(INCLUDE_KEY, includes)
    }

    /// Include hints in insertion order.
    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        self.get_as::<Vec<String>>(INCLUDE_KEY)
            .cloned()
            .unwrap_or_default()
    }
}

impl fmt::Debug for MetadataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.keys();
        keys.sort_unstable();

        f.debug_struct("MetadataBag").field("keys", &keys).finish()
    }
}
