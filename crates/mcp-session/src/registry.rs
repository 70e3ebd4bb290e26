//! Keyed, concurrently readable capability storage shared by all four registries.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// An entry that knows its own registry key (URI, pattern, or name).
pub trait Keyed: Send + Sync {
    fn key(&self) -> &str;
}

struct Slots<E> {
    entries: Vec<Arc<E>>,
    index: HashMap<String, usize>,
}

/// Insertion-ordered map guarded by a fair readers-writer lock.
///
/// Entries are fully built before they are published, so a snapshot never
/// contains a half-constructed entry. The tokio lock queues writers fairly,
/// so a steady stream of `list` calls cannot starve `register`.
pub struct Registry<E> {
    slots: RwLock<Slots<E>>,
}

impl<E: Keyed> Registry<E> {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Slots {
                entries: Vec::new(),
                index: HashMap::new(),
            }),
        }
    }

    /// Insert an entry, replacing any existing entry under the same key in place.
    ///
    /// Returns `true` when an earlier registration was replaced.
    pub async fn register(&self, entry: E) -> bool {
        let entry = Arc::new(entry);
        let key = entry.key().to_string();
        let mut slots = self.slots.write().await;

        if let Some(&pos) = slots.index.get(&key) {
            tracing::warn!("Replacing existing registration for {key:?}");
            slots.entries[pos] = entry;
            true
        } else {
            let pos = slots.entries.len();
            slots.entries.push(entry);
            slots.index.insert(key, pos);
            false
        }
    }

    /// Point-in-time copy of every entry, in registration order.
    pub async fn list(&self) -> Vec<Arc<E>> {
        self.slots.read().await.entries.clone()
    }

    pub async fn lookup(&self, key: &str) -> Option<Arc<E>> {
        let slots = self.slots.read().await;
        slots.index.get(key).map(|&pos| slots.entries[pos].clone())
    }

    /// First entry for which `f` yields a value, scanning in registration order.
    pub async fn find_map<T>(&self, mut f: impl FnMut(&Arc<E>) -> Option<T>) -> Option<T> {
        let slots = self.slots.read().await;
        slots.entries.iter().find_map(|e| f(e))
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<E: Keyed> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}
