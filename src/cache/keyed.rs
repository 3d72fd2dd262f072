// Reference-counted cache keyed by a path of strings
use std::sync::{Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::hash::PATH_SEPARATOR;

/// Why an entry's value is being disposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The last reference went away
    Released,
    /// The regeneration signal changed and the entry is being rebuilt
    Refreshed,
}

/// What to do with an entry whose reference count reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eviction {
    Evict,
    /// Keep the value around for the next consumer
    KeepAlive,
}

#[derive(Debug)]
pub struct Acquired<V> {
    pub value: V,
    /// True when the factory ran for this acquisition
    pub created: bool,
    /// Identity of the slot. Kept across refreshes, new after an eviction.
    pub seq: u64,
}

#[derive(Debug)]
struct Slot<V> {
    path: Vec<String>,
    value: V,
    ref_count: usize,
    generation: u64,
    seq: u64,
}

#[derive(Debug)]
struct Slots<V> {
    map: FxHashMap<String, Slot<V>>,
    next_seq: u64,
}

/// All mutation goes through one mutex, so a factory runs at most once per creation even
/// when callers race. Factories run while the lock is held and must not re-enter the cache.
#[derive(Debug)]
pub struct KeyedCache<V> {
    slots: Mutex<Slots<V>>,
}

impl<V> Default for KeyedCache<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(Slots {
                map: FxHashMap::default(),
                next_seq: 0,
            }),
        }
    }
}

pub fn cache_key(path: &[String]) -> String {
    path.join(PATH_SEPARATOR)
}

impl<V: Clone> KeyedCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots<V>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a reference to the entry at `path`, creating it on a miss.
    ///
    /// An entry built under a different `generation` is rebuilt: the factory sees the stale
    /// value, the new value replaces it (keeping its reference count) and `dispose` receives
    /// the old value with [`Teardown::Refreshed`]. A failing factory leaves the cache untouched.
    pub fn acquire<E, F, D>(&self, path: &[String], generation: u64, create: F, dispose: D) -> Result<Acquired<V>, E>
    where
        F: FnOnce(Option<&V>) -> Result<V, E>,
        D: FnOnce(V, Teardown),
    {
        let key = cache_key(path);
        let mut slots = self.lock();

        if let Some(slot) = slots.map.get_mut(&key) {
            if slot.generation == generation {
                slot.ref_count += 1;
                return Ok(Acquired {
                    value: slot.value.clone(),
                    created: false,
                    seq: slot.seq,
                });
            }
        }

        let value = create(slots.map.get(&key).map(|slot| &slot.value))?;
        let stale = slots.map.remove(&key);
        let (ref_count, seq) = match &stale {
            Some(slot) => (slot.ref_count + 1, slot.seq),
            None => {
                let seq = slots.next_seq;
                slots.next_seq += 1;
                (1, seq)
            }
        };
        slots.map.insert(
            key,
            Slot {
                path: path.to_vec(),
                value: value.clone(),
                ref_count,
                generation,
                seq,
            },
        );
        drop(slots);

        if let Some(slot) = stale {
            tracing::debug!(path = %cache_key(path), "cache entry refreshed");
            dispose(slot.value, Teardown::Refreshed);
        }

        Ok(Acquired {
            value,
            created: true,
            seq,
        })
    }

    /// Drop a reference. Returns true when the entry was evicted, in which case `dispose`
    /// has run exactly once with the removed value.
    pub fn release<D>(&self, path: &[String], eviction: Eviction, dispose: D) -> bool
    where
        D: FnOnce(V, Teardown),
    {
        self.release_matching(path, None, eviction, dispose)
    }

    /// Like [`release`](Self::release), but only if the entry is still the slot `seq` from
    /// [`Acquired`]. A reference taken before a forced eviction must not count against the
    /// entry that replaced it.
    pub fn release_slot<D>(&self, path: &[String], seq: u64, eviction: Eviction, dispose: D) -> bool
    where
        D: FnOnce(V, Teardown),
    {
        self.release_matching(path, Some(seq), eviction, dispose)
    }

    fn release_matching<D>(&self, path: &[String], seq: Option<u64>, eviction: Eviction, dispose: D) -> bool
    where
        D: FnOnce(V, Teardown),
    {
        let key = cache_key(path);
        let mut slots = self.lock();

        let Some(slot) = slots.map.get_mut(&key) else {
            return false;
        };
        if seq.is_some_and(|seq| seq != slot.seq) {
            return false;
        }
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count > 0 || eviction == Eviction::KeepAlive {
            return false;
        }

        let removed = slots.map.remove(&key);
        drop(slots);

        match removed {
            Some(slot) => {
                tracing::debug!(path = %key, "cache entry evicted");
                dispose(slot.value, Teardown::Released);
                true
            }
            None => false,
        }
    }

    /// Remove the entry whatever its reference count. Returns true when an entry was removed,
    /// in which case `dispose` has run with [`Teardown::Released`].
    pub fn evict<D>(&self, path: &[String], dispose: D) -> bool
    where
        D: FnOnce(V, Teardown),
    {
        let key = cache_key(path);
        let removed = self.lock().map.remove(&key);
        match removed {
            Some(slot) => {
                tracing::debug!(path = %key, refs = slot.ref_count, "cache entry force-evicted");
                dispose(slot.value, Teardown::Released);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, path: &[String]) -> Option<V> {
        self.lock().map.get(&cache_key(path)).map(|slot| slot.value.clone())
    }

    pub fn ref_count(&self, path: &[String]) -> Option<usize> {
        self.lock().map.get(&cache_key(path)).map(|slot| slot.ref_count)
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of resident entries in creation order
    pub fn entries(&self) -> Vec<(Vec<String>, V)> {
        let slots = self.lock();
        let mut entries: Vec<_> = slots.map.values().collect();
        entries.sort_by_key(|slot| slot.seq);
        entries
            .into_iter()
            .map(|slot| (slot.path.clone(), slot.value.clone()))
            .collect()
    }
}
