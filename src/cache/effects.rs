// Process-wide registry of injected effect styles
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use rustc_hash::FxHashSet;

/// Names of effect styles (keyframes) already present in the document.
///
/// Only ever grows: effects are never removed when the entry that introduced them is evicted.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    injected: Mutex<FxHashSet<String>>,
}

pub(crate) static GLOBAL_EFFECTS: LazyLock<Arc<EffectRegistry>> =
    LazyLock::new(|| Arc::new(EffectRegistry::default()));

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every context that does not bring its own
    pub fn global() -> Arc<EffectRegistry> {
        Arc::clone(&GLOBAL_EFFECTS)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.injected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Record `name` as injected. Returns false if it already was.
    pub fn mark_injected(&self, name: &str) -> bool {
        self.injected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.injected.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything. Intended for tests only.
    pub fn reset(&self) {
        self.injected.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
