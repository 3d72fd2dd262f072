// Global keyed cache shared by token and style registration
mod effects;
mod keyed;

use std::sync::Arc;

pub use self::effects::EffectRegistry;
pub use self::keyed::{cache_key, Acquired, Eviction, KeyedCache, Teardown};

use crate::register::StyleEntry;
use crate::token::CachedToken;

/// Namespace of stylesheet entries
pub const STYLE_PREFIX: &str = "style";
/// Namespace of token entries
pub const TOKEN_PREFIX: &str = "token";

#[derive(Debug, Clone)]
pub enum CacheValue {
    Style(Arc<StyleEntry>),
    Token(Arc<CachedToken>),
}

/// The cache a style context reads and writes. Keys start with a namespace prefix.
#[derive(Debug, Default)]
pub struct CacheEntity {
    store: KeyedCache<CacheValue>,
}

impl CacheEntity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &KeyedCache<CacheValue> {
        &self.store
    }

    /// Resident stylesheet entries in creation order, with their path minus the prefix
    pub fn style_entries(&self) -> Vec<(Vec<String>, Arc<StyleEntry>)> {
        self.store
            .entries()
            .into_iter()
            .filter(|(path, _)| path.first().map(String::as_str) == Some(STYLE_PREFIX))
            .filter_map(|(mut path, value)| match value {
                CacheValue::Style(entry) => {
                    path.remove(0);
                    Some((path, entry))
                }
                CacheValue::Token(_) => None,
            })
            .collect()
    }
}
