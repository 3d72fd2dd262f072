// The style context that coordinates caches, the document and the CSS backend
mod config;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cache::{CacheEntity, EffectRegistry};
use crate::css::{CssBackend, Linter, NestingBackend, Transformer};
use crate::dom::{LayerSupport, StyleHost};
use crate::extract::CachePathMap;

pub use self::config::{Mock, StyleConfig};

/// Everything a registration needs, passed explicitly to every call site.
///
/// Cloning is cheap and clones share the same cache, registry and regeneration counter.
#[derive(Clone, Debug)]
pub struct StyleContext {
    pub config: StyleConfig,
    cache: Arc<CacheEntity>,
    effects: Arc<EffectRegistry>,
    host: Option<Arc<dyn StyleHost>>,
    backend: Arc<dyn CssBackend>,
    layer_support: Arc<LayerSupport>,
    linters: Vec<Arc<dyn Linter>>,
    transformers: Vec<Arc<dyn Transformer>>,
    generation: Arc<AtomicU64>,
    hydration: Arc<CachePathMap>,
}

impl Default for StyleContext {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl StyleContext {
    /// A context with its own cache, no document, and the process-wide effect registry
    /// and layer check
    pub fn new(config: StyleConfig) -> Self {
        Self {
            config,
            cache: Arc::new(CacheEntity::new()),
            effects: EffectRegistry::global(),
            host: None,
            backend: Arc::new(NestingBackend),
            layer_support: LayerSupport::global(),
            linters: Vec::new(),
            transformers: Vec::new(),
            generation: Arc::new(AtomicU64::new(0)),
            hydration: Arc::new(CachePathMap::default()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<CacheEntity>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_effects(mut self, effects: Arc<EffectRegistry>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn StyleHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn CssBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_layer_support(mut self, layer_support: Arc<LayerSupport>) -> Self {
        self.layer_support = layer_support;
        self
    }

    /// Add a linter run after the built-in ones
    pub fn with_linter(mut self, linter: Arc<dyn Linter>) -> Self {
        self.linters.push(linter);
        self
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.transformers.push(transformer);
        self
    }

    /// Server-rendered stylesheets the client may reuse instead of recomputing
    pub fn with_hydration(mut self, map: CachePathMap) -> Self {
        self.hydration = Arc::new(map);
        self
    }

    pub fn cache(&self) -> &Arc<CacheEntity> {
        &self.cache
    }

    pub fn effects(&self) -> &Arc<EffectRegistry> {
        &self.effects
    }

    pub fn host(&self) -> Option<&dyn StyleHost> {
        self.host.as_deref()
    }

    pub fn backend(&self) -> &dyn CssBackend {
        self.backend.as_ref()
    }

    pub fn linters(&self) -> &[Arc<dyn Linter>] {
        &self.linters
    }

    pub fn transformers(&self) -> &[Arc<dyn Transformer>] {
        &self.transformers
    }

    pub fn hydration(&self) -> &CachePathMap {
        &self.hydration
    }

    /// Whether a live document is attached, unless overridden by `config.mock`
    pub fn is_client_side(&self) -> bool {
        match self.config.mock {
            Some(Mock::Client) => true,
            Some(Mock::Server) => false,
            None => self.host.is_some(),
        }
    }

    /// Whether `@layer` can be used, probing the document on first use
    pub fn layer_supported(&self) -> bool {
        self.layer_support.supported(self.host())
    }

    /// Bump the regeneration signal. Entries created before the bump are torn down and
    /// rebuilt on their next acquisition.
    pub fn regenerate(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "style regeneration requested");
        generation
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
