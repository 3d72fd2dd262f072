// Registration of scoped stylesheets: compile once, insert once, remove on teardown
use std::sync::Arc;

use crate::cache::{cache_key, CacheValue, Eviction, Teardown, STYLE_PREFIX};
use crate::css::{normalize_style, parse_style, EffectStyles, Interpolation, ParseConfig};
use crate::dom::{InsertOptions, Placement, StyleHost, ATTR_CACHE_PATH, ATTR_MARK, ATTR_TOKEN};
use crate::engine::StyleContext;
use crate::error::{BackendError, CssInJsError, HostError};
use crate::extract::style_tag;
use crate::hash::unique_hash;
use crate::token::TokenRegistration;

/// Prefix of the element id an effect style is inserted under
pub const EFFECT_PREFIX: &str = "_effect-";

/// Identifies one scope and how its stylesheet is inserted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisterInfo {
    pub token_key: String,
    /// Scope class; unscoped when unset
    pub hash_id: Option<String>,
    /// Logical path of the scope, such as a component name
    pub path: Vec<String>,
    pub layer: Option<String>,
    pub nonce: Option<String>,
    /// Queue priority of the inserted element
    pub order: i32,
}

impl RegisterInfo {
    pub fn new(token_key: impl Into<String>, path: &[&str]) -> Self {
        Self {
            token_key: token_key.into(),
            path: path.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Scope to a registered token
    pub fn for_token(token: &TokenRegistration, path: &[&str]) -> Self {
        Self {
            hash_id: Some(token.hash_id().to_string()),
            ..Self::new(token.token_key(), path)
        }
    }

    pub fn with_hash_id(mut self, hash_id: impl Into<String>) -> Self {
        self.hash_id = Some(hash_id.into());
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// What the cache keeps for one scope
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEntry {
    pub css: String,
    pub token_key: String,
    pub style_id: String,
    /// Normalized keyframes referenced by `css`
    pub effects: EffectStyles,
    /// Scope path as used in the hydration map
    pub cache_path: String,
}

/// Inline `<style>` element rendered when there is no document to insert into
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMarkup {
    pub token_key: String,
    pub style_id: String,
    pub css: String,
}

impl StyleMarkup {
    pub fn to_html(&self) -> String {
        style_tag(&[(ATTR_TOKEN, self.token_key.as_str()), (ATTR_MARK, self.style_id.as_str())], &self.css)
    }
}

/// A live reference to a registered stylesheet. Dropping it releases the reference.
#[derive(Debug)]
pub struct StyleRegistration {
    ctx: StyleContext,
    path: Vec<String>,
    seq: u64,
    entry: Arc<StyleEntry>,
    created: bool,
}

impl StyleRegistration {
    pub fn entry(&self) -> &Arc<StyleEntry> {
        &self.entry
    }

    pub fn style_id(&self) -> &str {
        &self.entry.style_id
    }

    pub fn css(&self) -> &str {
        &self.entry.css
    }

    /// True when this registration compiled the stylesheet rather than reusing it
    pub fn created(&self) -> bool {
        self.created
    }

    /// Markup to render next to the caller's output, only without a document and with
    /// the default cache enabled. Effect styles are appended to the stylesheet text.
    pub fn markup(&self) -> Option<StyleMarkup> {
        if self.ctx.is_client_side() || !self.ctx.config.default_cache {
            return None;
        }
        let mut css = self.entry.css.clone();
        for (_, effect) in self.entry.effects.iter() {
            css.push_str(effect);
        }
        Some(StyleMarkup {
            token_key: self.entry.token_key.clone(),
            style_id: self.entry.style_id.clone(),
            css,
        })
    }
}

impl Drop for StyleRegistration {
    fn drop(&mut self) {
        let eviction = if self.ctx.config.auto_clear {
            Eviction::Evict
        } else {
            Eviction::KeepAlive
        };
        let ctx = &self.ctx;
        ctx.cache()
            .store()
            .release_slot(&self.path, self.seq, eviction, |value, teardown| {
                dispose(ctx, value, teardown)
            });
    }
}

fn dispose(ctx: &StyleContext, value: CacheValue, teardown: Teardown) {
    let CacheValue::Style(entry) = value else {
        return;
    };
    if !ctx.is_client_side() {
        return;
    }
    if let Some(host) = ctx.host() {
        tracing::debug!(style_id = %entry.style_id, ?teardown, "removing stylesheet");
        host.remove_style(&entry.style_id, ATTR_MARK);
    }
}

/// Register the stylesheet produced by `style_fn` for the scope described by `info`.
///
/// `style_fn` runs at most once per cache miss. The first registration of a scope in a
/// client-side context inserts the stylesheet and any effect styles not injected yet.
pub fn register_style<F>(ctx: &StyleContext, info: &RegisterInfo, style_fn: F) -> Result<StyleRegistration, CssInJsError>
where
    F: FnOnce() -> Interpolation,
{
    let scope_path: Vec<String> = std::iter::once(info.token_key.clone())
        .chain(info.path.iter().cloned())
        .collect();
    let mut path = Vec::with_capacity(scope_path.len() + 1);
    path.push(STYLE_PREFIX.to_string());
    path.extend(scope_path.iter().cloned());

    let acquired = ctx.cache().store().acquire(
        &path,
        ctx.generation(),
        |stale| -> Result<CacheValue, CssInJsError> {
            // A refresh recomputes even if the server copy is still in the document
            let hydrated = match stale {
                Some(_) => None,
                None => hydrated_entry(ctx, info, &scope_path),
            };
            let entry = match hydrated {
                Some(entry) => entry,
                None => compile_entry(ctx, info, &scope_path, style_fn)?,
            };
            tracing::debug!(style_id = %entry.style_id, path = %entry.cache_path, "stylesheet compiled");
            Ok(CacheValue::Style(Arc::new(entry)))
        },
        |value, teardown| dispose(ctx, value, teardown),
    )?;

    let entry = match acquired.value {
        CacheValue::Style(entry) => entry,
        CacheValue::Token(_) => {
            ctx.cache()
                .store()
                .release_slot(&path, acquired.seq, Eviction::KeepAlive, |_, _| {});
            return Err(CssInJsError::CacheMismatch(cache_key(&path)));
        }
    };

    if acquired.created && ctx.is_client_side() {
        if let Some(host) = ctx.host() {
            if let Err(err) = insert_stylesheets(ctx, host, info, &entry) {
                // Other holders may exist after a refresh; drop the entry so the next
                // acquisition inserts again
                ctx.cache()
                    .store()
                    .evict(&path, |value, teardown| dispose(ctx, value, teardown));
                return Err(err.into());
            }
        }
    }

    Ok(StyleRegistration {
        ctx: ctx.clone(),
        path,
        seq: acquired.seq,
        entry,
        created: acquired.created,
    })
}

/// Reuse a stylesheet the server already put in the document
fn hydrated_entry(ctx: &StyleContext, info: &RegisterInfo, scope_path: &[String]) -> Option<StyleEntry> {
    if !ctx.is_client_side() {
        return None;
    }
    let cache_path = cache_key(scope_path);
    let style_id = ctx.hydration().get(&cache_path)?;
    let css = ctx.host()?.style_text(style_id, ATTR_MARK)?;
    tracing::debug!(style_id, "reusing server-rendered stylesheet");
    Some(StyleEntry {
        css,
        token_key: info.token_key.clone(),
        style_id: style_id.to_string(),
        effects: EffectStyles::default(),
        cache_path,
    })
}

fn compile_entry<F>(ctx: &StyleContext, info: &RegisterInfo, scope_path: &[String], style_fn: F) -> Result<StyleEntry, BackendError>
where
    F: FnOnce() -> Interpolation,
{
    let config = ParseConfig {
        hash_id: info.hash_id.clone(),
        hash_priority: ctx.config.hash_priority,
        layer: info.layer.clone(),
        layer_supported: info.layer.is_some() && ctx.layer_supported(),
        path: Some(info.path.join("-")),
        transformers: ctx.transformers().to_vec(),
        linters: ctx.linters().to_vec(),
        dev_warnings: ctx.config.dev_warnings,
    };

    let output = parse_style(&style_fn(), &config);
    for warning in &output.warnings {
        tracing::warn!("{}", warning);
    }

    let css = normalize_style(ctx.backend(), &output.css)?;
    let effects = output
        .effects
        .iter()
        .map(|(name, effect)| Ok((name.to_string(), normalize_style(ctx.backend(), effect)?)))
        .collect::<Result<EffectStyles, BackendError>>()?;

    Ok(StyleEntry {
        style_id: unique_hash(scope_path, &css),
        css,
        token_key: info.token_key.clone(),
        effects,
        cache_path: cache_key(scope_path),
    })
}

fn insert_stylesheets(ctx: &StyleContext, host: &dyn StyleHost, info: &RegisterInfo, entry: &StyleEntry) -> Result<(), HostError> {
    let queued = InsertOptions {
        placement: Placement::Queue,
        attach_to: ctx.config.container.clone(),
        priority: info.order,
        nonce: info.nonce.clone(),
        ..InsertOptions::new(ATTR_MARK)
    };

    let mut options = queued.clone();
    options.attributes.push((ATTR_TOKEN.to_string(), entry.token_key.clone()));
    if ctx.config.dev_warnings {
        options.attributes.push((ATTR_CACHE_PATH.to_string(), entry.cache_path.clone()));
    }
    host.insert_or_update_style(&entry.css, &entry.style_id, &options)?;
    tracing::debug!(style_id = %entry.style_id, "stylesheet inserted");

    for (name, effect) in entry.effects.iter() {
        if ctx.effects().contains(name) {
            continue;
        }
        host.insert_or_update_style(effect, &format!("{}{}", EFFECT_PREFIX, name), &queued)?;
        ctx.effects().mark_injected(name);
    }
    Ok(())
}
