// Token identity: content hashing of design tokens into a tokenKey and scope hash id
use std::convert::Infallible;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::{cache_key, CacheValue, Eviction, TOKEN_PREFIX};
use crate::engine::StyleContext;
use crate::error::CssInJsError;
use crate::hash::hash;

/// A derived token object with its identity
#[derive(Debug, Clone, PartialEq)]
pub struct CachedToken {
    pub token: Value,
    /// Stable content hash of `token` and the salt
    pub token_key: String,
    /// Scope class injected into selectors
    pub hash_id: String,
}

/// Flatten a token into text that only depends on its content, whatever the key order
pub fn flatten_token(token: &Value) -> String {
    let mut out = String::new();
    write_flat(token, &mut out);
    out
}

fn write_flat(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                out.push_str(key);
                match &map[key.as_str()] {
                    nested @ (Value::Object(_) | Value::Array(_)) => write_flat(nested, out),
                    other => out.push_str(&other.to_string()),
                }
            }
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_flat(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

pub fn token_key(token: &Value, salt: &str) -> String {
    hash(&format!("{}_{}", salt, flatten_token(token)))
}

/// A live reference to a cached token. Dropping it releases the reference.
#[derive(Debug)]
pub struct TokenRegistration {
    ctx: StyleContext,
    path: Vec<String>,
    seq: u64,
    token: Arc<CachedToken>,
}

impl TokenRegistration {
    pub fn token(&self) -> &Arc<CachedToken> {
        &self.token
    }

    pub fn token_key(&self) -> &str {
        &self.token.token_key
    }

    pub fn hash_id(&self) -> &str {
        &self.token.hash_id
    }
}

impl Drop for TokenRegistration {
    fn drop(&mut self) {
        self.ctx.cache().store().release_slot(&self.path, self.seq, Eviction::Evict, |_, _| {});
    }
}

/// Register `token` under `salt`. Tokens with equal content share one cache entry.
pub fn register_token(ctx: &StyleContext, token: &Value, salt: &str) -> Result<TokenRegistration, CssInJsError> {
    let flat = flatten_token(token);
    let path = vec![TOKEN_PREFIX.to_string(), salt.to_string(), flat];

    let acquired = ctx.cache().store().acquire(
        &path,
        ctx.generation(),
        |_| -> Result<CacheValue, Infallible> {
            let token_key = hash(&format!("{}_{}", salt, path[2]));
            let hash_id = format!("{}-{}", ctx.config.hash_prefix, hash(&token_key));
            tracing::debug!(token_key = %token_key, "token registered");
            Ok(CacheValue::Token(Arc::new(CachedToken {
                token: token.clone(),
                token_key,
                hash_id,
            })))
        },
        |_, _| {},
    );

    let acquired = match acquired {
        Ok(acquired) => acquired,
        Err(never) => match never {},
    };

    match acquired.value {
        CacheValue::Token(token) => Ok(TokenRegistration {
            ctx: ctx.clone(),
            path,
            seq: acquired.seq,
            token,
        }),
        CacheValue::Style(_) => {
            ctx.cache()
                .store()
                .release_slot(&path, acquired.seq, Eviction::KeepAlive, |_, _| {});
            Err(CssInJsError::CacheMismatch(cache_key(&path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattening_ignores_key_order() {
        let a = json!({ "colorPrimary": "#1677ff", "size": { "sm": 8, "lg": 16 } });
        let b = json!({ "size": { "lg": 16, "sm": 8 }, "colorPrimary": "#1677ff" });
        assert_eq!(flatten_token(&a), flatten_token(&b));
        assert_eq!(token_key(&a, "5.0"), token_key(&b, "5.0"));
        assert_ne!(token_key(&a, "5.0"), token_key(&a, "5.1"));
    }

    #[test]
    fn equal_tokens_share_one_entry() {
        let ctx = StyleContext::default();
        let token = json!({ "colorPrimary": "#1677ff" });

        let first = register_token(&ctx, &token, "salt").unwrap();
        let second = register_token(&ctx, &token, "salt").unwrap();
        assert!(Arc::ptr_eq(first.token(), second.token()));
        assert_eq!(first.token_key(), token_key(&token, "salt"));
        assert_eq!(first.hash_id(), format!("css-{}", hash(first.token_key())));

        drop(first);
        assert_eq!(ctx.cache().store().len(), 1);
        drop(second);
        assert!(ctx.cache().store().is_empty());
    }

    #[test]
    fn different_content_gets_a_different_key() {
        let ctx = StyleContext::default();
        let blue = register_token(&ctx, &json!({ "colorPrimary": "blue" }), "").unwrap();
        let red = register_token(&ctx, &json!({ "colorPrimary": "red" }), "").unwrap();
        assert_ne!(blue.token_key(), red.token_key());
        assert_ne!(blue.hash_id(), red.hash_id());
    }
}
