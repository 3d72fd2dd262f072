// Server-side extraction of every resident stylesheet
use rustc_hash::FxHashSet;

use crate::cache::{cache_key, CacheEntity};
use crate::dom::{ATTR_MARK, ATTR_TOKEN};
use crate::register::EFFECT_PREFIX;

/// Serialize a `<style>` element with escaped attributes and body
pub(crate) fn style_tag(attributes: &[(&str, &str)], css: &str) -> String {
    let mut tag = String::from("<style");
    for (name, value) in attributes {
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        tag.push_str(&html_escape::encode_double_quoted_attribute(value));
        tag.push('"');
    }
    tag.push('>');
    tag.push_str(&html_escape::encode_style(css));
    tag.push_str("</style>");
    tag
}

/// Every resident stylesheet in cache order, each followed by the effect styles it
/// introduced. An effect shared by several scopes is emitted once. With `plain` the
/// bare CSS text is returned instead of `<style>` markup.
pub fn extract_style(cache: &CacheEntity, plain: bool) -> String {
    let mut out = String::new();
    let mut emitted_effects = FxHashSet::default();

    for (_, entry) in cache.style_entries() {
        if plain {
            out.push_str(&entry.css);
        } else {
            out.push_str(&style_tag(
                &[(ATTR_TOKEN, entry.token_key.as_str()), (ATTR_MARK, entry.style_id.as_str())],
                &entry.css,
            ));
        }

        for (name, effect) in entry.effects.iter() {
            if !emitted_effects.insert(name.to_string()) {
                continue;
            }
            if plain {
                out.push_str(effect);
            } else {
                let id = format!("{}{}", EFFECT_PREFIX, name);
                out.push_str(&style_tag(&[(ATTR_MARK, id.as_str())], effect));
            }
        }
    }
    out
}

/// Scope path to style id, shipped from server to client so hydration can reuse the
/// server-inserted text. Serialized as `path:styleId;path:styleId`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CachePathMap {
    entries: Vec<(String, String)>,
}

impl CachePathMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the serialized form. Malformed items are skipped.
    pub fn parse(text: &str) -> Self {
        let mut map = Self::new();
        for item in text.split(';') {
            let Some((path, style_id)) = item.trim().rsplit_once(':') else {
                continue;
            };
            if path.is_empty() || style_id.is_empty() {
                continue;
            }
            map.insert(path, style_id);
        }
        map
    }

    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(path, style_id)| format!("{}:{}", path, style_id))
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, style_id)| style_id.as_str())
    }

    pub fn insert(&mut self, path: impl Into<String>, style_id: impl Into<String>) {
        let path = path.into();
        let style_id = style_id.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = style_id,
            None => self.entries.push((path, style_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hydration map of every resident stylesheet
pub fn extract_cache_path_map(cache: &CacheEntity) -> CachePathMap {
    let mut map = CachePathMap::new();
    for (path, entry) in cache.style_entries() {
        map.insert(cache_key(&path), entry.style_id.clone());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::cache::EffectRegistry;
    use crate::css::{Interpolation, Keyframes, StyleObject};
    use crate::engine::StyleContext;
    use crate::register::{register_style, RegisterInfo};

    fn server() -> StyleContext {
        StyleContext::default().with_effects(Arc::new(EffectRegistry::new()))
    }

    #[test]
    fn two_scopes_give_two_tags_in_registration_order() {
        let ctx = server();
        let button = register_style(&ctx, &RegisterInfo::new("t1", &["Button"]), || {
            json!({ ".btn": { "color": "red" } }).into()
        })
        .unwrap();
        let input = register_style(&ctx, &RegisterInfo::new("t2", &["Input"]), || {
            json!({ ".input": { "color": "blue" } }).into()
        })
        .unwrap();

        let html = extract_style(ctx.cache(), false);
        let expected = format!(
            r#"<style data-token="t1" data-css-hash="{}">.btn{{color:red;}}</style><style data-token="t2" data-css-hash="{}">.input{{color:blue;}}</style>"#,
            button.style_id(),
            input.style_id()
        );
        assert_eq!(html, expected);
        assert_eq!(html, extract_style(ctx.cache(), false));
        assert_eq!(html.matches("<style").count(), 2);
    }

    #[test]
    fn plain_mode_and_shared_effects() {
        let ctx = server();
        let fade = Keyframes::new("fade", json!({ "to": { "opacity": 1 } }));
        let style = |selector: &str| -> Interpolation {
            StyleObject::new()
                .with(selector, StyleObject::new().with("animationName", fade.clone()))
                .into()
        };
        let _a = register_style(&ctx, &RegisterInfo::new("t", &["A"]), || style(".a")).unwrap();
        let _b = register_style(&ctx, &RegisterInfo::new("t", &["B"]), || style(".b")).unwrap();

        assert_eq!(
            extract_style(ctx.cache(), true),
            ".a{animation-name:fade;}@keyframes fade{to{opacity:1;}}.b{animation-name:fade;}"
        );
        let html = extract_style(ctx.cache(), false);
        assert_eq!(html.matches(r#"data-css-hash="_effect-fade""#).count(), 1);
    }

    #[test]
    fn released_entries_are_not_extracted_with_auto_clear() {
        let mut ctx = server();
        ctx.config.auto_clear = true;
        let registration = register_style(&ctx, &RegisterInfo::new("t", &["A"]), || {
            json!({ "a": { "top": 0 } }).into()
        })
        .unwrap();
        drop(registration);
        assert_eq!(extract_style(ctx.cache(), false), "");
    }

    #[test]
    fn cache_path_map_survives_serialization() {
        let ctx = server();
        let a = register_style(&ctx, &RegisterInfo::new("t", &["A"]), || json!({ "a": { "top": 0 } }).into()).unwrap();

        let map = extract_cache_path_map(ctx.cache());
        assert_eq!(map.serialize(), format!("t%A:{}", a.style_id()));
        assert_eq!(CachePathMap::parse(&map.serialize()), map);
        assert_eq!(map.get("t%A"), Some(a.style_id()));
    }

    #[test]
    fn parse_skips_malformed_items() {
        let map = CachePathMap::parse("a:1;;broken; b:2");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("b"), Some("2"));
    }
}
