// Style description value types
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Marker key of the escape-hatch wrapper `{ "_skip_check_": true, "value": ... }`
pub const SKIP_CHECK: &str = "_skip_check_";
/// Double-underscore spelling of [`SKIP_CHECK`], accepted as well
pub const SKIP_CHECK_ALT: &str = "__skip_check__";
/// Marker key of the multi-value wrapper `{ "_multi_value_": true, "value": [...] }`
pub const MULTI_VALUE: &str = "_multi_value_";

/// A node of a style description tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interpolation {
    /// `null`, `undefined` and `false` entries; dropped during flattening
    #[default]
    Empty,
    /// Raw CSS text, only emitted at root level
    Raw(String),
    Object(StyleObject),
    Keyframes(Keyframes),
    List(Vec<Interpolation>),
}

impl Interpolation {
    /// Flatten nested lists depth-first, dropping empty entries
    pub fn flatten(&self) -> Vec<&Interpolation> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Interpolation>) {
        match self {
            Interpolation::Empty => {}
            Interpolation::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

impl From<StyleObject> for Interpolation {
    fn from(object: StyleObject) -> Self {
        Interpolation::Object(object)
    }
}

impl From<Keyframes> for Interpolation {
    fn from(keyframes: Keyframes) -> Self {
        Interpolation::Keyframes(keyframes)
    }
}

impl From<&str> for Interpolation {
    fn from(raw: &str) -> Self {
        Interpolation::Raw(raw.to_string())
    }
}

impl From<Vec<Interpolation>> for Interpolation {
    fn from(items: Vec<Interpolation>) -> Self {
        Interpolation::List(items)
    }
}

impl From<Value> for Interpolation {
    fn from(value: Value) -> Self {
        match value {
            Value::String(raw) => Interpolation::Raw(raw),
            Value::Array(items) => Interpolation::List(items.into_iter().map(Interpolation::from).collect()),
            Value::Object(map) => {
                let mut object = StyleObject::new();
                for (key, value) in map {
                    if let Some(value) = StyleValue::from_json(value) {
                        object.set(key, value);
                    }
                }
                Interpolation::Object(object)
            }
            // Numbers and booleans carry no meaning as a rule list
            _ => Interpolation::Empty,
        }
    }
}

/// An ordered property-or-selector map. Setting an existing key replaces it in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleObject {
    entries: Vec<(String, StyleValue)>,
}

impl StyleObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StyleObject::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<StyleValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A primitive declaration value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Text(text) => f.write_str(text),
            // -0 prints as 0
            Literal::Number(n) if *n == 0.0 => f.write_str("0"),
            Literal::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Literal {
    fn from(text: &str) -> Self {
        Literal::Text(text.to_string())
    }
}

impl From<String> for Literal {
    fn from(text: String) -> Self {
        Literal::Text(text)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(n as f64)
    }
}

/// The value side of a style object entry
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Literal(Literal),
    /// Escape hatch: emitted like a literal but never linted
    Unchecked(Literal),
    /// One declaration per value, in order
    Multi { values: Vec<Literal>, skip_check: bool },
    Keyframes(Keyframes),
    /// A nested rule or at-rule body
    Nested(Interpolation),
}

impl StyleValue {
    /// Converts a JSON value, returning `None` for `null` and `false`
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::Bool(true) => Some(StyleValue::Literal(Literal::Text("true".to_string()))),
            Value::String(text) => Some(StyleValue::Literal(Literal::Text(text))),
            Value::Number(n) => n.as_f64().map(|n| StyleValue::Literal(Literal::Number(n))),
            Value::Array(items) => Some(StyleValue::Nested(Interpolation::List(
                items.into_iter().map(Interpolation::from).collect(),
            ))),
            Value::Object(mut map) => {
                let skip_check = map
                    .get(SKIP_CHECK)
                    .or_else(|| map.get(SKIP_CHECK_ALT))
                    .and_then(Value::as_bool);
                let multi = map.get(MULTI_VALUE).and_then(Value::as_bool).unwrap_or(false);
                if skip_check.is_none() && !multi {
                    return Some(StyleValue::Nested(Interpolation::from(Value::Object(map))));
                }
                let skip_check = skip_check.unwrap_or(false);
                let inner = map.remove("value").unwrap_or(Value::Null);
                if multi {
                    let values = match inner {
                        Value::Array(items) => items.into_iter().filter_map(literal_from_json).collect(),
                        other => literal_from_json(other).into_iter().collect(),
                    };
                    return Some(StyleValue::Multi { values, skip_check });
                }
                let literal = literal_from_json(inner)?;
                Some(if skip_check {
                    StyleValue::Unchecked(literal)
                } else {
                    StyleValue::Literal(literal)
                })
            }
        }
    }
}

fn literal_from_json(value: Value) -> Option<Literal> {
    match value {
        Value::String(text) => Some(Literal::Text(text)),
        Value::Number(n) => n.as_f64().map(Literal::Number),
        Value::Bool(true) => Some(Literal::Text("true".to_string())),
        _ => None,
    }
}

impl From<Literal> for StyleValue {
    fn from(literal: Literal) -> Self {
        StyleValue::Literal(literal)
    }
}

impl From<&str> for StyleValue {
    fn from(text: &str) -> Self {
        StyleValue::Literal(Literal::from(text))
    }
}

impl From<String> for StyleValue {
    fn from(text: String) -> Self {
        StyleValue::Literal(Literal::Text(text))
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Literal(Literal::Number(n))
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Literal(Literal::from(n))
    }
}

impl From<StyleObject> for StyleValue {
    fn from(object: StyleObject) -> Self {
        StyleValue::Nested(Interpolation::Object(object))
    }
}

impl From<Interpolation> for StyleValue {
    fn from(interpolation: Interpolation) -> Self {
        StyleValue::Nested(interpolation)
    }
}

impl From<Keyframes> for StyleValue {
    fn from(keyframes: Keyframes) -> Self {
        StyleValue::Keyframes(keyframes)
    }
}

/// A named animation whose body is emitted once, globally, as an `@keyframes` block
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    name: String,
    style: Arc<Interpolation>,
}

impl Keyframes {
    pub fn new(name: impl Into<String>, style: impl Into<Interpolation>) -> Self {
        Self {
            name: name.into(),
            style: Arc::new(style.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &Interpolation {
        &self.style
    }

    /// Scoped animation name for the given hash seed
    pub fn get_name(&self, hash_id: Option<&str>) -> String {
        match hash_id {
            Some(hash_id) if !hash_id.is_empty() => format!("{}-{}", hash_id, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Convert a camel-case property name to kebab-case (`borderTopWidth` -> `border-top-width`)
pub fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Properties whose numeric values are emitted without a `px` suffix
pub fn is_unitless(key: &str) -> bool {
    matches!(
        key,
        "animationIterationCount"
            | "aspectRatio"
            | "borderImageOutset"
            | "borderImageSlice"
            | "borderImageWidth"
            | "boxFlex"
            | "boxFlexGroup"
            | "boxOrdinalGroup"
            | "columnCount"
            | "columns"
            | "flex"
            | "flexGrow"
            | "flexPositive"
            | "flexShrink"
            | "flexNegative"
            | "flexOrder"
            | "gridRow"
            | "gridRowEnd"
            | "gridRowSpan"
            | "gridRowStart"
            | "gridColumn"
            | "gridColumnEnd"
            | "gridColumnSpan"
            | "gridColumnStart"
            | "msGridRow"
            | "msGridRowSpan"
            | "msGridColumn"
            | "msGridColumnSpan"
            | "fontWeight"
            | "lineHeight"
            | "opacity"
            | "order"
            | "orphans"
            | "scale"
            | "tabSize"
            | "widows"
            | "zIndex"
            | "zoom"
            | "WebkitLineClamp"
            | "fillOpacity"
            | "floodOpacity"
            | "stopOpacity"
            | "strokeDasharray"
            | "strokeDashoffset"
            | "strokeMiterlimit"
            | "strokeOpacity"
            | "strokeWidth"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(to_kebab_case("borderTopWidth"), "border-top-width");
        assert_eq!(to_kebab_case("WebkitLineClamp"), "-webkit-line-clamp");
        assert_eq!(to_kebab_case("color"), "color");
    }

    #[test]
    fn flatten_drops_empty_entries() {
        let list = Interpolation::from(json!([{ "a": 1 }, null, false, [[{ "b": 2 }], null]]));
        let flat = list.flatten();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn json_wrappers_become_explicit_variants() {
        let object = match Interpolation::from(json!({
            "margin": { "_skip_check_": true, "value": "0 4px 0 8px" },
            "display": { "_multi_value_": true, "value": ["-webkit-box", "flex"] },
            "color": null,
            ".child": { "color": "red" },
        })) {
            Interpolation::Object(object) => object,
            other => panic!("unexpected {:?}", other),
        };

        assert_eq!(object.len(), 3);
        assert_eq!(object.get("margin"), Some(&StyleValue::Unchecked(Literal::from("0 4px 0 8px"))));
        assert!(matches!(object.get("display"), Some(StyleValue::Multi { values, skip_check: false }) if values.len() == 2));
        assert!(matches!(object.get(".child"), Some(StyleValue::Nested(_))));
    }

    #[test]
    fn double_underscore_skip_check_is_accepted() {
        let object = match Interpolation::from(json!({ "marginLeft": { "__skip_check__": true, "value": 4 } })) {
            Interpolation::Object(object) => object,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(object.get("marginLeft"), Some(&StyleValue::Unchecked(Literal::Number(4.0))));
    }

    #[test]
    fn set_replaces_existing_key_in_place() {
        let object = StyleObject::new().with("a", 1).with("b", 2).with("a", 3);
        let keys: Vec<_> = object.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(object.get("a"), Some(&StyleValue::from(3)));
    }

    #[test]
    fn keyframe_names_follow_hash_seed() {
        let frames = Keyframes::new("fade", json!({ "from": { "opacity": 0 } }));
        assert_eq!(frames.get_name(None), "fade");
        assert_eq!(frames.get_name(Some("css-abc")), "css-abc-fade");
        assert_eq!(frames.get_name(Some("css-abc")), frames.clone().get_name(Some("css-abc")));
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(Literal::Number(-0.0).to_string(), "0");
        assert_eq!(Literal::Number(1.5).to_string(), "1.5");
        assert_eq!(Literal::Number(4.0).to_string(), "4");
    }
}
