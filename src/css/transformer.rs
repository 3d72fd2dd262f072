// Style object rewrites applied before compilation
use std::fmt;

use smallvec::SmallVec;

use super::selector::split_top_level;
use super::values::{Literal, StyleObject, StyleValue};

pub trait Transformer: fmt::Debug + Send + Sync {
    /// Rewrite one property map; nested rule values are visited separately by the compiler
    fn visit(&self, object: &StyleObject) -> StyleObject;
}

/// Rewrites logical properties into their physical equivalents for browsers without support
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyLogicalProperties;

/// Physical targets of a logical property and whether the value must be copied whole
fn physical_targets(key: &str) -> Option<(&'static [&'static str], bool)> {
    let targets: &'static [&'static str] = match key {
        "inset" => &["top", "right", "bottom", "left"],
        "insetBlock" => &["top", "bottom"],
        "insetBlockStart" => &["top"],
        "insetBlockEnd" => &["bottom"],
        "insetInline" => &["left", "right"],
        "insetInlineStart" => &["left"],
        "insetInlineEnd" => &["right"],
        "marginBlock" => &["marginTop", "marginBottom"],
        "marginBlockStart" => &["marginTop"],
        "marginBlockEnd" => &["marginBottom"],
        "marginInline" => &["marginLeft", "marginRight"],
        "marginInlineStart" => &["marginLeft"],
        "marginInlineEnd" => &["marginRight"],
        "paddingBlock" => &["paddingTop", "paddingBottom"],
        "paddingBlockStart" => &["paddingTop"],
        "paddingBlockEnd" => &["paddingBottom"],
        "paddingInline" => &["paddingLeft", "paddingRight"],
        "paddingInlineStart" => &["paddingLeft"],
        "paddingInlineEnd" => &["paddingRight"],
        "borderBlockWidth" => &["borderTopWidth", "borderBottomWidth"],
        "borderBlockStartWidth" => &["borderTopWidth"],
        "borderBlockEndWidth" => &["borderBottomWidth"],
        "borderInlineWidth" => &["borderLeftWidth", "borderRightWidth"],
        "borderInlineStartWidth" => &["borderLeftWidth"],
        "borderInlineEndWidth" => &["borderRightWidth"],
        "borderBlockStyle" => &["borderTopStyle", "borderBottomStyle"],
        "borderBlockStartStyle" => &["borderTopStyle"],
        "borderBlockEndStyle" => &["borderBottomStyle"],
        "borderInlineStyle" => &["borderLeftStyle", "borderRightStyle"],
        "borderInlineStartStyle" => &["borderLeftStyle"],
        "borderInlineEndStyle" => &["borderRightStyle"],
        "borderBlockColor" => &["borderTopColor", "borderBottomColor"],
        "borderBlockStartColor" => &["borderTopColor"],
        "borderBlockEndColor" => &["borderBottomColor"],
        "borderInlineColor" => &["borderLeftColor", "borderRightColor"],
        "borderInlineStartColor" => &["borderLeftColor"],
        "borderInlineEndColor" => &["borderRightColor"],
        "borderStartStartRadius" => &["borderTopLeftRadius"],
        "borderStartEndRadius" => &["borderTopRightRadius"],
        "borderEndStartRadius" => &["borderBottomLeftRadius"],
        "borderEndEndRadius" => &["borderBottomRightRadius"],
        "borderBlock" => &["borderTop", "borderBottom"],
        "borderBlockStart" => &["borderTop"],
        "borderBlockEnd" => &["borderBottom"],
        "borderInline" => &["borderLeft", "borderRight"],
        "borderInlineStart" => &["borderLeft"],
        "borderInlineEnd" => &["borderRight"],
        _ => return None,
    };
    // Shorthands like `1px solid red` are copied, not split
    let copy_whole = matches!(
        key,
        "borderBlock" | "borderBlockStart" | "borderBlockEnd" | "borderInline" | "borderInlineStart" | "borderInlineEnd"
    );
    Some((targets, copy_whole))
}

/// Split a value on top-level whitespace, peeling off a trailing `!important`
fn split_values(text: &str) -> (SmallVec<[String; 4]>, bool) {
    let (text, important) = match text.trim().strip_suffix("!important") {
        Some(rest) => (rest.trim_end(), true),
        None => (text.trim(), false),
    };
    let values = split_top_level(text, ' ')
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    (values, important)
}

fn with_important(value: &str, important: bool) -> StyleValue {
    if important {
        StyleValue::from(format!("{} !important", value))
    } else {
        StyleValue::from(value)
    }
}

impl Transformer for LegacyLogicalProperties {
    fn visit(&self, object: &StyleObject) -> StyleObject {
        let mut out = StyleObject::new();
        for (key, value) in object.iter() {
            let Some((targets, copy_whole)) = physical_targets(key) else {
                out.set(key, value.clone());
                continue;
            };

            let text = match value {
                StyleValue::Literal(Literal::Text(text)) => text,
                StyleValue::Literal(Literal::Number(_)) => {
                    for target in targets {
                        out.set(*target, value.clone());
                    }
                    continue;
                }
                _ => {
                    out.set(key, value.clone());
                    continue;
                }
            };

            if copy_whole {
                for target in targets {
                    out.set(*target, value.clone());
                }
                continue;
            }

            let (values, important) = split_values(text);
            if values.is_empty() {
                out.set(key, value.clone());
                continue;
            }
            for (index, target) in targets.iter().enumerate() {
                let picked = match targets.len() {
                    4 => values
                        .get(index)
                        .or_else(|| index.checked_sub(2).and_then(|i| values.get(i)))
                        .unwrap_or(&values[0]),
                    _ => values.get(index).unwrap_or(&values[0]),
                };
                out.set(*target, with_important(picked, important));
            }
        }
        out
    }
}
