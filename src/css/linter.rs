// Development-time diagnostics for style declarations
use std::fmt;

use super::values::Literal;

/// Where a declaration sits, for diagnostics
#[derive(Debug, Clone, Copy)]
pub struct LintInfo<'a> {
    pub path: Option<&'a str>,
    pub hash_id: Option<&'a str>,
    pub parent_selectors: &'a [String],
}

/// A non-fatal diagnostic; never alters compiled output
#[derive(Debug, Clone, PartialEq)]
pub struct LintWarning {
    pub message: String,
    pub path: Option<String>,
    pub parent_selectors: Vec<String>,
}

impl LintWarning {
    pub fn new(message: impl Into<String>, info: &LintInfo<'_>) -> Self {
        Self {
            message: message.into(),
            path: info.path.map(str::to_string),
            parent_selectors: info.parent_selectors.to_vec(),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[CSS-in-JS] ")?;
        if let Some(path) = &self.path {
            write!(f, "Error in {}: ", path)?;
        }
        f.write_str(&self.message)?;
        if !self.parent_selectors.is_empty() {
            write!(f, " Selector: {}", self.parent_selectors.join(" | "))?;
        }
        Ok(())
    }
}

pub trait Linter: fmt::Debug + Send + Sync {
    /// Inspect one declaration, returning a message when it looks wrong
    fn lint(&self, key: &str, value: &Literal, info: &LintInfo<'_>) -> Option<String>;
}

/// Linters that run on every declaration in development builds
pub fn default_linters() -> [&'static dyn Linter; 2] {
    [&ContentQuotesLinter, &HashedAnimationLinter]
}

/// `content` must be a quoted string or a recognised keyword/function
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentQuotesLinter;

const CONTENT_KEYWORDS: [&str; 5] = ["normal", "none", "initial", "inherit", "unset"];
const CONTENT_FUNCTIONS: [&str; 9] = [
    "attr(",
    "counter(",
    "counters(",
    "url(",
    "linear-gradient(",
    "radial-gradient(",
    "repeating-linear-gradient(",
    "repeating-radial-gradient(",
    "conic-gradient(",
];

impl Linter for ContentQuotesLinter {
    fn lint(&self, key: &str, value: &Literal, _info: &LintInfo<'_>) -> Option<String> {
        if key != "content" {
            return None;
        }

        let acceptable = match value {
            Literal::Number(_) => false,
            Literal::Text(text) => {
                CONTENT_KEYWORDS.contains(&text.as_str())
                    || CONTENT_FUNCTIONS.iter().any(|f| text.contains(f))
                    || text.contains("open-quote")
                    || text.contains("close-quote")
                    || is_quoted(text)
            }
        };

        (!acceptable).then(|| {
            format!(
                "You seem to be using a value for 'content' without quotes, try replacing it with `content: '\"{}\"'`.",
                value
            )
        })
    }
}

fn is_quoted(text: &str) -> bool {
    let first = text.chars().next();
    let last = text.chars().last();
    text.len() >= 2 && first == last && matches!(first, Some('"') | Some('\''))
}

/// Hashed scopes should reference animations through `Keyframes`, not a raw `animation` string
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedAnimationLinter;

impl Linter for HashedAnimationLinter {
    fn lint(&self, key: &str, value: &Literal, info: &LintInfo<'_>) -> Option<String> {
        let hashed = info.hash_id.is_some_and(|h| !h.is_empty());
        let is_none = matches!(value, Literal::Text(text) if text == "none");
        (key == "animation" && hashed && !is_none).then(|| {
            format!(
                "You seem to be using hashed animation '{}', in which case 'animationName' with Keyframe as value is recommended.",
                value
            )
        })
    }
}

/// Physical properties and values that break in right-to-left layouts
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalPropertiesLinter;

const RTL_HINT: &str = "which is not compatible with RTL mode. Please use logical properties and values instead. For more information: https://developer.mozilla.org/en-US/docs/Web/CSS/CSS_Logical_Properties.";

impl Linter for LogicalPropertiesLinter {
    fn lint(&self, key: &str, value: &Literal, _info: &LintInfo<'_>) -> Option<String> {
        match key {
            "marginLeft" | "marginRight" | "paddingLeft" | "paddingRight" | "left" | "right"
            | "borderLeft" | "borderLeftWidth" | "borderLeftStyle" | "borderLeftColor"
            | "borderRight" | "borderRightWidth" | "borderRightStyle" | "borderRightColor"
            | "borderTopLeftRadius" | "borderTopRightRadius" | "borderBottomLeftRadius"
            | "borderBottomRightRadius" => {
                Some(format!("You seem to be using non-logical property '{}' {}", key, RTL_HINT))
            }
            "margin" | "padding" | "borderWidth" | "borderStyle" => {
                let Literal::Text(text) = value else { return None };
                let parts: Vec<&str> = text.split_whitespace().collect();
                (parts.len() == 4 && parts[1] != parts[3]).then(|| {
                    format!(
                        "You seem to be using '{key}' property with different left {key} and right {key}, {}",
                        RTL_HINT
                    )
                })
            }
            "clear" | "textAlign" => {
                let Literal::Text(text) = value else { return None };
                (text == "left" || text == "right")
                    .then(|| format!("You seem to be using non-logical value '{}' of {}, {}", text, key, RTL_HINT))
            }
            "borderRadius" => {
                let Literal::Text(text) = value else { return None };
                let asymmetric = text.split('/').any(|group| {
                    let radii: Vec<&str> = group.split_whitespace().collect();
                    match radii.len() {
                        2 => radii[0] != radii[1],
                        3 => radii[0] != radii[1] || radii[1] != radii[2],
                        4 => radii[0] != radii[1] || radii[2] != radii[3],
                        _ => false,
                    }
                });
                asymmetric
                    .then(|| format!("You seem to be using non-logical value '{}' of {}, {}", text, key, RTL_HINT))
            }
            _ => None,
        }
    }
}

/// `:not(.a.b)` and `:not(.a, .b)` are unsupported by legacy browsers
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyNotSelectorLinter;

impl LegacyNotSelectorLinter {
    fn is_concat(inner: &str) -> bool {
        if inner.contains(',') {
            return true;
        }
        // More than one simple selector start after the first character
        inner
            .char_indices()
            .skip(1)
            .any(|(_, c)| matches!(c, '.' | '#' | '[' | ':'))
    }
}

impl Linter for LegacyNotSelectorLinter {
    fn lint(&self, _key: &str, _value: &Literal, info: &LintInfo<'_>) -> Option<String> {
        let concat = info.parent_selectors.iter().any(|selector| {
            selector.match_indices(":not(").any(|(start, pattern)| {
                let rest = &selector[start + pattern.len()..];
                rest.find(')').is_some_and(|end| Self::is_concat(rest[..end].trim()))
            })
        });
        concat.then(|| "Concat ':not' selector not support in legacy browsers.".to_string())
    }
}

/// At most one `&` per selector branch
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentSelectorLinter;

impl Linter for ParentSelectorLinter {
    fn lint(&self, _key: &str, _value: &Literal, info: &LintInfo<'_>) -> Option<String> {
        let repeated = info
            .parent_selectors
            .iter()
            .any(|selector| selector.split(',').any(|branch| branch.matches('&').count() > 1));
        repeated.then(|| "Should not use more than one `&` in a selector.".to_string())
    }
}

/// `NaN` leaking into a value from a failed computation
#[derive(Debug, Clone, Copy, Default)]
pub struct NaNLinter;

impl Linter for NaNLinter {
    fn lint(&self, key: &str, value: &Literal, _info: &LintInfo<'_>) -> Option<String> {
        let nan = match value {
            Literal::Number(n) => n.is_nan(),
            Literal::Text(text) => text.contains("NaN"),
        };
        nan.then(|| format!("Unexpected 'NaN' in property '{}: {}'.", key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info<'a>(hash_id: Option<&'a str>, parents: &'a [String]) -> LintInfo<'a> {
        LintInfo { path: Some("button"), hash_id, parent_selectors: parents }
    }

    #[test]
    fn content_keywords_and_quotes_pass() {
        let linter = ContentQuotesLinter;
        for ok in ["inherit", "\"foo\"", "'x'", "attr(title)", "open-quote", "linear-gradient(red, blue)"] {
            assert_eq!(linter.lint("content", &Literal::from(ok), &info(None, &[])), None, "{}", ok);
        }
    }

    #[test]
    fn unquoted_content_warns() {
        let linter = ContentQuotesLinter;
        assert!(linter.lint("content", &Literal::from("foo"), &info(None, &[])).is_some());
        assert!(linter.lint("content", &Literal::from(1), &info(None, &[])).is_some());
        assert!(linter.lint("color", &Literal::from("foo"), &info(None, &[])).is_none());
    }

    #[test]
    fn hashed_animation_needs_a_hash() {
        let linter = HashedAnimationLinter;
        let value = Literal::from("spin 1s");
        assert!(linter.lint("animation", &value, &info(Some("css-1"), &[])).is_some());
        assert!(linter.lint("animation", &value, &info(None, &[])).is_none());
        assert!(linter.lint("animation", &Literal::from("none"), &info(Some("css-1"), &[])).is_none());
    }

    #[test]
    fn logical_property_checks() {
        let linter = LogicalPropertiesLinter;
        let none: [String; 0] = [];
        assert!(linter.lint("marginLeft", &Literal::from(4), &info(None, &none)).is_some());
        assert!(linter.lint("margin", &Literal::from("1px 2px 3px 4px"), &info(None, &none)).is_some());
        assert!(linter.lint("margin", &Literal::from("1px 2px 3px 2px"), &info(None, &none)).is_none());
        assert!(linter.lint("textAlign", &Literal::from("left"), &info(None, &none)).is_some());
        assert!(linter.lint("borderRadius", &Literal::from("2px 4px"), &info(None, &none)).is_some());
        assert!(linter.lint("borderRadius", &Literal::from("2px"), &info(None, &none)).is_none());
    }

    #[test]
    fn selector_linters_read_parent_chain() {
        let concat = vec![".a:not(.b.c)".to_string()];
        let simple = vec![".a:not(.b)".to_string()];
        let doubled = vec!["&&:hover".to_string()];
        let value = Literal::from(1);
        assert!(LegacyNotSelectorLinter.lint("x", &value, &info(None, &concat)).is_some());
        assert!(LegacyNotSelectorLinter.lint("x", &value, &info(None, &simple)).is_none());
        assert!(ParentSelectorLinter.lint("x", &value, &info(None, &doubled)).is_some());
        assert!(ParentSelectorLinter.lint("x", &value, &info(None, &simple)).is_none());
    }

    #[test]
    fn nan_values_warn() {
        assert!(NaNLinter.lint("width", &Literal::Number(f64::NAN), &info(None, &[])).is_some());
        assert!(NaNLinter.lint("width", &Literal::from("NaNpx"), &info(None, &[])).is_some());
        assert!(NaNLinter.lint("width", &Literal::from(3), &info(None, &[])).is_none());
    }

    #[test]
    fn warning_display_includes_breadcrumbs() {
        let parents = vec![".a".to_string(), "&:hover".to_string()];
        let warning = LintWarning::new("bad", &info(None, &parents));
        assert_eq!(warning.to_string(), "[CSS-in-JS] Error in button: bad Selector: .a | &:hover");
    }
}
