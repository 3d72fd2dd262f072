// Style tree compiler: turns style descriptions into CSS source for the backend
use std::sync::Arc;

use super::linter::{default_linters, LintInfo, LintWarning, Linter};
use super::selector::{inject_selector_hash, HashPriority};
use super::transformer::Transformer;
use super::values::{is_unitless, to_kebab_case, Interpolation, Keyframes, Literal, StyleObject, StyleValue};

/// Options threaded unchanged through one compilation
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Scope hash class injected into root selectors
    pub hash_id: Option<String>,
    pub hash_priority: HashPriority,
    /// Cascade layer, optionally an ordering list such as `base,components`
    pub layer: Option<String>,
    /// Whether the runtime understands `@layer`; the layer is ignored otherwise
    pub layer_supported: bool,
    /// Breadcrumb used in diagnostics
    pub path: Option<String>,
    pub transformers: Vec<Arc<dyn Transformer>>,
    /// Extra linters run after the built-in ones
    pub linters: Vec<Arc<dyn Linter>>,
    /// Development mode: run linters and collect warnings
    pub dev_warnings: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            hash_id: None,
            hash_priority: HashPriority::default(),
            layer: None,
            layer_supported: false,
            path: None,
            transformers: Vec::new(),
            linters: Vec::new(),
            dev_warnings: cfg!(debug_assertions),
        }
    }
}

/// Named fragments (keyframes) emitted independently of the owning stylesheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectStyles {
    entries: Vec<(String, String)>,
}

impl EffectStyles {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, css)| css.as_str())
    }

    /// Add a fragment unless one with the same name exists; existing entries are never replaced
    pub fn insert(&mut self, name: String, css: String) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, css));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, css)| (n.as_str(), css.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for EffectStyles {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut effects = EffectStyles::default();
        for (name, css) in iter {
            effects.insert(name, css);
        }
        effects
    }
}

/// Result of compiling one style description
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOutput {
    pub css: String,
    pub effects: EffectStyles,
    pub warnings: Vec<LintWarning>,
}

/// Per-level recursion state
#[derive(Debug, Clone)]
struct Frame {
    root: bool,
    inject_hash: bool,
    parent_selectors: Vec<String>,
}

/// Accumulated by value through the recursion and handed back by every frame
#[derive(Debug, Default)]
struct Pass {
    effects: EffectStyles,
    warnings: Vec<LintWarning>,
}

/// Compile a style description into backend-ready CSS source plus its effect fragments
pub fn parse_style(interpolation: &Interpolation, config: &ParseConfig) -> ParseOutput {
    let frame = Frame {
        root: true,
        inject_hash: false,
        parent_selectors: Vec::new(),
    };
    let (css, pass) = parse_node(interpolation, config, &frame, Pass::default());
    ParseOutput {
        css,
        effects: pass.effects,
        warnings: pass.warnings,
    }
}

fn parse_node(node: &Interpolation, config: &ParseConfig, frame: &Frame, mut pass: Pass) -> (String, Pass) {
    let mut css = String::new();

    for item in node.flatten() {
        match item {
            Interpolation::Raw(text) => {
                if frame.root {
                    css.push_str(text);
                    css.push('\n');
                }
            }
            Interpolation::Keyframes(keyframes) => {
                pass = parse_keyframes(keyframes, config, frame, pass);
            }
            Interpolation::Object(object) => {
                let transformed;
                let object = if config.transformers.is_empty() {
                    object
                } else {
                    transformed = config
                        .transformers
                        .iter()
                        .fold(object.clone(), |acc, transformer| transformer.visit(&acc));
                    &transformed
                };
                pass = parse_object(object, config, frame, pass, &mut css);
            }
            Interpolation::Empty | Interpolation::List(_) => {}
        }
    }

    if !frame.root {
        css = format!("{{{}}}", css);
    } else if let Some(layer) = config
        .layer
        .as_deref()
        .filter(|layer| config.layer_supported && !layer.trim().is_empty())
    {
        let name = layer.rsplit(',').next().unwrap_or(layer).trim();
        css = format!("@layer {} {{{}}}", name, css);
        if layer.contains(',') {
            // Order-only statement so precedence does not depend on first use
            css = format!("@layer {}{{%%%:%}}{}", layer, css);
        }
    }

    (css, pass)
}

fn parse_object(object: &StyleObject, config: &ParseConfig, frame: &Frame, mut pass: Pass, css: &mut String) -> Pass {
    let hash_id = config.hash_id.as_deref().filter(|hash_id| !hash_id.is_empty());

    for (key, value) in object.iter() {
        match value {
            StyleValue::Nested(child) => {
                let mut merged_key = key.trim().to_string();
                let mut inject_hash = false;
                let mut next_root = false;

                match hash_id {
                    Some(hash_id) if frame.root || frame.inject_hash => {
                        if merged_key.starts_with('@') {
                            // At-rules keep their prelude; their children get scoped instead
                            inject_hash = true;
                        } else if merged_key == "&" {
                            merged_key = inject_selector_hash("", hash_id, config.hash_priority);
                        } else {
                            merged_key = inject_selector_hash(key, hash_id, config.hash_priority);
                        }
                    }
                    None if frame.root && (merged_key == "&" || merged_key.is_empty()) => {
                        merged_key.clear();
                        next_root = true;
                    }
                    _ => {}
                }

                let mut parent_selectors = frame.parent_selectors.clone();
                parent_selectors.push(merged_key.clone());
                let child_frame = Frame {
                    root: next_root,
                    inject_hash,
                    parent_selectors,
                };

                let (child_css, next_pass) = parse_node(child, config, &child_frame, pass);
                pass = next_pass;
                css.push_str(&merged_key);
                css.push_str(&child_css);
            }
            StyleValue::Keyframes(keyframes) => {
                pass = parse_keyframes(keyframes, config, frame, pass);
                let name = keyframes.get_name(hash_id);
                push_declaration(css, key, &name);
            }
            StyleValue::Literal(literal) => {
                append_declaration(css, key, literal, false, config, frame, &mut pass.warnings);
            }
            StyleValue::Unchecked(literal) => {
                append_declaration(css, key, literal, true, config, frame, &mut pass.warnings);
            }
            StyleValue::Multi { values, skip_check } => {
                for literal in values {
                    append_declaration(css, key, literal, *skip_check, config, frame, &mut pass.warnings);
                }
            }
        }
    }

    pass
}

fn append_declaration(
    css: &mut String,
    key: &str,
    value: &Literal,
    skip_check: bool,
    config: &ParseConfig,
    frame: &Frame,
    warnings: &mut Vec<LintWarning>,
) {
    if config.dev_warnings && !skip_check {
        let info = LintInfo {
            path: config.path.as_deref(),
            hash_id: config.hash_id.as_deref(),
            parent_selectors: &frame.parent_selectors,
        };
        let mut run = |linter: &dyn Linter| {
            if let Some(message) = linter.lint(key, value, &info) {
                warnings.push(LintWarning::new(message, &info));
            }
        };
        for linter in default_linters() {
            run(linter);
        }
        for linter in &config.linters {
            run(linter.as_ref());
        }
    }

    let formatted = match value {
        Literal::Number(n) if *n != 0.0 && !is_unitless(key) => format!("{}px", value),
        _ => value.to_string(),
    };
    push_declaration(css, key, &formatted);
}

fn push_declaration(css: &mut String, key: &str, value: &str) {
    css.push_str(&to_kebab_case(key));
    css.push(':');
    css.push_str(value);
    css.push(';');
}

/// Compile a keyframes body once per pass and record it under its scoped name
fn parse_keyframes(keyframes: &Keyframes, config: &ParseConfig, frame: &Frame, pass: Pass) -> Pass {
    let name = keyframes.get_name(config.hash_id.as_deref());
    if pass.effects.contains(&name) {
        return pass;
    }

    let body_frame = Frame {
        root: false,
        inject_hash: false,
        parent_selectors: frame.parent_selectors.clone(),
    };
    let (body, mut pass) = parse_node(keyframes.style(), config, &body_frame, pass);
    let block = format!("@keyframes {}{}", name, body);
    pass.effects.insert(name, block);
    pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::linter::LogicalPropertiesLinter;
    use crate::css::transformer::LegacyLogicalProperties;
    use serde_json::json;

    fn compile(style: serde_json::Value) -> String {
        parse_style(&Interpolation::from(style), &ParseConfig::default()).css
    }

    fn hashed(hash_id: &str) -> ParseConfig {
        ParseConfig {
            hash_id: Some(hash_id.to_string()),
            ..ParseConfig::default()
        }
    }

    #[test]
    fn skip_check_wrapper_compiles_to_a_plain_declaration() {
        assert_eq!(
            compile(json!({ "marginLeft": { "__skip_check__": true, "value": 4 } })),
            "margin-left:4px;"
        );
        assert_eq!(compile(json!({ "marginLeft": { "_skip_check_": true, "value": 4 } })), "margin-left:4px;");
    }

    #[test]
    fn numbers_get_px_except_zero() {
        assert_eq!(compile(json!({ "color": "red", "margin": 4 })), "color:red;margin:4px;");
        assert_eq!(compile(json!({ "padding": 0, "top": -2.5 })), "padding:0;top:-2.5px;");
    }

    #[test]
    fn unitless_properties_stay_bare() {
        assert_eq!(compile(json!({ "lineHeight": 4 })), "line-height:4;");
        assert_eq!(compile(json!({ "zIndex": 10, "opacity": 0.5 })), "z-index:10;opacity:0.5;");
    }

    #[test]
    fn bare_ampersand_collapses_without_hash() {
        assert_eq!(compile(json!({ "&": { "color": "red" } })), compile(json!({ "color": "red" })));
        assert_eq!(
            compile(json!({ "&": { ".a": { "color": "red" } } })),
            compile(json!({ ".a": { "color": "red" } }))
        );
    }

    #[test]
    fn nested_rules_wrap_in_braces() {
        assert_eq!(
            compile(json!({ ".a": { "color": "red", "&:hover": { "color": "blue" } } })),
            ".a{color:red;&:hover{color:blue;}}"
        );
    }

    #[test]
    fn hash_is_injected_at_root_only() {
        let style = Interpolation::from(json!({
            ".btn": {
                "color": "red",
                "&:hover": { "color": "blue" },
                "@media (max-width: 100px)": { ".icon": { "margin": 0 } },
            }
        }));
        let out = parse_style(&style, &hashed("css-x"));
        assert_eq!(
            out.css,
            ".css-x.btn{color:red;&:hover{color:blue;}@media (max-width: 100px){.icon{margin:0;}}}"
        );
    }

    #[test]
    fn root_at_rules_propagate_injection() {
        let style = Interpolation::from(json!({ "@media (min-width: 1px)": { ".a": { "color": "red" } } }));
        assert_eq!(parse_style(&style, &hashed("h")).css, "@media (min-width: 1px){.h.a{color:red;}}");

        let style = Interpolation::from(json!({ "&": { "color": "red" } }));
        assert_eq!(parse_style(&style, &hashed("h")).css, ".h{color:red;}");
    }

    #[test]
    fn low_priority_uses_where() {
        let config = ParseConfig {
            hash_priority: HashPriority::Low,
            ..hashed("h")
        };
        let style = Interpolation::from(json!({ "div": { "color": "red" } }));
        assert_eq!(parse_style(&style, &config).css, "div:where(.h){color:red;}");
    }

    #[test]
    fn raw_strings_only_at_root() {
        let style = Interpolation::from(json!([".x{top:0}", { ".a": [".ignored{}", { "color": "red" }] }]));
        assert_eq!(parse_style(&style, &ParseConfig::default()).css, ".x{top:0}\n.a{color:red;}");
    }

    #[test]
    fn keyframes_are_extracted_once_per_pass() {
        let fade = Keyframes::new("fade", json!({ "from": { "opacity": 0 }, "to": { "opacity": 1 } }));
        let style = StyleObject::new()
            .with(".a", StyleObject::new().with("animationName", fade.clone()))
            .with(".b", StyleObject::new().with("animationName", fade.clone()));
        let out = parse_style(&Interpolation::from(style), &hashed("h"));

        assert_eq!(out.effects.len(), 1);
        assert_eq!(out.effects.get("h-fade"), Some("@keyframes h-fade{from{opacity:0;}to{opacity:1;}}"));
        assert_eq!(
            out.css,
            ".h.a{animation-name:h-fade;}.h.b{animation-name:h-fade;}"
        );
    }

    #[test]
    fn top_level_keyframes_only_produce_effects() {
        let spin = Keyframes::new("spin", json!({ "to": { "rotate": "1turn" } }));
        let out = parse_style(&Interpolation::from(vec![Interpolation::from(spin)]), &ParseConfig::default());
        assert_eq!(out.css, "");
        assert_eq!(out.effects.get("spin"), Some("@keyframes spin{to{rotate:1turn;}}"));
    }

    #[test]
    fn layer_wraps_root_when_supported() {
        let style = Interpolation::from(json!({ "color": "red" }));
        let mut config = ParseConfig {
            layer: Some("base,comp".to_string()),
            layer_supported: true,
            ..ParseConfig::default()
        };
        assert_eq!(parse_style(&style, &config).css, "@layer base,comp{%%%:%}@layer comp {color:red;}");

        config.layer = Some("comp".to_string());
        assert_eq!(parse_style(&style, &config).css, "@layer comp {color:red;}");

        config.layer_supported = false;
        assert_eq!(parse_style(&style, &config).css, "color:red;");
    }

    #[test]
    fn multi_values_emit_each_declaration() {
        let style = json!({ "display": { "_multi_value_": true, "value": ["-webkit-box", "flex"] } });
        assert_eq!(compile(style), "display:-webkit-box;display:flex;");
    }

    #[test]
    fn content_lint_runs_only_in_development() {
        let style = Interpolation::from(json!({ ".a": { "content": "foo" }, ".b": { "content": "inherit" } }));
        let dev = ParseConfig {
            dev_warnings: true,
            path: Some("Button".to_string()),
            ..ParseConfig::default()
        };
        let out = parse_style(&style, &dev);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].parent_selectors, [".a"]);
        assert_eq!(out.warnings[0].path.as_deref(), Some("Button"));

        let prod = ParseConfig {
            dev_warnings: false,
            ..dev.clone()
        };
        let quiet = parse_style(&style, &prod);
        assert!(quiet.warnings.is_empty());
        assert_eq!(quiet.css, out.css);
    }

    #[test]
    fn skip_check_bypasses_linters() {
        let config = ParseConfig {
            dev_warnings: true,
            linters: vec![Arc::new(LogicalPropertiesLinter)],
            ..ParseConfig::default()
        };
        let checked = parse_style(&Interpolation::from(json!({ "marginLeft": 4 })), &config);
        let unchecked = parse_style(
            &Interpolation::from(json!({ "marginLeft": { "_skip_check_": true, "value": 4 } })),
            &config,
        );
        assert_eq!(checked.warnings.len(), 1);
        assert!(unchecked.warnings.is_empty());
        assert_eq!(checked.css, unchecked.css);
    }

    #[test]
    fn transformers_rewrite_each_property_map() {
        let config = ParseConfig {
            transformers: vec![Arc::new(LegacyLogicalProperties)],
            ..ParseConfig::default()
        };
        let style = Interpolation::from(json!({ ".a": { "marginInline": 8 } }));
        assert_eq!(parse_style(&style, &config).css, ".a{margin-left:8px;margin-right:8px;}");
    }

    #[test]
    fn compilation_is_deterministic() {
        let fade = Keyframes::new("fade", json!({ "to": { "opacity": 1 } }));
        let style = Interpolation::from(
            StyleObject::new()
                .with(".a", StyleObject::new().with("animationName", fade).with("width", 3))
                .with("@supports (display: grid)", StyleObject::new().with(".b", StyleObject::new().with("gap", 2))),
        );
        let config = hashed("h");
        assert_eq!(parse_style(&style, &config), parse_style(&style, &config));
    }
}
