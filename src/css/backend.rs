// CSS backend: flattens nested CSS source into browser-valid text
use std::fmt;

use cssparser::{ParseError, Parser, ParserInput, Token};

use super::selector::resolve_nested_selector;
use crate::error::BackendError;

/// Compiles raw (possibly nested) CSS source into flat CSS text.
///
/// Implementations must be pure and synchronous.
pub trait CssBackend: fmt::Debug + Send + Sync {
    fn compile(&self, source: &str) -> Result<String, BackendError>;
}

/// Default backend: resolves `&` and descendant nesting, hoists conditional at-rules
/// (`@media`, `@supports`, `@layer`, `@container`) above nested selectors, passes
/// `@keyframes`-like blocks through, and strips insignificant whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestingBackend;

impl CssBackend for NestingBackend {
    fn compile(&self, source: &str) -> Result<String, BackendError> {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        let nodes = parse_items(&mut parser).map_err(|err| BackendError {
            message: format!("{:?}", err.kind),
            line: err.location.line,
            column: err.location.column,
        })?;

        let mut out = String::with_capacity(source.len());
        serialize(&nodes, &[], &mut out);
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Declaration { name: String, value: String },
    /// A block-less at-rule such as `@import url(a.css)` or `@layer a, b`
    Statement(String),
    Block { prelude: String, children: Vec<Node> },
}

/// Parse a run of declarations, statements and blocks until the end of the current block
fn parse_items<'i, 't>(parser: &mut Parser<'i, 't>) -> Result<Vec<Node>, ParseError<'i, ()>> {
    let mut nodes = Vec::new();

    loop {
        parser.skip_whitespace();
        let start = parser.position();

        loop {
            let token = match parser.next_including_whitespace() {
                Ok(token) => Some(token.clone()),
                Err(_) => None,
            };
            let Some(token) = token else {
                push_item(&mut nodes, parser.slice_from(start));
                return Ok(nodes);
            };

            match token {
                Token::Semicolon => {
                    let text = parser.slice_from(start);
                    push_item(&mut nodes, text.strip_suffix(';').unwrap_or(text));
                    break;
                }
                Token::CurlyBracketBlock => {
                    let text = parser.slice_from(start);
                    let prelude = collapse_whitespace(text.strip_suffix('{').unwrap_or(text));
                    let children = parser.parse_nested_block(|nested| parse_items(nested))?;
                    nodes.push(Node::Block { prelude, children });
                    break;
                }
                Token::CloseCurlyBracket => {
                    return Err(parser.new_unexpected_token_error(token));
                }
                _ => {}
            }
        }
    }
}

fn push_item(nodes: &mut Vec<Node>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if text.starts_with('@') {
        nodes.push(Node::Statement(collapse_whitespace(text)));
        return;
    }
    match text.split_once(':') {
        Some((name, value)) => nodes.push(Node::Declaration {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
        }),
        // Not a declaration; drop it the way browsers drop invalid items
        None => {}
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn at_rule_name(prelude: &str) -> &str {
    prelude
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or(prelude)
}

/// Conditional group rules wrap nested rules; everything else keeps its own body
fn is_conditional(name: &str) -> bool {
    matches!(
        name,
        "@media" | "@supports" | "@layer" | "@container" | "@document" | "@scope" | "@starting-style"
    )
}

fn serialize(nodes: &[Node], selectors: &[String], out: &mut String) {
    let mut declarations = String::new();
    for node in nodes {
        if let Node::Declaration { name, value } = node {
            declarations.push_str(name);
            declarations.push(':');
            declarations.push_str(value);
            declarations.push(';');
        }
    }

    if !declarations.is_empty() {
        if selectors.is_empty() {
            out.push_str(&declarations);
        } else {
            out.push_str(&selectors.join(","));
            out.push('{');
            out.push_str(&declarations);
            out.push('}');
        }
    }

    for node in nodes {
        match node {
            Node::Declaration { .. } => {}
            Node::Statement(text) => {
                out.push_str(text);
                out.push(';');
            }
            Node::Block { prelude, children } if prelude.starts_with('@') => {
                out.push_str(prelude);
                out.push('{');
                if is_conditional(at_rule_name(prelude)) {
                    serialize(children, selectors, out);
                } else {
                    serialize(children, &[], out);
                }
                out.push('}');
            }
            Node::Block { prelude, children } => {
                let resolved = resolve_nested_selector(selectors, prelude);
                if resolved.is_empty() {
                    // `&` alone at the top level
                    serialize(children, selectors, out);
                } else {
                    serialize(children, &resolved, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> String {
        NestingBackend.compile(source).unwrap()
    }

    #[test]
    fn flattens_nested_rules() {
        assert_eq!(
            compile(".a{color: red;&:hover{color:blue;}.b{margin:0}}"),
            ".a{color:red;}.a:hover{color:blue;}.a .b{margin:0;}"
        );
    }

    #[test]
    fn groups_declarations_before_nested_rules() {
        assert_eq!(compile(".a{x:1;.b{y:2;}z:3;}"), ".a{x:1;z:3;}.a .b{y:2;}");
    }

    #[test]
    fn hoists_media_above_selectors() {
        assert_eq!(
            compile(".a{@media (max-width: 10px){color:red;}}"),
            "@media (max-width: 10px){.a{color:red;}}"
        );
    }

    #[test]
    fn keyframes_keep_their_own_selectors() {
        assert_eq!(
            compile("@keyframes spin{from{opacity:0;}to{opacity:1;}}"),
            "@keyframes spin{from{opacity:0;}to{opacity:1;}}"
        );
    }

    #[test]
    fn root_declarations_stay_bare() {
        assert_eq!(compile("color:red;margin:4px;"), "color:red;margin:4px;");
    }

    #[test]
    fn statements_and_comma_lists() {
        assert_eq!(compile("@layer a, b;.x,.y{&>i{top:0}}"), "@layer a, b;.x>i,.y>i{top:0;}");
    }

    #[test]
    fn strings_with_braces_are_opaque() {
        assert_eq!(compile(".a{content:\"{;}\";}"), ".a{content:\"{;}\";}");
    }

    #[test]
    fn stray_closing_brace_fails() {
        let err = NestingBackend.compile("a{color:red;}}").unwrap_err();
        assert_eq!(err.line, 0);
    }
}
