// Scoping selectors with a hash class
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// How an injected hash class contributes to specificity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashPriority {
    /// Wrapped in `:where(...)`, adding no specificity
    Low,
    /// A bare class selector
    #[default]
    High,
}

/// Embed `.hash_id` into every comma-separated branch of `selector`.
///
/// The class goes right after a leading tag name (`div` -> `div.hash`) and before any
/// class, attribute or pseudo suffix of the first compound (`.foo` -> `.hash.foo`).
/// An empty hash leaves the selector untouched.
pub fn inject_selector_hash(selector: &str, hash_id: &str, priority: HashPriority) -> String {
    if hash_id.is_empty() {
        return selector.to_string();
    }

    let hash_class = format!(".{}", hash_id);
    let hash_selector = match priority {
        HashPriority::Low => format!(":where({})", hash_class),
        HashPriority::High => hash_class,
    };

    selector
        .split(',')
        .map(|branch| {
            let mut segments = branch.split_whitespace();
            let first = segments.next().unwrap_or("");
            let tag_len = first
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(first.len());
            let mut scoped = String::with_capacity(branch.len() + hash_selector.len());
            scoped.push_str(&first[..tag_len]);
            scoped.push_str(&hash_selector);
            scoped.push_str(&first[tag_len..]);
            for rest in segments {
                scoped.push(' ');
                scoped.push_str(rest);
            }
            scoped
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Split on `delimiter` outside of parentheses, brackets and quotes
pub fn split_top_level(text: &str, delimiter: char) -> SmallVec<[&str; 4]> {
    let mut parts = SmallVec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        match ch {
            '"' | '\'' if quote.is_none() => quote = Some(ch),
            ch if quote == Some(ch) => quote = None,
            _ if quote.is_some() => {}
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ch if ch == delimiter && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Resolve a nested rule prelude against its parent selectors.
///
/// `&` is replaced by each parent; other branches become descendants of each parent.
pub fn resolve_nested_selector(parents: &[String], prelude: &str) -> Vec<String> {
    let children: SmallVec<[&str; 4]> = split_top_level(prelude, ',')
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parents.is_empty() {
        return children.iter().map(|child| child.replace('&', "")).collect();
    }

    let mut resolved = Vec::with_capacity(parents.len() * children.len());
    for parent in parents {
        for child in &children {
            if child.contains('&') {
                resolved.push(child.replace('&', parent));
            } else {
                resolved.push(format!("{} {}", parent, child));
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_after_tag_name() {
        assert_eq!(inject_selector_hash("div", "abc", HashPriority::High), "div.abc");
        assert_eq!(inject_selector_hash("a:hover", "abc", HashPriority::High), "a.abc:hover");
    }

    #[test]
    fn injects_before_class_suffix() {
        assert_eq!(inject_selector_hash(".foo", "abc", HashPriority::High), ".abc.foo");
        assert_eq!(inject_selector_hash(".foo", "abc", HashPriority::Low), ":where(.abc).foo");
    }

    #[test]
    fn only_first_segment_of_each_branch_is_scoped() {
        assert_eq!(
            inject_selector_hash(".a .b, span > i", "h", HashPriority::High),
            ".h.a .b,span.h > i"
        );
    }

    #[test]
    fn empty_hash_is_a_no_op() {
        assert_eq!(inject_selector_hash(" .foo ", "", HashPriority::Low), " .foo ");
    }

    #[test]
    fn empty_selector_becomes_bare_hash() {
        assert_eq!(inject_selector_hash("", "abc", HashPriority::High), ".abc");
    }

    #[test]
    fn top_level_split_respects_parentheses() {
        let parts = split_top_level(":where(.a, .b), .c", ',');
        assert_eq!(parts.as_slice(), [":where(.a, .b)", " .c"]);
    }

    #[test]
    fn nested_selectors_resolve_against_parents() {
        let parents = vec![".a".to_string(), ".b".to_string()];
        assert_eq!(resolve_nested_selector(&parents, "&:hover"), [".a:hover", ".b:hover"]);
        assert_eq!(resolve_nested_selector(&parents, "span"), [".a span", ".b span"]);
        assert_eq!(resolve_nested_selector(&[], "&.x, y"), [".x", "y"]);
    }
}
