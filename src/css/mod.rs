// Style descriptions and their compilation to CSS text
mod backend;
mod linter;
mod normalize;
mod parser;
mod selector;
mod transformer;
mod values;

pub use self::backend::{CssBackend, NestingBackend};
pub use self::linter::{
    default_linters, ContentQuotesLinter, HashedAnimationLinter, LegacyNotSelectorLinter, LintInfo, LintWarning,
    Linter, LogicalPropertiesLinter, NaNLinter, ParentSelectorLinter,
};
pub use self::normalize::{normalize_style, strip_order_markers};
pub use self::parser::{parse_style, EffectStyles, ParseConfig, ParseOutput};
pub use self::selector::{inject_selector_hash, resolve_nested_selector, split_top_level, HashPriority};
pub use self::transformer::{LegacyLogicalProperties, Transformer};
pub use self::values::{
    is_unitless, to_kebab_case, Interpolation, Keyframes, Literal, StyleObject, StyleValue, MULTI_VALUE, SKIP_CHECK,
    SKIP_CHECK_ALT,
};
