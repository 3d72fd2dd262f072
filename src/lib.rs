// Runtime core for scoped CSS-in-JS stylesheets: compilation, caching, insertion and extraction
pub mod cache;
pub mod css;
pub mod dom;
pub mod engine;
pub mod error;
pub mod extract;
pub mod hash;
pub mod register;
pub mod token;

pub use crate::cache::{CacheEntity, EffectRegistry};
pub use crate::css::{parse_style, HashPriority, Interpolation, Keyframes, ParseConfig, StyleObject, StyleValue};
pub use crate::dom::{LayerSupport, MemoryHost, StyleHost};
pub use crate::engine::{StyleConfig, StyleContext};
pub use crate::error::CssInJsError;
pub use crate::extract::{extract_cache_path_map, extract_style, CachePathMap};
pub use crate::register::{register_style, RegisterInfo, StyleMarkup, StyleRegistration};
pub use crate::token::{register_token, TokenRegistration};
