// Document integration: stylesheet insertion and capability probing
mod config;
mod host;
mod layer;
mod memory;

pub use self::config::{InsertOptions, Placement};
pub use self::host::StyleHost;
pub use self::layer::LayerSupport;
pub use self::memory::{MemoryHost, StyleElement};

/// Attribute holding a stylesheet's id
pub const ATTR_MARK: &str = "data-css-hash";
/// Attribute holding the token key a stylesheet was compiled for
pub const ATTR_TOKEN: &str = "data-token";
/// Development-only attribute holding the full cache path
pub const ATTR_CACHE_PATH: &str = "data-cache-path";

/// Container used when no attach target is configured
pub const DEFAULT_CONTAINER: &str = "head";
