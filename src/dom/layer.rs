// Memoized `@layer` capability check
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, LazyLock};

use super::host::StyleHost;

const UNKNOWN: u8 = 0;
const SUPPORTED: u8 = 1;
const UNSUPPORTED: u8 = 2;

const CHECK_CLASS: &str = "cssinjs-layer-check";
const CHECK_WIDTH: &str = "93px";

pub(crate) static GLOBAL_LAYER_SUPPORT: LazyLock<Arc<LayerSupport>> =
    LazyLock::new(|| Arc::new(LayerSupport::new()));

#[derive(Debug)]
pub struct LayerSupport {
    state: AtomicU8,
}

impl Default for LayerSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerSupport {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNKNOWN),
        }
    }

    /// A check whose answer is fixed, for hosts that know their capabilities
    pub fn forced(supported: bool) -> Self {
        let layers = Self::new();
        layers.store(supported);
        layers
    }

    /// The check shared by every context that does not bring its own
    pub fn global() -> Arc<LayerSupport> {
        Arc::clone(&GLOBAL_LAYER_SUPPORT)
    }

    fn store(&self, supported: bool) {
        let state = if supported { SUPPORTED } else { UNSUPPORTED };
        self.state.store(state, Ordering::Release);
    }

    /// Check once, then answer from memory. Without a document the answer is `false` and is
    /// not remembered.
    pub fn supported(&self, host: Option<&dyn StyleHost>) -> bool {
        match self.state.load(Ordering::Acquire) {
            SUPPORTED => return true,
            UNSUPPORTED => return false,
            _ => {}
        }

        let Some(host) = host else {
            return false;
        };

        let css = format!(
            "@layer {class} {{ .{class} {{ width: {width} !important; }} }}",
            class = CHECK_CLASS,
            width = CHECK_WIDTH
        );
        let supported = match host.computed_value_of(&css, CHECK_CLASS, "width") {
            Ok(width) => width == CHECK_WIDTH,
            Err(err) => {
                tracing::debug!("@layer check failed: {}", err);
                false
            }
        };
        self.store(supported);
        supported
    }

    pub fn reset(&self) {
        self.state.store(UNKNOWN, Ordering::Release);
    }
}
