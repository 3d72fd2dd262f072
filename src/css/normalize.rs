// Text normalization through the CSS backend
use super::backend::CssBackend;
use crate::error::BackendError;

/// Run compiled text through the backend, then collapse the layer-ordering marker.
///
/// A layer ordering prefix is compiled as `@layer a,b{%%%:%}`, which the backend emits as
/// `@layer a,b{%%%:%;}`; the marker block is rewritten to `;` giving `@layer a,b;`.
pub fn normalize_style(backend: &dyn CssBackend, compiled: &str) -> Result<String, BackendError> {
    let serialized = backend.compile(compiled)?;
    Ok(strip_order_markers(&serialized))
}

const MARKER_OPEN: &str = "{%%%:";

/// Replace every `{%%%:<c>;}` (one non-`;` character) with `;`
pub fn strip_order_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(index) = rest.find(MARKER_OPEN) {
        let after = &rest[index + MARKER_OPEN.len()..];
        let mut chars = after.chars();
        match (chars.next(), chars.as_str().strip_prefix(";}")) {
            (Some(c), Some(tail)) if c != ';' => {
                out.push_str(&rest[..index]);
                out.push(';');
                rest = tail;
            }
            _ => {
                out.push_str(&rest[..index + MARKER_OPEN.len()]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
