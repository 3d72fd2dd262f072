// Error types for style compilation and registration
use std::fmt;

/// Failure reported by the CSS backend while compiling raw CSS source
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl std::error::Error for BackendError {}

/// Failure reported by the document host while touching `<style>` elements
#[derive(Debug, Clone, PartialEq)]
pub struct HostError(pub String);

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Host error: {}", self.0)
    }
}

impl std::error::Error for HostError {}

#[derive(Debug)]
pub enum CssInJsError {
    /// The backend could not compile the generated CSS source
    Backend(BackendError),
    /// The document host refused an insertion
    Host(HostError),
    /// A cache slot held a value of the wrong kind for its namespace
    CacheMismatch(String),
}

impl fmt::Display for CssInJsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CssInJsError::Backend(err) => write!(f, "CSS backend error: {}", err),
            CssInJsError::Host(err) => write!(f, "{}", err),
            CssInJsError::CacheMismatch(key) => write!(f, "Unexpected cache value under key: {}", key),
        }
    }
}

impl std::error::Error for CssInJsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CssInJsError::Backend(err) => Some(err),
            CssInJsError::Host(err) => Some(err),
            CssInJsError::CacheMismatch(_) => None,
        }
    }
}

impl From<BackendError> for CssInJsError {
    fn from(err: BackendError) -> Self {
        CssInJsError::Backend(err)
    }
}

impl From<HostError> for CssInJsError {
    fn from(err: HostError) -> Self {
        CssInJsError::Host(err)
    }
}
