use thiserror::Error;

/// Failures reported by a page session backend
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to WebDriver at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("browser command failed: {0}")]
    Command(String),

    #[error("timed out after {waited_ms} ms waiting for `{locator}`")]
    Timeout { locator: String, waited_ms: u64 },

    #[error("session already closed")]
    Closed,
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}

/// Failures that abort a single search request
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("query parameter `q` must be a non-empty string")]
    InvalidQuery,

    #[error("could not build search URL: {0}")]
    InvalidUrl(String),

    #[error("could not open page session: {0}")]
    Session(#[source] SessionError),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("results never populated after {attempts} attempts")]
    ReadinessTimeout { attempts: u32 },

    #[error("could not read rendered markup: {0}")]
    Snapshot(#[source] SessionError),
}

impl PipelineError {
    /// Errors caused by the caller rather than the page or the browser
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::InvalidQuery)
    }
}

/// Reasons a single result item produced no candidate record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemSkip {
    #[error("sponsored listing")]
    Sponsored,

    #[error("malformed item: {0}")]
    Malformed(String),
}

/// Failures loading configuration or an overlay catalog
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid site origin `{0}`")]
    InvalidOrigin(String),
}
