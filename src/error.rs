pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fetch of {url} did not settle within {millis} ms")]
    Timeout { url: String, millis: u64 },

    #[error("fetch of {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("no candidate URL resolved {path}")]
    CandidatesExhausted { path: String },

    #[error("all index sources for scope '{scope}' failed")]
    ScopeExhausted { scope: String },

    #[error("all load tiers exhausted")]
    TiersExhausted,

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller can recover by advancing to the next candidate
    /// or fallback tier. Only full tier exhaustion is terminal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::TiersExhausted)
    }
}
