//! Crate-wide error type.
//!
//! Not-found conditions (an unknown timer id, a subscription that was never
//! made) are deliberately *not* errors: they surface as `bool` returns or
//! silent no-ops. Errors are reserved for misuse after teardown and for data
//! that could not be decoded.

/// Error returned by fallible framekit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event bus or component was already destroyed.
    #[error("used after destroy")]
    Disposed,
    /// A JSON configuration string could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// A stored value looked like JSON but did not parse.
    #[error("stored value for {key:?} is not valid JSON: {source}")]
    Storage {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// An asset request failed. Only ever handed to fetch completion callbacks.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Shorthand result alias.
pub type Result<T> = std::result::Result<T, Error>;
