//! Error types for the storefront client.

/// Errors that can occur when fetching storefront pages.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
    /// A URL could not be parsed or resolved against the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// A network error, timeout, or unreadable body.
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// The storefront answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },
    /// Every attempt of the retry budget failed.
    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<Error>,
    },
}

impl Error {
    /// Whether another attempt at the same URL may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::HttpStatus { .. })
    }
}
