//! Common error types for playmix.

use thiserror::Error;

/// Common result type for playmix operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A paginated read failed. Nothing partial is ever returned.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Release-date cache could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A remote add/remove call failed. Batches already applied stay applied.
    #[error("playlist mutation failed: {0}")]
    Mutation(String),

    /// Missing or rejected access token.
    #[error("authentication: {0}")]
    Auth(String),

    /// Invalid job file or selection policy.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The remote API answered with something we could not make sense of.
    #[error("unexpected API response: {0}")]
    Api(String),
}
