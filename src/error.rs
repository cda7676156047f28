//! Unified error type.

use thiserror::Error;

/// The error type returned by fallible operations in this crate.
///
/// Application-level errors (401, 404, 422, …) are expressed as
/// [`Response`](crate::Response) values, not as `Error`s. This type covers
/// setup and infrastructure failures: a route the matcher refuses, or a
/// socket that cannot be bound.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A pattern or group prefix that is neither empty nor starts with
    /// `/`, or an empty pattern with no prefix to mount at.
    #[error("invalid pattern `{pattern}`: must start with `/`")]
    Pattern { pattern: String },

    /// The matcher rejected a registration (conflict with an existing
    /// route, or a malformed pattern).
    #[error("invalid route `{path}`: {source}")]
    Route {
        path: String,
        #[source]
        source: matchit::InsertError,
    },
}
