use thiserror::Error;

use crate::BuildId;

/// Errors related to talking to the CI provider.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CiError {
    /// The HTTP request failed or its body couldn't be decoded.
    #[error("Request to CI provider failed")]
    Http {
        /// The underlying HTTP client error.
        #[from]
        source: reqwest::Error,
    },

    /// The provider rejected the access token.
    #[error("CI provider rejected the access token")]
    Unauthorized,

    /// No repository with this slug is visible with the configured token.
    #[error("Repository {} not found", slug)]
    RepositoryNotFound {
        /// The slug that was looked up.
        slug: String,
    },

    /// No build with this id exists.
    #[error("Build {} not found", id)]
    BuildNotFound {
        /// The id that was looked up.
        id: BuildId,
    },

    /// The provider answered with an unexpected HTTP status.
    #[error("CI provider answered {} for {}", status, url)]
    Status {
        /// The HTTP status code.
        status: u16,

        /// The URL that was requested.
        url: String,
    },

    /// The provider's base URL couldn't be used to build request URLs.
    #[error("Invalid CI provider URL {:?}", url)]
    InvalidUrl {
        /// The configured URL.
        url: String,
    },

    /// An event name that isn't `build:started` or `build:finished`.
    #[error("Unknown event {:?}", name)]
    UnknownEvent {
        /// The name that was provided.
        name: String,
    },

    /// The background poller couldn't be started.
    #[error("Failed to start build poller")]
    Poller {
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// Listening was interrupted (e.g. by Ctrl-C).
    #[error("Interrupted while listening for build events")]
    Interrupted,

    /// The event source went away.
    #[error("Build event stream closed")]
    StreamClosed,
}
