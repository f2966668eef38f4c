use thiserror::Error;

use crate::ci::CiError;
use crate::tcp::TcpBusError;

/// Errors related to the [`Lamp`](crate::Lamp) and [`Display`](crate::Display).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeviceError {
    /// The brick bus failed to process a request.
    #[error("Brick bus failed to process request")]
    Bus {
        /// The underlying bus error.
        #[from]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A build lacks the timestamp needed to render it.
    #[error("Build #{} has no {} time", number, field)]
    MissingTimestamp {
        /// The build's number.
        number: String,

        /// Which timestamp was missing (`started` or `finished`).
        field: &'static str,
    },
}

/// Errors that stop the [`Controller`](crate::Controller).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    /// Couldn't connect to the brick daemon.
    #[error("Failed to connect to the brick daemon")]
    Connect {
        /// The underlying connection error.
        #[from]
        source: TcpBusError,
    },

    /// Updating the lamp or display failed.
    #[error("Failed to update indicators")]
    Device {
        /// The underlying device error.
        #[from]
        source: DeviceError,
    },

    /// Talking to the CI provider failed, or listening for events stopped.
    #[error("CI provider failed")]
    Ci {
        /// The underlying CI error.
        #[from]
        source: CiError,
    },

    /// The tracked branch has no running or finished build to show.
    #[error("No running or finished builds on branch {}", branch)]
    NoBuilds {
        /// The tracked branch.
        branch: String,
    },
}
