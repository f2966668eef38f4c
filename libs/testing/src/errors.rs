use thiserror::Error;

use buildlamp_core::Uid;

/// Errors produced by [`VirtualBrickBus`](crate::VirtualBrickBus).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VirtualBusError {
    /// No virtual device on the bus answers to this UID, or it can't handle the request.
    #[error("No virtual device {} can handle {}", uid, request)]
    UnknownDevice {
        /// The UID the request was addressed to.
        uid: Uid,

        /// The rejected request, as text.
        request: String,
    },

    /// The bus was disconnected before the request was made.
    #[error("Virtual bus is disconnected")]
    Disconnected,
}
