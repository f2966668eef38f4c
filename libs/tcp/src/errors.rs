use thiserror::Error;

use buildlamp_core::{ErrorCode, FunctionId, PacketError, Uid};

/// Errors related to talking to bricklets over TCP.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TcpBusError {
    /// Could not open the connection to the brick daemon.
    #[error("Couldn't connect to brick daemon at {}:{}", host, port)]
    Connect {
        /// Host that was dialled.
        host: String,

        /// Port that was dialled.
        port: u16,

        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to send or receive a packet.
    #[error("Failed to exchange a packet with the brick daemon")]
    Packet {
        /// The underlying packet error.
        #[from]
        source: PacketError,
    },

    /// No acknowledgement arrived in time, which usually means nothing on the bus has this UID.
    #[error("No response from device {} to function {}", uid, function_id)]
    Timeout {
        /// The device the request was addressed to.
        uid: Uid,

        /// The function that was invoked.
        function_id: FunctionId,
    },

    /// The device answered with a non-zero error code.
    #[error("Device {} rejected function {}: {:?}", uid, function_id, code)]
    Device {
        /// The device that rejected the request.
        uid: Uid,

        /// The function that was invoked.
        function_id: FunctionId,

        /// The status the device reported.
        code: ErrorCode,
    },

    /// The bus was already disconnected.
    #[error("Brick bus is disconnected")]
    Disconnected,
}
