use std::error::Error;
use std::io;
use std::net::TcpStream;
use std::time::Duration;

use log::debug;

use buildlamp_core::{BrickBus, ErrorCode, Packet, PacketError, Request, SequenceNumber};

use crate::{TcpBusError, Transport};

/// Port the brick daemon listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 4223;

/// How long to wait for a device to acknowledge a request.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(2500);

/// An implementation of `BrickBus` that talks to a brick daemon (or a Master Brick with
/// an Ethernet/WIFI extension) over TCP.
///
/// Every request is sent with the "response expected" flag set and waits for the matching
/// acknowledgement, so a wrong UID or a rejected argument surfaces as an error instead of
/// being silently dropped. Packets that don't answer the outstanding request (callbacks,
/// enumeration broadcasts) are skipped.
///
/// Requests and replies are logged using the [`log`] crate for debugging purposes. Run the
/// binary with `RUST_LOG=debug` to watch the bus traffic go by.
///
/// # Examples
///
/// ```no_run
/// use buildlamp_tcp::TcpBrickBus;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let bus = TcpBrickBus::connect("localhost", 4223)?;
/// // Can now hand the bus to a Lamp and a Display.
/// #
/// # Ok(()) }
/// ```
///
/// [`log`]: https://crates.io/crates/log
#[derive(Debug)]
pub struct TcpBrickBus<T: Transport = TcpStream> {
    transport: Option<T>,
    sequence: SequenceNumber,
}

impl TcpBrickBus<TcpStream> {
    /// Opens a connection to the brick daemon at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`TcpBusError::Connect`] if the connection cannot be established or configured.
    pub fn connect(host: &str, port: u16) -> Result<Self, TcpBusError> {
        let connect_error = |source| TcpBusError::Connect {
            host: host.to_owned(),
            port,
            source,
        };

        let stream = TcpStream::connect((host, port)).map_err(connect_error)?;
        stream.set_read_timeout(Some(RESPONSE_TIMEOUT)).map_err(connect_error)?;
        stream.set_nodelay(true).map_err(connect_error)?;

        debug!("Connected to brick daemon at {}:{}", host, port);
        Ok(TcpBrickBus::new(stream))
    }
}

impl<T: Transport> TcpBrickBus<T> {
    /// Creates a new `TcpBrickBus` over an already-open transport.
    ///
    /// Reads from the transport are expected to time out rather than block forever.
    pub fn new(transport: T) -> Self {
        TcpBrickBus {
            transport: Some(transport),
            sequence: SequenceNumber(0),
        }
    }

    /// Returns whether [`disconnect`](BrickBus::disconnect) has been called.
    pub fn is_disconnected(&self) -> bool {
        self.transport.is_none()
    }

    /// Sends the request and waits for the device's acknowledgement.
    fn exchange(&mut self, request: &Request<'_>) -> Result<(), TcpBusError> {
        let transport = self.transport.as_mut().ok_or(TcpBusError::Disconnected)?;

        self.sequence = self.sequence.next();
        let packet = Packet::request(request, self.sequence)?;
        packet.write(transport)?;

        loop {
            let reply = match Packet::read(transport) {
                Ok(reply) => reply,
                Err(PacketError::Io { ref source }) if is_timeout(source) => {
                    return Err(TcpBusError::Timeout {
                        uid: packet.uid(),
                        function_id: packet.function_id(),
                    });
                }
                Err(e) => return Err(e.into()),
            };

            if !packet.is_answered_by(&reply) {
                debug!(" Skipping unrelated packet: {}", reply);
                continue;
            }

            debug!(" Device reply: {}", reply);
            return match reply.error_code() {
                ErrorCode::Ok => Ok(()),
                code => Err(TcpBusError::Device {
                    uid: reply.uid(),
                    function_id: reply.function_id(),
                    code,
                }),
            };
        }
    }
}

impl<T: Transport> BrickBus for TcpBrickBus<T> {
    /// Handles a request by writing it to the transport and waiting for the acknowledgement.
    fn process_request(&mut self, request: Request<'_>) -> Result<(), Box<dyn Error + Send + Sync>> {
        debug!("Bus request: {}", request);
        Ok(self.exchange(&request)?)
    }

    /// Shuts the transport down. Calling this more than once is harmless.
    fn disconnect(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(mut transport) = self.transport.take() {
            debug!("Disconnecting from brick daemon");
            if let Err(e) = transport.shutdown() {
                // The daemon may already have closed its end.
                if e.kind() != io::ErrorKind::NotConnected {
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}

/// Determines whether a read failed because the device never answered.
fn is_timeout(error: &io::Error) -> bool {
    matches!(error.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(io::ErrorKind::WouldBlock, true ; "unix read timeout")]
    #[test_case(io::ErrorKind::TimedOut, true ; "windows read timeout")]
    #[test_case(io::ErrorKind::UnexpectedEof, false ; "closed stream")]
    #[test_case(io::ErrorKind::ConnectionReset, false ; "reset")]
    fn timeout_kinds(kind: io::ErrorKind, expected: bool) {
        assert_eq!(expected, is_timeout(&io::Error::new(kind, "dummy")));
    }
}
