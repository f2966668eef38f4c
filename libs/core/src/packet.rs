use std::fmt::{self, Display, Formatter};
use std::io::{Read, Write};

use derive_more::{Display, LowerHex, UpperHex};
use thiserror::Error;

use crate::{FunctionId, Request, Uid};

/// Length of the fixed packet header.
pub const HEADER_LENGTH: usize = 8;

/// Largest packet the bus accepts, header included.
pub const MAX_PACKET_LENGTH: usize = 80;

/// Errors related to reading/writing [`Packet`]s.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PacketError {
    /// Payload would make the packet longer than the bus allows.
    #[error("Maximum payload length is {} bytes, got {}", max, actual)]
    PayloadTooLong {
        /// The maximum payload length.
        max: usize,

        /// The actual length of the payload that was provided.
        actual: usize,
    },

    /// Failed reading/writing a [`Packet`].
    #[error("Failed reading/writing a packet")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Fewer bytes than a packet header were provided.
    #[error("Packet of {} bytes is shorter than the {}-byte header", actual, HEADER_LENGTH)]
    Truncated {
        /// The number of bytes that were provided.
        actual: usize,
    },

    /// The header's length field disagrees with the data.
    #[error("Packet declares a length of {} bytes but has {}", declared, actual)]
    LengthMismatch {
        /// The length declared in the header.
        declared: usize,

        /// The actual number of bytes.
        actual: usize,
    },
}

/// Sequence number used to pair a response with its request (1 to 15; 0 marks callbacks).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, LowerHex, UpperHex)]
pub struct SequenceNumber(pub u8);

impl SequenceNumber {
    /// Returns the number that follows this one, wrapping from 15 back to 1.
    pub fn next(self) -> Self {
        if self.0 >= 15 {
            SequenceNumber(1)
        } else {
            SequenceNumber(self.0 + 1)
        }
    }
}

/// Status reported by a device in the header of its response.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The call succeeded.
    Ok,
    /// The device rejected one of the arguments.
    InvalidParameter,
    /// The device doesn't implement the requested function.
    FunctionNotSupported,
    /// Any other code.
    Unknown,
}

impl ErrorCode {
    fn from_flags(flags: u8) -> Self {
        match flags >> 6 {
            0 => ErrorCode::Ok,
            1 => ErrorCode::InvalidParameter,
            2 => ErrorCode::FunctionNotSupported,
            _ => ErrorCode::Unknown,
        }
    }

    fn to_flags(self) -> u8 {
        let code = match self {
            ErrorCode::Ok => 0,
            ErrorCode::InvalidParameter => 1,
            ErrorCode::FunctionNotSupported => 2,
            ErrorCode::Unknown => 3,
        };
        code << 6
    }
}

/// A low-level packet on the brick bus.
///
/// Handles the header layout and length bookkeeping. It makes no attempt to ascribe
/// meaning to the function and payload (that's [`Request`]'s job).
///
/// # Examples
///
/// ```
/// use buildlamp_core::{Packet, Request, SequenceNumber, Uid};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let request = Request::SetRelayState(Uid(0x0102_0304), true, false);
/// let packet = Packet::request(&request, SequenceNumber(1))?;
///
/// let bytes = packet.to_bytes();
/// assert_eq!(&[0x04, 0x03, 0x02, 0x01, 10, 1, 0x18, 0, 1, 0], bytes.as_slice());
///
/// let parsed = Packet::from_bytes(&bytes)?;
/// assert_eq!(parsed, packet);
/// #
/// # Ok(()) }
/// ```
///
/// # Format Details
///
/// ```text
/// ┌────┬────┬────┬────┬────┬────┬────┬────┬────┬ ┄ ┬────┐
/// │        UID        │ Len│ Fn │ Seq│ Flg│ P0 │...│ PN │
/// └────┴────┴────┴────┴────┴────┴────┴────┴────┴ ┄ ┴────┘
/// ```
///
/// `Len` counts the whole packet including the header. `Seq` holds the sequence number in
/// its upper nibble and the "response expected" bit at `0x08`. The top two bits of `Flg`
/// carry the device's [`ErrorCode`] in responses. All multi-byte values are little-endian.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Packet {
    uid: Uid,
    function_id: FunctionId,
    sequence: SequenceNumber,
    response_expected: bool,
    error_code: ErrorCode,
    payload: Vec<u8>,
}

impl Packet {
    /// Constructs a new `Packet`.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::PayloadTooLong`] if the payload doesn't fit in one packet.
    pub fn new(
        uid: Uid,
        function_id: FunctionId,
        sequence: SequenceNumber,
        response_expected: bool,
        payload: Vec<u8>,
    ) -> Result<Self, PacketError> {
        let max = MAX_PACKET_LENGTH - HEADER_LENGTH;
        if payload.len() > max {
            return Err(PacketError::PayloadTooLong {
                max,
                actual: payload.len(),
            });
        }

        Ok(Packet {
            uid,
            function_id,
            sequence,
            response_expected,
            error_code: ErrorCode::Ok,
            payload,
        })
    }

    /// Builds the packet for a [`Request`], asking the device to acknowledge it.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::PayloadTooLong`] if the payload doesn't fit in one packet.
    pub fn request(request: &Request<'_>, sequence: SequenceNumber) -> Result<Self, PacketError> {
        Packet::new(request.uid(), request.function_id(), sequence, true, request.payload())
    }

    /// Returns a copy of this packet as the device's empty acknowledgement with the given status.
    pub fn response(&self, error_code: ErrorCode) -> Self {
        Packet {
            uid: self.uid,
            function_id: self.function_id,
            sequence: self.sequence,
            response_expected: self.response_expected,
            error_code,
            payload: vec![],
        }
    }

    /// Returns the UID of the device the packet is addressed to (or sent from).
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Returns the function the packet invokes.
    pub fn function_id(&self) -> FunctionId {
        self.function_id
    }

    /// Returns the packet's sequence number.
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    /// Returns whether the sender wants an acknowledgement.
    pub fn response_expected(&self) -> bool {
        self.response_expected
    }

    /// Returns the status a device reported in a response.
    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Returns the payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns whether `other` is the response to this packet.
    pub fn is_answered_by(&self, other: &Packet) -> bool {
        self.uid == other.uid && self.function_id == other.function_id && self.sequence == other.sequence
    }

    /// Converts the packet to its wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let length = HEADER_LENGTH + self.payload.len();
        let mut output = Vec::<u8>::with_capacity(length);
        output.extend_from_slice(&self.uid.0.to_le_bytes());
        output.push(length as u8);
        output.push(self.function_id.0);
        output.push((self.sequence.0 << 4) | if self.response_expected { 0x08 } else { 0 });
        output.push(self.error_code.to_flags());
        output.extend_from_slice(&self.payload);
        assert_eq!(output.len(), output.capacity());
        output
    }

    /// Parses the wire format into a new `Packet`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`PacketError::Truncated`] if there are fewer bytes than a header.
    /// * [`PacketError::LengthMismatch`] if the declared length doesn't match the data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < HEADER_LENGTH {
            return Err(PacketError::Truncated { actual: bytes.len() });
        }

        let declared = bytes[4] as usize;
        if declared != bytes.len() || declared > MAX_PACKET_LENGTH {
            return Err(PacketError::LengthMismatch {
                declared,
                actual: bytes.len(),
            });
        }

        Ok(Packet {
            uid: Uid(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            function_id: FunctionId(bytes[5]),
            sequence: SequenceNumber(bytes[6] >> 4),
            response_expected: bytes[6] & 0x08 != 0,
            error_code: ErrorCode::from_flags(bytes[7]),
            payload: bytes[HEADER_LENGTH..].to_vec(),
        })
    }

    /// Writes the byte representation of the packet to a writer.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Io`] if the write fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), PacketError> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Reads exactly one packet from the reader.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`PacketError::Io`] if the read fails (including timeouts).
    /// * [`PacketError::LengthMismatch`] if the header declares an impossible length.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, PacketError> {
        let mut header = [0u8; HEADER_LENGTH];
        reader.read_exact(&mut header)?;

        let declared = header[4] as usize;
        if !(HEADER_LENGTH..=MAX_PACKET_LENGTH).contains(&declared) {
            return Err(PacketError::LengthMismatch {
                declared,
                actual: HEADER_LENGTH,
            });
        }

        let mut bytes = header.to_vec();
        bytes.resize(declared, 0);
        reader.read_exact(&mut bytes[HEADER_LENGTH..])?;
        Packet::from_bytes(&bytes)
    }
}

impl Display for Packet {
    /// Formats the packet in a human-readable way for bus traffic logs.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fn {:02X} | UID {} | Seq {}",
            self.function_id.0, self.uid, self.sequence.0
        )?;
        if self.error_code != ErrorCode::Ok {
            write!(f, " | {:?}", self.error_code)?;
        }
        if !self.payload.is_empty() {
            write!(f, " | Data ")?;
            for byte in &self.payload {
                write!(f, "{:02X} ", byte)?;
            }
        }
        Ok(())
    }
}
