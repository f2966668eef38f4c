//! Core types for driving Tinkerforge relay and LCD bricklets over a brick bus.
//!
//! For the basic task of showing build status, you likely want to use the high-level
//! `Lamp` and `Display` types in the [`buildlamp`] crate instead.
//!
//! `buildlamp_core` is useful for crates that want to provide their own [`BrickBus`]
//! implementations, or that need to look at the packets going over the wire.
//!
//! # Examples
//!
//! ```
//! use buildlamp_core::{Packet, Request, SequenceNumber, Uid};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #
//! let relay: Uid = "Cwx".parse()?;
//! let request = Request::SetRelayState(relay, false, true);
//! let packet = Packet::request(&request, SequenceNumber(1))?;
//! assert_eq!(10, packet.to_bytes().len());
//! #
//! # Ok(()) }
//! ```
//!
//! [`buildlamp`]: ../buildlamp/index.html
#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_docs,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

mod brick_bus;
mod packet;
mod request;
mod uid;

pub use self::brick_bus::BrickBus;
pub use self::packet::{ErrorCode, Packet, PacketError, SequenceNumber, HEADER_LENGTH, MAX_PACKET_LENGTH};
pub use self::request::{lcd_bytes, FunctionId, Line, Position, Relay, Request, LCD_COLUMNS, LCD_LINES};
pub use self::uid::{Uid, UidError};
