//! Brick bus implementation that talks to a Tinkerforge brick daemon over TCP.
//!
//! For the basic task of showing build status, you likely want to use the high-level API
//! in the [`buildlamp`] crate instead, which takes any [`BrickBus`](buildlamp_core::BrickBus).
//!
//! # Examples
//!
//! ```no_run
//! use buildlamp_core::{BrickBus, Request};
//! use buildlamp_tcp::TcpBrickBus;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! #
//! let mut bus = TcpBrickBus::connect("localhost", 4223)?;
//! bus.process_request(Request::SetRelayState("Cwx".parse()?, true, true))?;
//! bus.disconnect()?;
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

mod errors;
mod tcp_brick_bus;
mod transport;

pub use self::errors::TcpBusError;
pub use self::tcp_brick_bus::{TcpBrickBus, DEFAULT_PORT, RESPONSE_TIMEOUT};
pub use self::transport::Transport;
