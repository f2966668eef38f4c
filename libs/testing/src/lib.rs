//! Tools for testing buildlamp without hardware or network access.
//!
//! For driving real devices, you want the [`buildlamp`] crate instead.
//!
//! [`VirtualBrickBus`] is a mock bus with any number of virtual relay and LCD bricklets
//! attached, and [`FakeCi`] is an in-memory [`CiProvider`](buildlamp_ci::CiProvider)
//! with scripted events. Together they let the whole controller run in a unit test.
//!
//! # Examples
//!
//! ```
//! use buildlamp_core::{BrickBus, Request, Uid};
//! use buildlamp_testing::{VirtualBrickBus, VirtualLcd, VirtualRelay};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! #
//! let mut bus = VirtualBrickBus::new(vec![VirtualRelay::new(Uid(1))], vec![VirtualLcd::new(Uid(2))]);
//! bus.process_request(Request::BacklightOn(Uid(2)))?;
//! assert!(bus.lcd(0).is_backlight_on());
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
mod fake_ci;
mod virtual_brick_bus;

pub use self::errors::VirtualBusError;
pub use self::fake_ci::{build, event, repository, FakeCi};
pub use self::virtual_brick_bus::{VirtualBrickBus, VirtualLcd, VirtualRelay};
