//! Mirrors the build status of a Travis CI branch onto Tinkerforge hardware.
//!
//! A bicolor lamp on a Dual Relay bricklet shows whether the branch is green, red or
//! building, and an LCD 20x4 bricklet shows who pushed what and how the build went.
//! Both are reached over the Tinkerforge TCP protocol, normally through `brickd`.
//!
//! # Examples
//!
//! ```no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use buildlamp::{Controller, Indicators, TcpBrickBus};
//! use buildlamp::ci::{CiProvider, Subscription, TravisClient, DEFAULT_API_URL};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #
//! // Set up bus. Because the bus is shared by the
//! // lamp and the display, it must be wrapped in an Rc<RefCell>.
//! let bus = TcpBrickBus::connect("localhost", 4223)?;
//! let bus = Rc::new(RefCell::new(bus));
//!
//! // Relay and LCD bricklets are addressed by their UIDs.
//! let indicators = Indicators::new(bus, "Cwx".parse()?, "SCT31".parse()?);
//! indicators.display().init()?;
//! indicators.lamp().set_color("yellow")?;
//!
//! // Follow a repository's master branch until interrupted.
//! let ci = TravisClient::new(DEFAULT_API_URL, "secret-token")?;
//! let repository = ci.find_repository("owner/project")?;
//! let mut controller = Controller::new(ci, indicators, repository, "master");
//! controller.run(Subscription::new())?;
//! #
//! # Ok(()) }
//! ```
//!
//! # Sub-crates
//!
//! In addition to the high-level API of [`Lamp`], [`Display`] and [`Controller`], several
//! lower-level components are provided that can be combined for more specialized use-cases.
//!
//! - [`buildlamp-core`] \(re-exported as `core`\) contains device UIDs, requests and the wire
//!   packet format, and is useful if you want to implement a custom [`BrickBus`].
//! - [`buildlamp-tcp`] \(re-exported as `tcp`\) contains [`TcpBrickBus`].
//! - [`buildlamp-ci`] \(re-exported as `ci`\) contains the build model, event subscriptions
//!   and the Travis CI client.
//! - [`buildlamp-testing`] contains a virtual bus and an in-memory CI provider for tests.
//!
//! [`buildlamp-core`]: ../buildlamp_core/index.html
//! [`buildlamp-tcp`]: ../buildlamp_tcp/index.html
//! [`buildlamp-ci`]: ../buildlamp_ci/index.html
//! [`buildlamp-testing`]: ../buildlamp_testing/index.html
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

pub use buildlamp_ci as ci;
pub use buildlamp_core as core;
pub use buildlamp_tcp as tcp;

mod config;
mod controller;
mod display;
mod errors;
mod lamp;

pub use self::config::{run_from_config, tracked_branch, Config, FALLBACK_BRANCH};
pub use self::controller::{Controller, Indicators};
pub use self::display::Display;
pub use self::errors::{ControllerError, DeviceError};
pub use self::lamp::{Lamp, LampColor, BLINK_DURATION};

pub use crate::core::{BrickBus, Uid};
pub use crate::tcp::TcpBrickBus;
