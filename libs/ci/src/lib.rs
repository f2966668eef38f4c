//! Build model, event subscriptions and a Travis CI client.
//!
//! The [`CiProvider`] trait is the seam between the lamp controller and a CI service.
//! [`TravisClient`] implements it against the Travis v3 API; events are delivered through a
//! [`Subscription`] that the consumer drains one at a time.
//!
//! # Examples
//!
//! ```no_run
//! use buildlamp_ci::{CiProvider, EventKind, Subscription, TravisClient, DEFAULT_API_URL};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #
//! let client = TravisClient::new(DEFAULT_API_URL, "secret-token")?;
//! let repository = client.find_repository("owner/project")?;
//!
//! let subscription = Subscription::new();
//! client.subscribe(&repository, &EventKind::ALL, subscription.publisher())?;
//! loop {
//!     let event = subscription.next_event()?;
//!     println!("{}", event);
//! }
//! #
//! # }
//! ```
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
mod event;
mod model;
mod provider;
mod subscription;
mod travis;
mod watch;

pub use self::errors::CiError;
pub use self::event::{Event, EventKind};
pub use self::model::{Build, BuildFilter, BuildId, BuildState, Color, Commit, Repository};
pub use self::provider::CiProvider;
pub use self::subscription::{Interrupter, Publisher, Subscription};
pub use self::travis::{TravisClient, DEFAULT_API_URL, DEFAULT_POLL_INTERVAL};
pub use self::watch::BuildWatcher;
