use std::error::Error;
use std::fmt::{self, Debug, Formatter};

use crate::Request;

/// Abstraction over a bus of bricklets that accept [`Request`]s.
///
/// Typically `TcpBrickBus` from [`buildlamp-tcp`] or `VirtualBrickBus` from [`buildlamp-testing`]
/// are sufficient, and you do not need to implement this yourself.
///
/// # Examples
///
/// Implementing a custom bus:
///
/// ```
/// use std::error::Error;
/// use buildlamp_core::{BrickBus, Request};
///
/// struct PrintingBrickBus {}
///
/// impl BrickBus for PrintingBrickBus {
///     fn process_request(&mut self, request: Request<'_>) -> Result<(), Box<dyn Error + Send + Sync>> {
///         println!("{}", request);
///         Ok(())
///     }
///
///     fn disconnect(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
///         Ok(())
///     }
/// }
/// ```
///
/// [`buildlamp-tcp`]: ../buildlamp_tcp/index.html
/// [`buildlamp-testing`]: ../buildlamp_testing/index.html
pub trait BrickBus {
    /// Delivers a request to the addressed device and waits until it has been carried out.
    fn process_request(&mut self, request: Request<'_>) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Closes the connection to the bus. Further requests are expected to fail.
    fn disconnect(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;
}

// Provide a Debug representation so types that contain trait objects can derive Debug.
impl Debug for dyn BrickBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<BrickBus trait>")
    }
}
