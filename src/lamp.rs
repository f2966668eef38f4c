use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::ci::Color;
use crate::core::{BrickBus, Relay, Request, Uid};
use crate::DeviceError;

/// How long a blink keeps its relay switched.
pub const BLINK_DURATION: Duration = Duration::from_millis(1000);

/// The colors the lamp can show.
///
/// Converting from a string never fails: `"red"`, `"green"` and `"yellow"` map to their
/// variants and anything else means [`Off`](LampColor::Off).
///
/// # Examples
///
/// ```
/// use buildlamp::LampColor;
///
/// assert_eq!(LampColor::Green, LampColor::from("green"));
/// assert_eq!(LampColor::Off, LampColor::from("purple"));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LampColor {
    /// Relay 1 energised only.
    Red,
    /// Relay 2 energised only.
    Green,
    /// Neither relay energised.
    Yellow,
    /// Both relays energised.
    Off,
}

impl LampColor {
    /// Returns the relay states (relay 1, relay 2) that produce this color.
    pub fn relay_states(self) -> (bool, bool) {
        match self {
            LampColor::Red => (true, false),
            LampColor::Green => (false, true),
            LampColor::Yellow => (false, false),
            LampColor::Off => (true, true),
        }
    }

    /// Returns the color's name.
    pub fn as_str(self) -> &'static str {
        match self {
            LampColor::Red => "red",
            LampColor::Green => "green",
            LampColor::Yellow => "yellow",
            LampColor::Off => "off",
        }
    }
}

impl From<&str> for LampColor {
    fn from(name: &str) -> Self {
        match name {
            "red" => LampColor::Red,
            "green" => LampColor::Green,
            "yellow" => LampColor::Yellow,
            // Unrecognised names switch the lamp off rather than failing.
            _ => LampColor::Off,
        }
    }
}

impl From<Color> for LampColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Red => LampColor::Red,
            Color::Green => LampColor::Green,
            Color::Yellow => LampColor::Yellow,
        }
    }
}

impl Display for LampColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bicolor lamp wired to a Dual Relay bricklet.
///
/// The lamp is stateless: every call maps straight onto one relay request.
///
/// # Examples
///
/// ```no_run
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use buildlamp::{Lamp, TcpBrickBus};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// // The bus is shared with the display, so it must be wrapped in an Rc<RefCell>.
/// let bus = TcpBrickBus::connect("localhost", 4223)?;
/// let bus = Rc::new(RefCell::new(bus));
///
/// let lamp = Lamp::new(bus.clone(), "Cwx".parse()?);
/// lamp.set_color("red")?;
/// lamp.blink_green_once()?;
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Lamp {
    uid: Uid,
    bus: Rc<RefCell<dyn BrickBus>>,
}

impl Lamp {
    /// Creates a lamp driven by the relay bricklet `uid` on `bus`.
    pub fn new(bus: Rc<RefCell<dyn BrickBus>>, uid: Uid) -> Self {
        Lamp { uid, bus }
    }

    /// Returns the relay bricklet's UID.
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Switches the lamp to a color.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Bus`] if the relay request fails.
    pub fn set_color<C: Into<LampColor>>(&self, color: C) -> Result<(), DeviceError> {
        let color = color.into();
        debug!("Lamp {} -> {}", self.uid, color);
        let (relay1, relay2) = color.relay_states();
        self.send(Request::SetRelayState(self.uid, relay1, relay2))
    }

    /// Shows red.
    pub fn set_red(&self) -> Result<(), DeviceError> {
        self.set_color(LampColor::Red)
    }

    /// Shows green.
    pub fn set_green(&self) -> Result<(), DeviceError> {
        self.set_color(LampColor::Green)
    }

    /// Shows yellow.
    pub fn set_yellow(&self) -> Result<(), DeviceError> {
        self.set_color(LampColor::Yellow)
    }

    /// Turns the lamp off.
    pub fn off(&self) -> Result<(), DeviceError> {
        self.set_color(LampColor::Off)
    }

    /// Pulses relay 1 for [`BLINK_DURATION`]. The steady color is restored by the relay itself.
    pub fn blink_red_once(&self) -> Result<(), DeviceError> {
        self.send(Request::SetMonoflop(self.uid, Relay::One, true, BLINK_DURATION))
    }

    /// Pulses relay 2 for [`BLINK_DURATION`].
    pub fn blink_green_once(&self) -> Result<(), DeviceError> {
        self.send(Request::SetMonoflop(self.uid, Relay::Two, true, BLINK_DURATION))
    }

    fn send(&self, request: Request<'_>) -> Result<(), DeviceError> {
        let mut bus = self.bus.borrow_mut();
        Ok(bus.process_request(request)?)
    }
}
