use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use derive_more::{Display, LowerHex, UpperHex};

use crate::Uid;

/// Number of characters in one line of an LCD 20x4 bricklet.
pub const LCD_COLUMNS: usize = 20;

/// Number of lines on an LCD 20x4 bricklet.
pub const LCD_LINES: usize = 4;

/// High-level representation of a command sent to a bricklet.
///
/// These are the only bus operations needed to drive the lamp and the display.
/// Each one is addressed to a single device by [`Uid`] and is freely convertible into
/// a wire [`Packet`](crate::Packet) once the bus has picked a sequence number for it.
///
/// # Examples
///
/// ```
/// use buildlamp_core::{Request, Uid};
///
/// let request = Request::SetRelayState(Uid(42), true, false);
/// assert_eq!(vec![1, 0], request.payload());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request<'a> {
    /// Switches both relays of a Dual Relay bricklet at once.
    SetRelayState(Uid, bool, bool),

    /// Sets one relay to the given state for a limited time, after which it flips back.
    SetMonoflop(Uid, Relay, bool, Duration),

    /// Writes text to an LCD 20x4 starting at the given line and position.
    WriteLine(Uid, Line, Position, Cow<'a, str>),

    /// Blanks every character of an LCD 20x4.
    ClearDisplay(Uid),

    /// Turns the LCD backlight on.
    BacklightOn(Uid),

    /// Turns the LCD backlight off.
    BacklightOff(Uid),
}

/// One of the two relays on a Dual Relay bricklet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Relay {
    /// Relay 1.
    One,
    /// Relay 2.
    Two,
}

impl Relay {
    /// The relay's number as the bricklet counts them.
    pub fn number(self) -> u8 {
        match self {
            Relay::One => 1,
            Relay::Two => 2,
        }
    }
}

/// A line index on the LCD (0 to 3).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, LowerHex, UpperHex)]
pub struct Line(pub u8);

/// A character position within an LCD line (0 to 19).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, LowerHex, UpperHex)]
pub struct Position(pub u8);

/// A bricklet function number, carried in every packet header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, LowerHex, UpperHex)]
pub struct FunctionId(pub u8);

impl FunctionId {
    /// Dual Relay: `set_state`.
    pub const RELAY_SET_STATE: FunctionId = FunctionId(1);
    /// Dual Relay: `set_monoflop`.
    pub const RELAY_SET_MONOFLOP: FunctionId = FunctionId(3);
    /// LCD 20x4: `write_line`.
    pub const LCD_WRITE_LINE: FunctionId = FunctionId(1);
    /// LCD 20x4: `clear_display`.
    pub const LCD_CLEAR_DISPLAY: FunctionId = FunctionId(2);
    /// LCD 20x4: `backlight_on`.
    pub const LCD_BACKLIGHT_ON: FunctionId = FunctionId(3);
    /// LCD 20x4: `backlight_off`.
    pub const LCD_BACKLIGHT_OFF: FunctionId = FunctionId(4);
}

impl Request<'_> {
    /// Returns the UID of the device this request is addressed to.
    pub fn uid(&self) -> Uid {
        match *self {
            Request::SetRelayState(uid, _, _)
            | Request::SetMonoflop(uid, _, _, _)
            | Request::WriteLine(uid, _, _, _)
            | Request::ClearDisplay(uid)
            | Request::BacklightOn(uid)
            | Request::BacklightOff(uid) => uid,
        }
    }

    /// Returns the bricklet function this request invokes.
    pub fn function_id(&self) -> FunctionId {
        match *self {
            Request::SetRelayState(..) => FunctionId::RELAY_SET_STATE,
            Request::SetMonoflop(..) => FunctionId::RELAY_SET_MONOFLOP,
            Request::WriteLine(..) => FunctionId::LCD_WRITE_LINE,
            Request::ClearDisplay(_) => FunctionId::LCD_CLEAR_DISPLAY,
            Request::BacklightOn(_) => FunctionId::LCD_BACKLIGHT_ON,
            Request::BacklightOff(_) => FunctionId::LCD_BACKLIGHT_OFF,
        }
    }

    /// Encodes the request's arguments as a little-endian packet payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use buildlamp_core::{Relay, Request, Uid};
    ///
    /// let request = Request::SetMonoflop(Uid(7), Relay::Two, true, Duration::from_millis(1000));
    /// assert_eq!(vec![2, 1, 0xE8, 0x03, 0x00, 0x00], request.payload());
    /// ```
    pub fn payload(&self) -> Vec<u8> {
        match *self {
            Request::SetRelayState(_, relay1, relay2) => vec![relay1 as u8, relay2 as u8],

            Request::SetMonoflop(_, relay, state, time) => {
                let millis = u32::try_from(time.as_millis()).unwrap_or(u32::MAX);
                let mut payload = Vec::with_capacity(6);
                payload.push(relay.number());
                payload.push(state as u8);
                payload.extend_from_slice(&millis.to_le_bytes());
                payload
            }

            Request::WriteLine(_, line, position, ref text) => {
                let mut payload = Vec::with_capacity(2 + LCD_COLUMNS);
                payload.push(line.0);
                payload.push(position.0);
                payload.extend_from_slice(&lcd_bytes(text));
                payload
            }

            Request::ClearDisplay(_) | Request::BacklightOn(_) | Request::BacklightOff(_) => vec![],
        }
    }
}

impl Display for Request<'_> {
    /// Provides a human-readable view of the request for bus traffic logs.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Request::SetRelayState(uid, relay1, relay2) => {
                write!(f, "[UID {}] <-- SetRelayState [{}, {}]", uid, relay1, relay2)
            }
            Request::SetMonoflop(uid, relay, state, time) => write!(
                f,
                "[UID {}] <-- SetMonoflop [Relay {}, {}, {} ms]",
                uid,
                relay.number(),
                state,
                time.as_millis()
            ),
            Request::WriteLine(uid, line, position, ref text) => {
                write!(f, "[UID {}] <-- WriteLine [{}:{}] {:?}", uid, line, position, text)
            }
            Request::ClearDisplay(uid) => write!(f, "[UID {}] <-- ClearDisplay", uid),
            Request::BacklightOn(uid) => write!(f, "[UID {}] <-- BacklightOn", uid),
            Request::BacklightOff(uid) => write!(f, "[UID {}] <-- BacklightOff", uid),
        }
    }
}

/// Converts text to the LCD's character ROM, truncated or NUL-padded to one full line.
///
/// Printable ASCII maps to itself except for `\` and `~`, which the ROM does not have.
/// A handful of Latin-1 characters common in names have ROM equivalents; everything
/// else is shown as a solid block.
pub fn lcd_bytes(text: &str) -> [u8; LCD_COLUMNS] {
    const BLOCK: u8 = 0xFF;

    let mut bytes = [0u8; LCD_COLUMNS];
    for (slot, character) in bytes.iter_mut().zip(text.chars()) {
        *slot = match character {
            '\\' | '~' => BLOCK,
            ' '..='}' => character as u8,
            'ä' | 'Ä' => 0xE1,
            'ß' => 0xE2,
            'ö' | 'Ö' => 0xEF,
            'ü' | 'Ü' => 0xF5,
            '°' => 0xDF,
            'µ' => 0xE4,
            _ => BLOCK,
        };
    }
    bytes
}
