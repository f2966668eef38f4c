use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use derive_more::{LowerHex, UpperHex};
use thiserror::Error;

/// Base58 alphabet used by Tinkerforge for device UIDs (no `0`, `I`, `O` or `l`).
const ALPHABET: &[u8; 58] = b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Errors related to parsing [`Uid`]s.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UidError {
    /// The UID string was empty.
    #[error("Device UID must not be empty")]
    Empty,

    /// The UID contained a character outside the base58 alphabet.
    #[error("Invalid character {:?} in device UID {:?}", character, uid)]
    InvalidCharacter {
        /// The full UID string that was provided.
        uid: String,

        /// The offending character.
        character: char,
    },

    /// The UID decoded to a value wider than 64 bits.
    #[error("Device UID {:?} is too large", uid)]
    Overflow {
        /// The full UID string that was provided.
        uid: String,
    },
}

/// The identifier of a bricklet on the bus.
///
/// Tinkerforge prints UIDs as short base58 strings (e.g. `"Cwx"`); on the wire they are a
/// little-endian `u32`. Parsing accepts the printed form and folds legacy 64-bit UIDs down
/// to 32 bits the same way the device firmware does.
///
/// # Examples
///
/// ```
/// use buildlamp_core::Uid;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let uid: Uid = "21".parse()?;
/// assert_eq!(Uid(58), uid);
/// assert_eq!("21", uid.to_string());
/// #
/// # Ok(()) }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, LowerHex, UpperHex)]
pub struct Uid(pub u32);

impl FromStr for Uid {
    type Err = UidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(UidError::Empty);
        }

        let mut value: u64 = 0;
        for character in s.chars() {
            let digit = ALPHABET
                .iter()
                .position(|&c| char::from(c) == character)
                .ok_or_else(|| UidError::InvalidCharacter {
                    uid: s.to_owned(),
                    character,
                })?;
            value = value
                .checked_mul(58)
                .and_then(|v| v.checked_add(digit as u64))
                .ok_or_else(|| UidError::Overflow { uid: s.to_owned() })?;
        }

        Ok(Uid(fold_to_u32(value)))
    }
}

impl Display for Uid {
    /// Formats the UID in its base58 form.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        if value == 0 {
            return f.write_str("1");
        }

        let mut digits = Vec::with_capacity(6);
        while value > 0 {
            digits.push(ALPHABET[(value % 58) as usize]);
            value /= 58;
        }
        digits.reverse();

        // Alphabet is pure ASCII.
        f.write_str(std::str::from_utf8(&digits).map_err(|_| fmt::Error)?)
    }
}

/// Squeezes a 64-bit UID into the 32 bits that fit in a packet header.
///
/// Values that already fit are returned unchanged.
fn fold_to_u32(uid: u64) -> u32 {
    if uid <= u64::from(u32::MAX) {
        return uid as u32;
    }

    let low = uid & 0xFFFF_FFFF;
    let high = uid >> 32;

    let mut folded = low & 0x0000_0FFF;
    folded |= (low & 0x0F00_0000) >> 12;
    folded |= (high & 0x0000_003F) << 16;
    folded |= (high & 0x000F_0000) << 6;
    folded |= (high & 0x3F00_0000) << 2;
    folded as u32
}
