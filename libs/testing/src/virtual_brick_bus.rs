use std::time::Duration;

use log::debug;

use buildlamp_core::{BrickBus, Relay, Request, Uid, LCD_COLUMNS, LCD_LINES};

use crate::VirtualBusError;

/// Mock implementation of a bus with Dual Relay and LCD 20x4 bricklets attached.
///
/// Requests are forwarded to each virtual device in turn until one of them handles it;
/// a request nobody handles is an error, which mirrors a real bus timing out on a wrong UID.
/// After [`disconnect`](BrickBus::disconnect) every request fails.
///
/// Requests are logged using the [`log`] crate, so running tests with `RUST_LOG=debug`
/// shows them go by.
///
/// # Examples
///
/// ```
/// use buildlamp_core::{BrickBus, Request, Uid};
/// use buildlamp_testing::{VirtualBrickBus, VirtualLcd, VirtualRelay};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// #
/// let mut bus = VirtualBrickBus::new(vec![VirtualRelay::new(Uid(1))], vec![VirtualLcd::new(Uid(2))]);
/// bus.process_request(Request::SetRelayState(Uid(1), true, false))?;
/// assert_eq!((true, false), bus.relay(0).state());
/// #
/// # Ok(()) }
/// ```
///
/// [`log`]: https://crates.io/crates/log
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualBrickBus {
    relays: Vec<VirtualRelay>,
    lcds: Vec<VirtualLcd>,
    connected: bool,
    requests: usize,
}

impl VirtualBrickBus {
    /// Creates a new `VirtualBrickBus` with the specified virtual devices.
    pub fn new<R, L>(relays: R, lcds: L) -> Self
    where
        R: IntoIterator<Item = VirtualRelay>,
        L: IntoIterator<Item = VirtualLcd>,
    {
        VirtualBrickBus {
            relays: relays.into_iter().collect(),
            lcds: lcds.into_iter().collect(),
            connected: true,
            requests: 0,
        }
    }

    /// Returns the [`VirtualRelay`] at `index`, in the order passed to `new`.
    pub fn relay(&self, index: usize) -> &VirtualRelay {
        &self.relays[index]
    }

    /// Returns the [`VirtualLcd`] at `index`, in the order passed to `new`.
    pub fn lcd(&self, index: usize) -> &VirtualLcd {
        &self.lcds[index]
    }

    /// Returns whether [`disconnect`](BrickBus::disconnect) has not been called yet.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns how many requests were handled successfully.
    pub fn request_count(&self) -> usize {
        self.requests
    }
}

impl BrickBus for VirtualBrickBus {
    fn process_request(&mut self, request: Request<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!("Bus request: {}", request);
        if !self.connected {
            return Err(VirtualBusError::Disconnected.into());
        }

        let handled = self.relays.iter_mut().any(|relay| relay.process_request(&request))
            || self.lcds.iter_mut().any(|lcd| lcd.process_request(&request));
        if !handled {
            return Err(VirtualBusError::UnknownDevice {
                uid: request.uid(),
                request: request.to_string(),
            }
            .into());
        }

        self.requests += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!("Virtual bus disconnected");
        self.connected = false;
        Ok(())
    }
}

/// Mock Dual Relay bricklet.
///
/// Tracks the steady state of both relays and records monoflop pulses separately,
/// since a pulse reverts on its own and leaves the steady state alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualRelay {
    uid: Uid,
    state: (bool, bool),
    pulses: Vec<(Relay, bool, Duration)>,
}

impl VirtualRelay {
    /// Creates a relay bricklet with both relays off.
    pub fn new(uid: Uid) -> Self {
        VirtualRelay {
            uid,
            state: (false, false),
            pulses: vec![],
        }
    }

    /// Returns the relay's UID.
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Returns the steady state of relays 1 and 2.
    pub fn state(&self) -> (bool, bool) {
        self.state
    }

    /// Returns every monoflop pulse requested so far, oldest first.
    pub fn pulses(&self) -> &[(Relay, bool, Duration)] {
        &self.pulses
    }

    /// Applies a request addressed to this relay. Returns `false` if it isn't ours.
    pub fn process_request(&mut self, request: &Request<'_>) -> bool {
        match *request {
            Request::SetRelayState(uid, relay1, relay2) if uid == self.uid => {
                self.state = (relay1, relay2);
                true
            }
            Request::SetMonoflop(uid, relay, state, duration) if uid == self.uid => {
                self.pulses.push((relay, state, duration));
                true
            }
            _ => false,
        }
    }
}

/// Mock LCD 20x4 bricklet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualLcd {
    uid: Uid,
    rows: Vec<Vec<char>>,
    backlight: bool,
    clears: usize,
}

impl VirtualLcd {
    /// Creates a blank display with the backlight off.
    pub fn new(uid: Uid) -> Self {
        VirtualLcd {
            uid,
            rows: vec![vec![' '; LCD_COLUMNS]; LCD_LINES],
            backlight: false,
            clears: 0,
        }
    }

    /// Returns the display's UID.
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Returns the 20 characters currently shown on `line`.
    pub fn line(&self, line: usize) -> String {
        self.rows[line].iter().collect()
    }

    /// Returns all four lines.
    pub fn lines(&self) -> Vec<String> {
        (0..LCD_LINES).map(|line| self.line(line)).collect()
    }

    /// Returns whether the backlight is on.
    pub fn is_backlight_on(&self) -> bool {
        self.backlight
    }

    /// Returns how many times the display was cleared.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Applies a request addressed to this display. Returns `false` if it isn't ours.
    pub fn process_request(&mut self, request: &Request<'_>) -> bool {
        match *request {
            Request::WriteLine(uid, line, position, ref text) if uid == self.uid => {
                if let Some(row) = self.rows.get_mut(usize::from(line.0)) {
                    let start = usize::from(position.0).min(LCD_COLUMNS);
                    for (cell, c) in row[start..].iter_mut().zip(text.chars()) {
                        *cell = c;
                    }
                }
                true
            }
            Request::ClearDisplay(uid) if uid == self.uid => {
                for row in &mut self.rows {
                    row.iter_mut().for_each(|cell| *cell = ' ');
                }
                self.clears += 1;
                true
            }
            Request::BacklightOn(uid) if uid == self.uid => {
                self.backlight = true;
                true
            }
            Request::BacklightOff(uid) if uid == self.uid => {
                self.backlight = false;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildlamp_core::{Line, Position};

    fn bus() -> VirtualBrickBus {
        VirtualBrickBus::new(vec![VirtualRelay::new(Uid(10))], vec![VirtualLcd::new(Uid(20))])
    }

    #[test]
    fn monoflop_leaves_steady_state() {
        let mut bus = bus();
        bus.process_request(Request::SetRelayState(Uid(10), false, true)).unwrap();
        bus.process_request(Request::SetMonoflop(Uid(10), Relay::Two, true, Duration::from_secs(1)))
            .unwrap();

        assert_eq!((false, true), bus.relay(0).state());
        assert_eq!(&[(Relay::Two, true, Duration::from_secs(1))], bus.relay(0).pulses());
    }

    #[test]
    fn write_line_overwrites_from_position() {
        let mut bus = bus();
        bus.process_request(Request::WriteLine(Uid(20), Line(1), Position(0), "hello".into()))
            .unwrap();
        bus.process_request(Request::WriteLine(Uid(20), Line(1), Position(3), "p me".into()))
            .unwrap();
        assert_eq!("help me             ", bus.lcd(0).line(1));
    }

    #[test]
    fn write_line_clipped_to_width() {
        let mut bus = bus();
        bus.process_request(Request::WriteLine(Uid(20), Line(3), Position(18), "abcdef".into()))
            .unwrap();
        assert_eq!(20, bus.lcd(0).line(3).chars().count());
        assert!(bus.lcd(0).line(3).ends_with("ab"));
    }

    #[test]
    fn clear_blanks_every_line() {
        let mut bus = bus();
        bus.process_request(Request::WriteLine(Uid(20), Line(0), Position(0), "x".into()))
            .unwrap();
        bus.process_request(Request::ClearDisplay(Uid(20))).unwrap();
        assert!(bus.lcd(0).lines().iter().all(|line| line.trim().is_empty()));
        assert_eq!(1, bus.lcd(0).clear_count());
    }

    #[test]
    fn relay_requests_not_handled_by_lcd() {
        let mut bus = bus();
        let error = bus.process_request(Request::SetRelayState(Uid(20), true, true)).unwrap_err();
        assert!(error.to_string().contains("No virtual device"));
    }

    #[test]
    fn requests_fail_after_disconnect() {
        let mut bus = bus();
        bus.disconnect().unwrap();
        assert!(!bus.is_connected());
        assert!(bus.process_request(Request::BacklightOn(Uid(20))).is_err());
        assert_eq!(0, bus.request_count());
    }
}
