use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Local, Utc};

use crate::ci::Build;
use crate::core::{BrickBus, Line, Position, Request, Uid, LCD_COLUMNS};
use crate::DeviceError;

/// An LCD 20x4 bricklet showing build status.
///
/// Every render clears the display first, so output never depends on what was shown before.
///
/// # Examples
///
/// ```no_run
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use buildlamp::{Display, TcpBrickBus};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let bus = Rc::new(RefCell::new(TcpBrickBus::connect("localhost", 4223)?));
/// let display = Display::new(bus.clone(), "SCT31".parse()?);
/// display.init()?;
/// display.print_disconnected()?;
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Display {
    uid: Uid,
    bus: Rc<RefCell<dyn BrickBus>>,
}

impl Display {
    /// Creates a display for the LCD bricklet `uid` on `bus`. Nothing is sent yet.
    pub fn new(bus: Rc<RefCell<dyn BrickBus>>, uid: Uid) -> Self {
        Display { uid, bus }
    }

    /// Returns the LCD bricklet's UID.
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Switches the backlight on.
    pub fn init(&self) -> Result<(), DeviceError> {
        self.send(Request::BacklightOn(self.uid))
    }

    /// Renders a build on all four rows.
    ///
    /// ```text
    ///     Ada Lovelace
    /// #1a2b3c4 (master)
    /// Build #57 at 14:05
    /// ====== PASSED ======
    /// ```
    ///
    /// Running builds show their start time and `IN PROGRESS` bordered with `*`;
    /// finished builds show their finish time and state bordered with `=`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`DeviceError::MissingTimestamp`] if the build lacks the time to show.
    /// * [`DeviceError::Bus`] if a request fails.
    pub fn print_build_info(&self, build: &Build) -> Result<(), DeviceError> {
        let rows = build_rows(build)?;

        self.send(Request::ClearDisplay(self.uid))?;
        for (line, row) in rows.iter().enumerate() {
            self.write_line(line as u8, row)?;
        }
        self.send(Request::BacklightOn(self.uid))
    }

    /// Shows that the bridge has stopped.
    pub fn print_disconnected(&self) -> Result<(), DeviceError> {
        self.send(Request::ClearDisplay(self.uid))?;
        self.write_line(0, &center("Client not running", ' '))
    }

    fn write_line(&self, line: u8, text: &str) -> Result<(), DeviceError> {
        let text: String = text.chars().take(LCD_COLUMNS).collect();
        self.send(Request::WriteLine(self.uid, Line(line), Position(0), text.into()))
    }

    fn send(&self, request: Request<'_>) -> Result<(), DeviceError> {
        let mut bus = self.bus.borrow_mut();
        Ok(bus.process_request(request)?)
    }
}

/// Formats the four rows for a build. Rows are clipped when written.
fn build_rows(build: &Build) -> Result<[String; 4], DeviceError> {
    let (time, footer) = if build.is_finished() {
        let time = timestamp(build, build.finished_at, "finished")?;
        (time, center(&format!(" {} ", build.state.as_str().to_uppercase()), '='))
    } else {
        let time = timestamp(build, build.started_at, "started")?;
        (time, center(" IN PROGRESS ", '*'))
    };

    let rows = [
        center(&build.commit.author_name, ' '),
        format!("#{} ({})", build.short_sha(), build.branch),
        format!("Build #{} at {}", build.number, time.with_timezone(&Local).format("%k:%M")),
        footer,
    ];
    Ok(rows)
}

fn timestamp(
    build: &Build,
    time: Option<DateTime<Utc>>,
    field: &'static str,
) -> Result<DateTime<Utc>, DeviceError> {
    time.ok_or_else(|| DeviceError::MissingTimestamp {
        number: build.number.clone(),
        field,
    })
}

/// Centers `text` in a row, putting the odd padding character on the right.
fn center(text: &str, padding: char) -> String {
    let length = text.chars().count();
    if length >= LCD_COLUMNS {
        return text.to_owned();
    }

    let left = (LCD_COLUMNS - length) / 2;
    let right = LCD_COLUMNS - length - left;
    let mut row = String::with_capacity(LCD_COLUMNS);
    row.extend(std::iter::repeat(padding).take(left));
    row.push_str(text);
    row.extend(std::iter::repeat(padding).take(right));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Ada", "        Ada         " ; "odd padding goes right")]
    #[test_case("Grace", "       Grace        " ; "odd length")]
    #[test_case("Barbara Liskov", "   Barbara Liskov   " ; "even split")]
    #[test_case("", "                    " ; "empty")]
    #[test_case("A name far too long for it", "A name far too long for it" ; "too long left alone")]
    fn centers_like_a_20_column_row(text: &str, expected: &str) {
        assert_eq!(expected, center(text, ' '));
    }

    #[test]
    fn centers_with_border() {
        assert_eq!("====== PASSED ======", center(" PASSED ", '='));
        assert_eq!("*** IN PROGRESS ****", center(" IN PROGRESS ", '*'));
    }
}
