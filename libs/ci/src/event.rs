use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::{Build, CiError};

/// The build lifecycle notifications a subscription can deliver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `build:started`
    BuildStarted,
    /// `build:finished`
    BuildFinished,
}

impl EventKind {
    /// Every kind, in the order they occur during a build.
    pub const ALL: [EventKind; 2] = [EventKind::BuildStarted, EventKind::BuildFinished];

    /// Returns the event's wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::BuildStarted => "build:started",
            EventKind::BuildFinished => "build:finished",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build:started" => Ok(EventKind::BuildStarted),
            "build:finished" => Ok(EventKind::BuildFinished),
            _ => Err(CiError::UnknownEvent { name: s.to_owned() }),
        }
    }
}

/// A notification that a build changed state.
///
/// Lives only as long as it takes to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Slug of the repository the build belongs to.
    pub repository: String,
    /// The build as it looked when the event was raised.
    pub build: Build,
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} #{} ({}) on {}",
            self.kind, self.repository, self.build.number, self.build.state, self.build.branch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in &EventKind::ALL {
            assert_eq!(*kind, kind.as_str().parse::<EventKind>().unwrap());
        }
    }

    #[test]
    fn unknown_name_rejected() {
        let error = "build:created".parse::<EventKind>().unwrap_err();
        assert!(matches!(error, CiError::UnknownEvent { ref name } if name == "build:created"));
    }
}
