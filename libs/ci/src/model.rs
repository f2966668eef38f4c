use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The provider's identifier for a build.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub u64);

impl Display for BuildId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a build as reported by Travis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    /// Build was created but not yet picked up.
    Created,
    /// Build was received by the scheduler.
    Received,
    /// Build is waiting for a worker.
    Queued,
    /// Build is running.
    Started,
    /// Build finished successfully.
    Passed,
    /// Build finished with failing tests.
    Failed,
    /// Build finished because of an infrastructure or configuration error.
    Errored,
    /// Build was cancelled.
    Canceled,
    /// Any state this crate doesn't know about.
    #[serde(other)]
    Unknown,
}

impl BuildState {
    /// Returns the state's name as Travis spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildState::Created => "created",
            BuildState::Received => "received",
            BuildState::Queued => "queued",
            BuildState::Started => "started",
            BuildState::Passed => "passed",
            BuildState::Failed => "failed",
            BuildState::Errored => "errored",
            BuildState::Canceled => "canceled",
            BuildState::Unknown => "unknown",
        }
    }

    /// Returns whether the build has reached a terminal state.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            BuildState::Passed | BuildState::Failed | BuildState::Errored | BuildState::Canceled
        )
    }
}

impl Display for BuildState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass/fail classification of a build.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Color {
    /// The build passed.
    Green,
    /// The build failed, errored or was cancelled.
    Red,
    /// The build hasn't finished (or is in a state we don't recognise).
    Yellow,
}

impl Color {
    /// Returns the color's name.
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Yellow => "yellow",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The commit a build ran against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Commit {
    /// Full commit hash.
    pub sha: String,
    /// Name of the commit's author.
    pub author_name: String,
}

/// A snapshot of one CI run.
///
/// Fetched from the provider and never mutated; re-fetch to see newer state.
///
/// # Examples
///
/// ```
/// use buildlamp_ci::{Build, BuildId, BuildState, Color, Commit};
///
/// let build = Build {
///     id: BuildId(9),
///     number: "31".to_owned(),
///     state: BuildState::Errored,
///     branch: "master".to_owned(),
///     commit: Commit { sha: "0123456789abcdef".to_owned(), author_name: "Ada".to_owned() },
///     started_at: None,
///     finished_at: None,
/// };
/// assert!(build.is_finished());
/// assert_eq!(Color::Red, build.color());
/// assert_eq!("0123456", build.short_sha());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Build {
    /// Provider identifier.
    pub id: BuildId,
    /// Build number as shown in the UI.
    pub number: String,
    /// Lifecycle state.
    pub state: BuildState,
    /// Branch the build ran on.
    pub branch: String,
    /// The commit that was built.
    pub commit: Commit,
    /// When the build started running.
    pub started_at: Option<DateTime<Utc>>,
    /// When the build finished.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Build {
    /// Returns whether the build has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Returns whether the build is currently running.
    pub fn is_running(&self) -> bool {
        self.state == BuildState::Started
    }

    /// Classifies the build's outcome.
    pub fn color(&self) -> Color {
        match self.state {
            BuildState::Passed => Color::Green,
            BuildState::Failed | BuildState::Errored | BuildState::Canceled => Color::Red,
            _ => Color::Yellow,
        }
    }

    /// Returns whether the build's outcome is a failure.
    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    /// Returns the abbreviated commit hash (first 7 characters).
    pub fn short_sha(&self) -> &str {
        let end = self
            .commit
            .sha
            .char_indices()
            .nth(7)
            .map_or(self.commit.sha.len(), |(index, _)| index);
        &self.commit.sha[..end]
    }
}

/// A repository on the CI provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    /// Provider identifier.
    pub id: u64,
    /// `owner/name` slug.
    pub slug: String,
    /// The repository's default branch, if the provider reports one.
    pub default_branch: Option<String>,
}

/// Narrows a build listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BuildFilter {
    /// Only builds on this branch.
    pub branch: Option<String>,
    /// At most this many builds.
    pub limit: Option<u32>,
}

impl BuildFilter {
    /// Lists builds on a single branch.
    pub fn branch<S: Into<String>>(branch: S) -> Self {
        BuildFilter {
            branch: Some(branch.into()),
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn build(state: BuildState) -> Build {
        Build {
            id: BuildId(1),
            number: "1".to_owned(),
            state,
            branch: "master".to_owned(),
            commit: Commit {
                sha: "abc".to_owned(),
                author_name: "Ada".to_owned(),
            },
            started_at: None,
            finished_at: None,
        }
    }

    #[test_case(BuildState::Passed, Color::Green, true ; "passed")]
    #[test_case(BuildState::Failed, Color::Red, true ; "failed")]
    #[test_case(BuildState::Errored, Color::Red, true ; "errored")]
    #[test_case(BuildState::Canceled, Color::Red, true ; "canceled")]
    #[test_case(BuildState::Started, Color::Yellow, false ; "started")]
    #[test_case(BuildState::Created, Color::Yellow, false ; "created")]
    #[test_case(BuildState::Unknown, Color::Yellow, false ; "unknown")]
    fn classification(state: BuildState, color: Color, finished: bool) {
        let build = build(state);
        assert_eq!(color, build.color());
        assert_eq!(finished, build.is_finished());
        assert_eq!(color == Color::Red, build.is_red());
    }

    #[test]
    fn only_started_is_running() {
        assert!(build(BuildState::Started).is_running());
        assert!(!build(BuildState::Queued).is_running());
        assert!(!build(BuildState::Passed).is_running());
    }

    #[test]
    fn short_sha_of_short_hash() {
        assert_eq!("abc", build(BuildState::Passed).short_sha());
    }

    #[test]
    fn unknown_state_deserializes() {
        let state: BuildState = serde_json::from_str("\"booting\"").unwrap();
        assert_eq!(BuildState::Unknown, state);
        let state: BuildState = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(BuildState::Canceled, state);
    }
}
