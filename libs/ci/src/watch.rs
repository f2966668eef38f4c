use std::collections::{HashMap, HashSet};

use crate::{Build, BuildId, BuildState, Event, EventKind};

/// Turns successive build listings into lifecycle events.
///
/// The first listing only records what already exists. After that, a build produces
/// `build:started` when it is first seen running and `build:finished` when it is first
/// seen in a (new) terminal state. Listings are expected newest first, as providers
/// return them; events come out oldest build first.
///
/// # Examples
///
/// ```
/// # use buildlamp_ci::{Build, BuildId, BuildState, BuildWatcher, Commit, EventKind};
/// # fn build(state: BuildState) -> Build {
/// #     Build {
/// #         id: BuildId(1), number: "1".into(), state, branch: "master".into(),
/// #         commit: Commit { sha: "abc".into(), author_name: "Ada".into() },
/// #         started_at: None, finished_at: None,
/// #     }
/// # }
/// let mut watcher = BuildWatcher::new("owner/repo", &EventKind::ALL);
/// assert!(watcher.observe(&[]).is_empty());
///
/// let events = watcher.observe(&[build(BuildState::Started)]);
/// assert_eq!(EventKind::BuildStarted, events[0].kind);
///
/// let events = watcher.observe(&[build(BuildState::Passed)]);
/// assert_eq!(EventKind::BuildFinished, events[0].kind);
/// ```
#[derive(Debug, Clone)]
pub struct BuildWatcher {
    repository: String,
    kinds: Vec<EventKind>,
    seen: HashMap<BuildId, BuildState>,
    primed: bool,
}

impl BuildWatcher {
    /// Creates a watcher for a repository that reports only the given kinds.
    pub fn new<S: Into<String>>(repository: S, kinds: &[EventKind]) -> Self {
        BuildWatcher {
            repository: repository.into(),
            kinds: kinds.to_vec(),
            seen: HashMap::new(),
            primed: false,
        }
    }

    /// Records a listing and returns the events it implies since the previous one.
    pub fn observe(&mut self, builds: &[Build]) -> Vec<Event> {
        let mut events = Vec::new();

        for build in builds.iter().rev() {
            let previous = self.seen.insert(build.id, build.state);
            if !self.primed {
                continue;
            }

            if build.is_running() && previous != Some(BuildState::Started) {
                events.push(self.event(EventKind::BuildStarted, build));
            }
            if build.is_finished() && previous != Some(build.state) {
                events.push(self.event(EventKind::BuildFinished, build));
            }
        }

        // Forget builds that have scrolled out of the listing.
        let current: HashSet<BuildId> = builds.iter().map(|build| build.id).collect();
        self.seen.retain(|id, _| current.contains(id));
        self.primed = true;

        events.retain(|event| self.kinds.contains(&event.kind));
        events
    }

    fn event(&self, kind: EventKind, build: &Build) -> Event {
        Event {
            kind,
            repository: self.repository.clone(),
            build: build.clone(),
        }
    }
}
