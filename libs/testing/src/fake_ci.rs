use std::cell::RefCell;

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::debug;

use buildlamp_ci::{
    Build, BuildFilter, BuildId, BuildState, CiError, CiProvider, Commit, Event, EventKind, Publisher, Repository,
};

/// A [`CiProvider`] that serves builds from memory and replays scripted events.
///
/// Builds can be swapped out between calls with [`set_builds`](FakeCi::set_builds), which is
/// how tests simulate the provider's state moving on while the controller is running.
/// On `subscribe`, every scripted event (or error) is published at once and the stream is
/// then closed, so a consumer sees them in order followed by [`CiError::StreamClosed`].
///
/// # Examples
///
/// ```
/// use buildlamp_ci::{BuildFilter, BuildState, CiProvider};
/// use buildlamp_testing::{build, repository, FakeCi};
///
/// let ci = FakeCi::new(repository("octo/lamp"))
///     .with_builds(vec![build(2, BuildState::Started, "master"), build(1, BuildState::Passed, "dev")]);
/// let builds = ci.list_builds(&repository("octo/lamp"), &BuildFilter::branch("dev")).unwrap();
/// assert_eq!(1, builds.len());
/// ```
#[derive(Debug)]
pub struct FakeCi {
    repository: Repository,
    builds: RefCell<Vec<Build>>,
    script: RefCell<Vec<Result<Event, CiError>>>,
    subscribe_error: RefCell<Option<CiError>>,
    subscribed: RefCell<Vec<EventKind>>,
}

impl FakeCi {
    /// Creates a provider that knows only `repository` and has no builds.
    pub fn new(repository: Repository) -> Self {
        FakeCi {
            repository,
            builds: RefCell::new(vec![]),
            script: RefCell::new(vec![]),
            subscribe_error: RefCell::new(None),
            subscribed: RefCell::new(vec![]),
        }
    }

    /// Sets the builds, newest first.
    pub fn with_builds(self, builds: Vec<Build>) -> Self {
        self.set_builds(builds);
        self
    }

    /// Queues an event to publish on subscribe.
    pub fn with_event(self, event: Event) -> Self {
        self.script.borrow_mut().push(Ok(event));
        self
    }

    /// Queues an error to publish on subscribe, after any events queued before it.
    pub fn with_stream_error(self, error: CiError) -> Self {
        self.script.borrow_mut().push(Err(error));
        self
    }

    /// Makes `subscribe` itself fail.
    pub fn with_subscribe_error(self, error: CiError) -> Self {
        *self.subscribe_error.borrow_mut() = Some(error);
        self
    }

    /// Replaces the builds, newest first.
    pub fn set_builds(&self, builds: Vec<Build>) {
        *self.builds.borrow_mut() = builds;
    }

    /// Returns the event kinds of the last subscription.
    pub fn subscribed_kinds(&self) -> Vec<EventKind> {
        self.subscribed.borrow().clone()
    }
}

impl CiProvider for FakeCi {
    fn find_repository(&self, slug: &str) -> Result<Repository, CiError> {
        if slug == self.repository.slug {
            Ok(self.repository.clone())
        } else {
            Err(CiError::RepositoryNotFound { slug: slug.to_owned() })
        }
    }

    fn list_builds(&self, repository: &Repository, filter: &BuildFilter) -> Result<Vec<Build>, CiError> {
        if repository.id != self.repository.id {
            return Err(CiError::RepositoryNotFound {
                slug: repository.slug.clone(),
            });
        }

        let builds = self.builds.borrow();
        let matching = builds
            .iter()
            .filter(|build| filter.branch.as_ref().map_or(true, |branch| build.branch == *branch))
            .take(filter.limit.map_or(usize::MAX, |limit| limit as usize))
            .cloned()
            .collect();
        Ok(matching)
    }

    fn build(&self, id: BuildId) -> Result<Build, CiError> {
        self.builds
            .borrow()
            .iter()
            .find(|build| build.id == id)
            .cloned()
            .ok_or(CiError::BuildNotFound { id })
    }

    fn subscribe(&self, repository: &Repository, kinds: &[EventKind], publisher: Publisher) -> Result<(), CiError> {
        if let Some(error) = self.subscribe_error.borrow_mut().take() {
            return Err(error);
        }
        *self.subscribed.borrow_mut() = kinds.to_vec();

        debug!("Replaying scripted events for {}", repository.slug);
        for notice in self.script.borrow_mut().drain(..) {
            let _ = match notice {
                Ok(event) => publisher.publish(event),
                Err(error) => publisher.fail(error),
            };
        }
        publisher.close();
        Ok(())
    }
}

/// Creates a repository with id 1 and `master` as default branch.
pub fn repository(slug: &str) -> Repository {
    Repository {
        id: 1,
        slug: slug.to_owned(),
        default_branch: Some("master".to_owned()),
    }
}

/// Creates a build numbered after its id, with timestamps that fit its state.
///
/// Started builds have a start time; finished builds have both.
pub fn build(id: u64, state: BuildState, branch: &str) -> Build {
    let started_at = base_time().map(|time| time + Duration::minutes(id as i64));
    let finished_at = if state.is_finished() {
        started_at.map(|time| time + Duration::minutes(5))
    } else {
        None
    };

    Build {
        id: BuildId(id),
        number: id.to_string(),
        state,
        branch: branch.to_owned(),
        commit: Commit {
            sha: format!("{:040x}", 0xc0ffee_u64 + id),
            author_name: "Ada Lovelace".to_owned(),
        },
        started_at: if state == BuildState::Created { None } else { started_at },
        finished_at,
    }
}

/// Creates an event for `build` in `repository`.
pub fn event(kind: EventKind, repository: &str, build: Build) -> Event {
    Event {
        kind,
        repository: repository.to_owned(),
        build,
    }
}

fn base_time() -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single()
}
