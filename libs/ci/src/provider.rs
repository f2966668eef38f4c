use crate::{Build, BuildFilter, BuildId, CiError, EventKind, Publisher, Repository};

/// Abstraction over a CI service that can list builds and announce changes to them.
///
/// [`TravisClient`](crate::TravisClient) talks to the real service; `FakeCi` from
/// [`buildlamp-testing`] replays scripted builds and events.
///
/// [`buildlamp-testing`]: ../buildlamp_testing/index.html
pub trait CiProvider {
    /// Looks up a repository by its `owner/name` slug.
    fn find_repository(&self, slug: &str) -> Result<Repository, CiError>;

    /// Lists a repository's builds, newest first.
    fn list_builds(&self, repository: &Repository, filter: &BuildFilter) -> Result<Vec<Build>, CiError>;

    /// Fetches the current state of a single build.
    fn build(&self, id: BuildId) -> Result<Build, CiError>;

    /// Starts delivering events of the given kinds for a repository to `publisher`.
    ///
    /// Returns once delivery is set up; events arrive in the background.
    fn subscribe(&self, repository: &Repository, kinds: &[EventKind], publisher: Publisher) -> Result<(), CiError>;
}
