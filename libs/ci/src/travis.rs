use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    Build, BuildFilter, BuildId, BuildState, BuildWatcher, CiError, CiProvider, Commit, EventKind, Publisher,
    Repository,
};

/// API endpoint for travis-ci.com (formerly Travis Pro).
pub const DEFAULT_API_URL: &str = "https://api.travis-ci.com";

/// How often the poller lists builds while subscribed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How many recent builds the poller compares between polls.
const WATCH_LIMIT: u32 = 25;

/// Client for the Travis CI v3 API.
///
/// Uses blocking HTTP. Event subscriptions are implemented by polling the repository's
/// recent builds on a background thread and diffing consecutive listings with a
/// [`BuildWatcher`].
///
/// # Examples
///
/// ```no_run
/// use buildlamp_ci::{BuildFilter, CiProvider, TravisClient, DEFAULT_API_URL};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let client = TravisClient::new(DEFAULT_API_URL, "secret-token")?;
/// let repository = client.find_repository("owner/project")?;
/// for build in client.list_builds(&repository, &BuildFilter::branch("master"))? {
///     println!("#{} {}", build.number, build.state);
/// }
/// #
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct TravisClient {
    http: Client,
    base_url: Url,
    poll_interval: Duration,
}

impl TravisClient {
    /// Creates a client for the API at `base_url`, authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`CiError::InvalidUrl`] if `base_url` can't be parsed.
    /// * [`CiError::Unauthorized`] if the token can't be sent as a header.
    /// * [`CiError::Http`] if the HTTP client can't be built.
    pub fn new(base_url: &str, token: &str) -> Result<Self, CiError> {
        let base_url = Url::parse(base_url).map_err(|_| CiError::InvalidUrl {
            url: base_url.to_owned(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CiError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let mut authorization =
            HeaderValue::from_str(&format!("token {}", token)).map_err(|_| CiError::Unauthorized)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert("Travis-API-Version", HeaderValue::from_static("3"));
        let _ = headers.insert(AUTHORIZATION, authorization);

        let http = Client::builder()
            .user_agent(concat!("buildlamp/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(TravisClient {
            http,
            base_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Sets how often subscriptions poll for changes.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Builds an API URL from path segments, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, CiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| CiError::InvalidUrl {
                url: self.base_url.to_string(),
            })?;
            let _ = path.pop_if_empty();
            let _ = path.extend(segments);
        }
        Ok(url)
    }

    /// Issues a GET and decodes the JSON body, mapping 404 to `not_found`.
    fn get<T, F>(&self, url: Url, query: &[(&str, String)], not_found: F) -> Result<T, CiError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> CiError,
    {
        debug!("GET {}", url);
        let response: Response = self.http.get(url.clone()).query(query).send()?;
        match response.status() {
            status if status.is_success() => Ok(response.json()?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(not_found()),
            status => Err(CiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    /// Lists builds and forwards the events they imply until the subscription goes away.
    fn poll(self, repository: Repository, filter: BuildFilter, mut watcher: BuildWatcher, publisher: Publisher) {
        'poll: loop {
            if publisher.is_closed() {
                break;
            }
            thread::sleep(self.poll_interval);
            if publisher.is_closed() {
                break;
            }

            let builds = match self.list_builds(&repository, &filter) {
                Ok(builds) => builds,
                Err(e) => {
                    warn!("Polling {} failed: {}", repository.slug, e);
                    let _ = publisher.fail(e);
                    return;
                }
            };

            for event in watcher.observe(&builds) {
                if !publisher.publish(event) {
                    break 'poll;
                }
            }
        }
        debug!("Subscription to {} dropped; poller exiting", repository.slug);
    }
}

impl CiProvider for TravisClient {
    fn find_repository(&self, slug: &str) -> Result<Repository, CiError> {
        let url = self.url(&["repo", slug])?;
        let repository: ApiRepository = self.get(url, &[], || CiError::RepositoryNotFound { slug: slug.to_owned() })?;
        Ok(repository.into())
    }

    fn list_builds(&self, repository: &Repository, filter: &BuildFilter) -> Result<Vec<Build>, CiError> {
        let url = self.url(&["repo", &repository.id.to_string(), "builds"])?;

        let mut query = vec![
            ("sort_by", "id:desc".to_owned()),
            ("include", "build.commit".to_owned()),
        ];
        if let Some(ref branch) = filter.branch {
            query.push(("branch.name", branch.clone()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }

        let builds: ApiBuilds = self.get(url, &query, || CiError::RepositoryNotFound {
            slug: repository.slug.clone(),
        })?;
        Ok(builds.builds.into_iter().map(Build::from).collect())
    }

    fn build(&self, id: BuildId) -> Result<Build, CiError> {
        let url = self.url(&["build", &id.to_string()])?;
        let build: ApiBuild = self.get(url, &[("include", "build.commit".to_owned())], || CiError::BuildNotFound { id })?;
        Ok(build.into())
    }

    fn subscribe(&self, repository: &Repository, kinds: &[EventKind], publisher: Publisher) -> Result<(), CiError> {
        let filter = BuildFilter {
            branch: None,
            limit: Some(WATCH_LIMIT),
        };

        // Prime synchronously so a broken listing fails the subscription itself.
        let mut watcher = BuildWatcher::new(repository.slug.clone(), kinds);
        let _ = watcher.observe(&self.list_builds(repository, &filter)?);

        let client = self.clone();
        let repository = repository.clone();
        info!(
            "Watching {} for {:?} every {}s",
            repository.slug,
            kinds,
            self.poll_interval.as_secs()
        );
        let _poller = thread::Builder::new()
            .name("travis-poller".to_owned())
            .spawn(move || client.poll(repository, filter, watcher, publisher))
            .map_err(|source| CiError::Poller { source })?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    id: u64,
    slug: String,
    #[serde(default)]
    default_branch: Option<ApiBranch>,
}

#[derive(Debug, Deserialize)]
struct ApiBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiBuilds {
    builds: Vec<ApiBuild>,
}

#[derive(Debug, Deserialize)]
struct ApiBuild {
    id: BuildId,
    number: String,
    state: BuildState,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    branch: Option<ApiBranch>,
    #[serde(default)]
    commit: Option<ApiCommit>,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    #[serde(default)]
    sha: String,
    #[serde(default)]
    author: Option<ApiAuthor>,
}

#[derive(Debug, Deserialize)]
struct ApiAuthor {
    name: String,
}

impl From<ApiRepository> for Repository {
    fn from(repository: ApiRepository) -> Self {
        Repository {
            id: repository.id,
            slug: repository.slug,
            default_branch: repository.default_branch.map(|branch| branch.name),
        }
    }
}

impl From<ApiBuild> for Build {
    fn from(build: ApiBuild) -> Self {
        let (sha, author_name) = match build.commit {
            Some(commit) => (
                commit.sha,
                commit.author.map_or_else(|| "unknown".to_owned(), |author| author.name),
            ),
            None => (String::new(), "unknown".to_owned()),
        };

        Build {
            id: build.id,
            number: build.number,
            state: build.state,
            branch: build.branch.map(|branch| branch.name).unwrap_or_default(),
            commit: Commit { sha, author_name },
            started_at: build.started_at,
            finished_at: build.finished_at,
        }
    }
}
