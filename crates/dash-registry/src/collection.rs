//! Concurrent queries across every configured repository.

use std::{fmt, sync::Arc};

use dash_config::config::{Config, DEFAULT_PARALLEL_LIMIT};
use dash_events::{DashEvent, EventSinkHandle, RepoOperation};
use indexmap::IndexMap;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::{
    error::{RegistryError, Result},
    http_client::Fetch,
    metadata::PackageMetadata,
    repository::{validate_package_name, Repository},
};

/// Per-repository outcome of a fan-out query, in registration order.
///
/// A failed repository never hides the results of the others.
#[derive(Debug)]
pub struct RepoResults<T> {
    entries: IndexMap<String, Result<T>>,
}

impl<T> RepoResults<T> {
    pub fn get(&self, repo: &str) -> Option<&Result<T>> {
        self.entries.get(repo)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Result<T>> {
        self.entries.iter()
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().filter_map(|(repo, result)| {
            result.as_ref().ok().map(|value| (repo.as_str(), value))
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &RegistryError)> {
        self.entries.iter().filter_map(|(repo, result)| {
            result.as_ref().err().map(|err| (repo.as_str(), err))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.values().any(Result::is_err)
    }

    /// True when there was at least one repository and none of them answered.
    pub fn all_failed(&self) -> bool {
        !self.entries.is_empty() && self.entries.values().all(Result::is_err)
    }

    pub fn into_inner(self) -> IndexMap<String, Result<T>> {
        self.entries
    }
}

impl<T> FromIterator<(String, Result<T>)> for RepoResults<T> {
    fn from_iter<I: IntoIterator<Item = (String, Result<T>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for RepoResults<T> {
    type Item = (String, Result<T>);
    type IntoIter = indexmap::map::IntoIter<String, Result<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Where a package was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    NotFound,
    /// Names of the repositories serving the package, in registration order.
    FoundIn(Vec<String>),
}

impl Presence {
    pub fn from_repos(repos: Vec<String>) -> Self {
        if repos.is_empty() {
            Self::NotFound
        } else {
            Self::FoundIn(repos)
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::FoundIn(_))
    }

    pub fn repos(&self) -> &[String] {
        match self {
            Self::NotFound => &[],
            Self::FoundIn(repos) => repos,
        }
    }
}

/// Result of asking every repository whether a package exists.
#[derive(Debug)]
pub struct Lookup {
    pub package: String,
    pub presence: Presence,
    /// Repositories that could not answer, with the reason.
    pub failures: Vec<(String, RegistryError)>,
}

impl Lookup {
    pub fn failed_repos(&self) -> Vec<String> {
        self.failures.iter().map(|(repo, _)| repo.clone()).collect()
    }
}

/// Ordered set of repositories addressed as one.
///
/// Adding a repository whose name is already registered replaces the earlier
/// one in place.
pub struct RepoCollection {
    repos: IndexMap<String, Repository>,
    events: EventSinkHandle,
    parallel_limit: usize,
}

impl RepoCollection {
    pub fn new(events: EventSinkHandle) -> Self {
        Self {
            repos: IndexMap::new(),
            events,
            parallel_limit: DEFAULT_PARALLEL_LIMIT,
        }
    }

    /// Maximum number of repositories queried at the same time. Zero is
    /// treated as one.
    pub fn with_parallel_limit(mut self, limit: usize) -> Self {
        self.parallel_limit = limit.max(1);
        self
    }

    /// Builds a collection from the enabled repositories of `config`.
    pub fn from_config(config: &Config, client: Arc<dyn Fetch>, events: EventSinkHandle) -> Self {
        let mut collection = Self::new(events).with_parallel_limit(config.parallel_limit());
        for repo in config.enabled_repos() {
            collection.add(Repository::from_config(repo, client.clone()));
        }
        info!("Loaded {} repo(s).", collection.len());
        collection
    }

    pub fn add(&mut self, repo: Repository) {
        debug!("Adding {}", repo);
        self.repos.insert(repo.name().to_string(), repo);
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn parallel_limit(&self) -> usize {
        self.parallel_limit
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.repos.keys().map(String::as_str)
    }

    pub fn repos(&self) -> impl Iterator<Item = &Repository> {
        self.repos.values()
    }

    pub fn repo(&self, name: &str) -> Result<&Repository> {
        self.repos
            .get(name)
            .ok_or_else(|| RegistryError::RepoNotFound(name.to_string()))
    }

    pub fn events(&self) -> &EventSinkHandle {
        &self.events
    }

    /// Asks every repository whether `package` exists.
    pub async fn exists(&self, package: &str) -> Result<Lookup> {
        validate_package_name(package)?;

        let pkg = package.to_string();
        let results = self
            .fan_out(RepoOperation::Exists, move |repo| repo.exists(&pkg))
            .await?;

        let mut found = Vec::new();
        let mut failures = Vec::new();
        for (repo, result) in results {
            match result {
                Ok(true) => {
                    debug!("Package {} exists in repo {}", package, repo);
                    self.events.emit(DashEvent::PackageFound {
                        package: package.to_string(),
                        repo: repo.clone(),
                    });
                    found.push(repo);
                }
                Ok(false) => {
                    self.events.emit(DashEvent::PackageAbsent {
                        package: package.to_string(),
                        repo,
                    });
                }
                Err(err) => failures.push((repo, err)),
            }
        }

        if found.is_empty() {
            debug!("Package {} does not exist in any reachable repo", package);
        }

        Ok(Lookup {
            package: package.to_string(),
            presence: Presence::from_repos(found),
            failures,
        })
    }

    /// Whether `package` exists in the repository named `repo`.
    pub async fn exists_in(&self, package: &str, repo: &str) -> Result<bool> {
        let pkg = package.to_string();
        self.run_in(repo, RepoOperation::Exists, move |r| r.exists(&pkg))
            .await
    }

    /// Metadata of `package` from the repository named `repo`.
    pub async fn get(&self, package: &str, repo: &str) -> Result<PackageMetadata> {
        let pkg = package.to_string();
        self.run_in(repo, RepoOperation::Get, move |r| r.get(&pkg))
            .await
    }

    /// Searches every repository's catalog for `term`.
    pub async fn search(&self, term: &str) -> Result<RepoResults<Vec<String>>> {
        let term = term.to_string();
        self.fan_out(RepoOperation::Search, move |repo| repo.search(&term))
            .await
    }

    pub async fn search_in(&self, term: &str, repo: &str) -> Result<Vec<String>> {
        let term = term.to_string();
        self.run_in(repo, RepoOperation::Search, move |r| r.search(&term))
            .await
    }

    /// Lists every repository's catalog.
    pub async fn list(&self) -> Result<RepoResults<Vec<String>>> {
        self.fan_out(RepoOperation::List, |repo| repo.list()).await
    }

    pub async fn list_in(&self, repo: &str) -> Result<Vec<String>> {
        self.run_in(repo, RepoOperation::List, |r| r.list()).await
    }

    /// Runs `op` against every repository, at most `parallel_limit` at a time.
    ///
    /// A query that panics is reported as [`RegistryError::TaskFailed`] in its
    /// own slot. This relies on unwinding, so the release profile must not set
    /// `panic = "abort"`.
    async fn fan_out<T, F>(&self, operation: RepoOperation, op: F) -> Result<RepoResults<T>>
    where
        T: Send + 'static,
        F: Fn(&Repository) -> Result<T> + Send + Sync + 'static,
    {
        let op = Arc::new(op);
        let semaphore = Arc::new(Semaphore::new(self.parallel_limit));
        let mut handles = Vec::with_capacity(self.repos.len());

        for repo in self.repos.values() {
            let name = repo.name().to_string();
            let permit = semaphore.clone().acquire_owned().await.map_err(|err| {
                RegistryError::TaskFailed {
                    repo: name.clone(),
                    reason: err.to_string(),
                }
            })?;
            let repo = repo.clone();
            let op = op.clone();

            self.emit_started(&name, operation);
            let handle = tokio::task::spawn_blocking(move || {
                let result = op(&repo);
                drop(permit);
                result
            });
            handles.push((name, handle));
        }

        let mut entries = IndexMap::with_capacity(handles.len());
        for (name, handle) in handles {
            let result = handle.await.unwrap_or_else(|err| {
                Err(RegistryError::TaskFailed {
                    repo: name.clone(),
                    reason: err.to_string(),
                })
            });
            self.emit_finished(&name, operation, &result);
            entries.insert(name, result);
        }

        Ok(RepoResults {
            entries,
        })
    }

    /// Runs `op` against the single repository named `repo`.
    async fn run_in<T, F>(&self, repo: &str, operation: RepoOperation, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> Result<T> + Send + 'static,
    {
        let target = self.repo(repo)?.clone();
        let name = target.name().to_string();

        self.emit_started(&name, operation);
        let result = tokio::task::spawn_blocking(move || op(&target))
            .await
            .unwrap_or_else(|err| {
                Err(RegistryError::TaskFailed {
                    repo: name.clone(),
                    reason: err.to_string(),
                })
            });
        self.emit_finished(&name, operation, &result);

        result
    }

    fn emit_started(&self, repo: &str, operation: RepoOperation) {
        self.events.emit(DashEvent::RepoQueryStarted {
            repo: repo.to_string(),
            operation,
        });
    }

    fn emit_finished<T>(&self, repo: &str, operation: RepoOperation, result: &Result<T>) {
        let event = match result {
            Ok(_) => {
                DashEvent::RepoQueryCompleted {
                    repo: repo.to_string(),
                    operation,
                }
            }
            Err(err) => {
                DashEvent::RepoQueryFailed {
                    repo: repo.to_string(),
                    operation,
                    error: err.to_string(),
                }
            }
        };
        self.events.emit(event);
    }
}

impl fmt::Display for RepoCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        write!(f, "Repo Collection: {}", names.join(", "))
    }
}

impl fmt::Debug for RepoCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoCollection")
            .field("repos", &self.repos)
            .field("parallel_limit", &self.parallel_limit)
            .finish_non_exhaustive()
    }
}
