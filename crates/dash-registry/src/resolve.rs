//! Selection of the single repository a package action applies to.

use dash_events::DashEvent;
use tracing::{debug, warn};

use crate::{
    collection::{Lookup, Presence, RepoCollection},
    error::{RegistryError, Result},
};

/// A package pinned to the repository that serves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub repo: String,
}

impl RepoCollection {
    /// Picks the repository `package` should come from.
    ///
    /// With a `selector`, only that repository is consulted. Without one the
    /// package must exist in exactly one repository; repositories that could
    /// not be queried are logged and left out of the decision, unless nothing
    /// was found, in which case the outcome is [`RegistryError::Unresolved`].
    pub async fn resolve(&self, package: &str, selector: Option<&str>) -> Result<ResolvedPackage> {
        if let Some(repo) = selector {
            debug!("Resolving package {} in repo {}", package, repo);
            if !self.exists_in(package, repo).await? {
                return Err(RegistryError::PackageNotFound {
                    package: package.to_string(),
                    repo: repo.to_string(),
                });
            }
            return Ok(self.resolved(package, repo));
        }

        let Lookup {
            presence,
            failures,
            ..
        } = self.exists(package).await?;
        for (repo, err) in &failures {
            warn!("Could not query repo {} for package {}: {}", repo, package, err);
        }

        match presence {
            Presence::FoundIn(repos) if repos.len() == 1 => Ok(self.resolved(package, &repos[0])),
            Presence::FoundIn(repos) => {
                self.events().emit(DashEvent::Ambiguous {
                    package: package.to_string(),
                    repos: repos.clone(),
                });
                Err(RegistryError::AmbiguousPackage {
                    package: package.to_string(),
                    repos,
                })
            }
            Presence::NotFound if failures.is_empty() => {
                Err(RegistryError::PackageNotFoundAnywhere {
                    package: package.to_string(),
                })
            }
            Presence::NotFound => {
                Err(RegistryError::Unresolved {
                    package: package.to_string(),
                    repos: failures.into_iter().map(|(repo, _)| repo).collect(),
                })
            }
        }
    }

    fn resolved(&self, package: &str, repo: &str) -> ResolvedPackage {
        debug!("Package {} resolved to repo {}", package, repo);
        self.events().emit(DashEvent::Resolved {
            package: package.to_string(),
            repo: repo.to_string(),
        });
        ResolvedPackage {
            name: package.to_string(),
            repo: repo.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dash_events::CollectorSink;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{repo, StaticFetcher};

    fn collection(fetcher: StaticFetcher) -> (RepoCollection, Arc<StaticFetcher>, Arc<CollectorSink>) {
        let fetcher = fetcher.into_shared();
        let sink = Arc::new(CollectorSink::default());
        let mut collection = RepoCollection::new(sink.clone());
        collection.add(repo("A", "http://a/x", &fetcher));
        collection.add(repo("B", "http://b/y", &fetcher));
        (collection, fetcher, sink)
    }

    fn resolved(name: &str, repo: &str) -> ResolvedPackage {
        ResolvedPackage {
            name: name.to_string(),
            repo: repo.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unique_package_resolves() {
        let (collection, _, sink) = collection(
            StaticFetcher::new().json("http://a/x/packages/foo.json", json!({})),
        );

        assert_eq!(collection.resolve("foo", None).await.unwrap(), resolved("foo", "A"));
        assert!(sink.events().contains(&DashEvent::Resolved {
            package: "foo".to_string(),
            repo: "A".to_string(),
        }));
    }

    #[tokio::test]
    async fn test_ambiguous_without_selector() {
        let (collection, _, sink) = collection(
            StaticFetcher::new()
                .json("http://a/x/packages/foo.json", json!({}))
                .json("http://b/y/packages/foo.json", json!({})),
        );

        match collection.resolve("foo", None).await {
            Err(RegistryError::AmbiguousPackage {
                package,
                repos,
            }) => {
                assert_eq!(package, "foo");
                assert_eq!(repos, ["A", "B"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(sink
            .events()
            .iter()
            .any(|event| matches!(event, DashEvent::Ambiguous { .. })));
    }

    #[tokio::test]
    async fn test_selector_disambiguates() {
        let (collection, _, _) = collection(
            StaticFetcher::new()
                .json("http://a/x/packages/foo.json", json!({}))
                .json("http://b/y/packages/foo.json", json!({})),
        );

        assert_eq!(
            collection.resolve("foo", Some("B")).await.unwrap(),
            resolved("foo", "B")
        );
    }

    #[tokio::test]
    async fn test_selector_only_queries_that_repo() {
        let (collection, fetcher, _) = collection(
            StaticFetcher::new().json("http://b/y/packages/foo.json", json!({})),
        );

        collection.resolve("foo", Some("B")).await.unwrap();
        assert_eq!(fetcher.requests(), ["http://b/y/packages/foo.json"]);
    }

    #[tokio::test]
    async fn test_selector_without_package() {
        let (collection, _, _) = collection(
            StaticFetcher::new().json("http://a/x/packages/foo.json", json!({})),
        );

        match collection.resolve("foo", Some("B")).await {
            Err(RegistryError::PackageNotFound {
                package,
                repo,
            }) => {
                assert_eq!(package, "foo");
                assert_eq!(repo, "B");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_selector() {
        let (collection, fetcher, _) = collection(StaticFetcher::new());

        assert!(matches!(
            collection.resolve("foo", Some("C")).await,
            Err(RegistryError::RepoNotFound(name)) if name == "C"
        ));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_anywhere() {
        let (collection, _, _) = collection(StaticFetcher::new());

        assert!(matches!(
            collection.resolve("foo", None).await,
            Err(RegistryError::PackageNotFoundAnywhere { package }) if package == "foo"
        ));
    }

    #[tokio::test]
    async fn test_failed_repo_does_not_block_unique_match() {
        let (collection, _, _) = collection(
            StaticFetcher::new()
                .unreachable("http://a/x/packages/foo.json")
                .json("http://b/y/packages/foo.json", json!({})),
        );

        assert_eq!(collection.resolve("foo", None).await.unwrap(), resolved("foo", "B"));
    }

    #[tokio::test]
    async fn test_failures_never_reported_as_absence() {
        let (collection, _, _) = collection(
            StaticFetcher::new()
                .unreachable("http://a/x/packages/foo.json")
                .status("http://b/y/packages/foo.json", 500),
        );

        match collection.resolve("foo", None).await {
            Err(RegistryError::Unresolved {
                package,
                repos,
            }) => {
                assert_eq!(package, "foo");
                assert_eq!(repos, ["A", "B"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_partial_failure_with_no_match_is_unresolved() {
        let (collection, _, _) = collection(
            StaticFetcher::new().unreachable("http://a/x/packages/foo.json"),
        );

        assert!(matches!(
            collection.resolve("foo", None).await,
            Err(RegistryError::Unresolved { repos, .. }) if repos == ["A"]
        ));
    }

    #[tokio::test]
    async fn test_selector_transport_error_propagates() {
        let (collection, _, _) = collection(
            StaticFetcher::new().unreachable("http://a/x/packages/foo.json"),
        );

        let err = collection.resolve("foo", Some("A")).await.unwrap_err();
        assert!(err.is_transport());
    }
}
