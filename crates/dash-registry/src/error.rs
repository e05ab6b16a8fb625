//! Error types for the registry crate.
//!
//! [`RegistryError`] separates transport failures (the repository could not be
//! reached) and protocol failures (it answered with something unexpected) from
//! the resolution outcomes that are reported to the user. Only an explicit
//! HTTP 404 is ever turned into "package does not exist".

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Failed to reach {url}: {source}")]
    #[diagnostic(
        code(dash_registry::transport),
        help("Check your network connection and the repository URL")
    )]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Unexpected HTTP status {status} from {url}")]
    #[diagnostic(
        code(dash_registry::unexpected_status),
        help("The repository may be misconfigured or temporarily unavailable")
    )]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Invalid JSON received from {url}")]
    #[diagnostic(
        code(dash_registry::invalid_body),
        help("The repository served a malformed document")
    )]
    InvalidBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid catalog received from {url}: {reason}")]
    #[diagnostic(
        code(dash_registry::invalid_catalog),
        help("all.json must be an array of package names or an object keyed by package name")
    )]
    InvalidCatalog { url: String, reason: String },

    #[error("Response from {url} is larger than {limit} bytes")]
    #[diagnostic(
        code(dash_registry::body_too_large),
        help("Raise max_body_size in your configuration file")
    )]
    BodyTooLarge { url: String, limit: u64 },

    #[error("Package {package} does not exist in repo {repo}")]
    #[diagnostic(
        code(dash_registry::package_not_found),
        help("Check the package name, or drop --repo to search every repository")
    )]
    PackageNotFound { package: String, repo: String },

    #[error("Package {package} does not exist in any repository")]
    #[diagnostic(
        code(dash_registry::package_not_found_anywhere),
        help("Use `dash search <term>` to look for similar package names")
    )]
    PackageNotFoundAnywhere { package: String },

    #[error("Repo {0} does not exist")]
    #[diagnostic(
        code(dash_registry::repo_not_found),
        help("Check the repository names listed in your configuration file")
    )]
    RepoNotFound(String),

    #[error("Package {package} exists in multiple repos: {}", .repos.join(", "))]
    #[diagnostic(
        code(dash_registry::ambiguous_package),
        help("Please specify a repo with --repo. Available repos: {}", .repos.join(", "))
    )]
    AmbiguousPackage { package: String, repos: Vec<String> },

    #[error(
        "Could not determine whether package {package} exists: {} could not be queried",
        .repos.join(", ")
    )]
    #[diagnostic(
        code(dash_registry::unresolved),
        help("Retry later, or pass --repo to query a reachable repository directly")
    )]
    Unresolved { package: String, repos: Vec<String> },

    #[error("Invalid package name: {0:?}")]
    #[diagnostic(code(dash_registry::invalid_package_name))]
    InvalidPackageName(String),

    #[error("Query against repo {repo} did not complete: {reason}")]
    #[diagnostic(code(dash_registry::task_failed))]
    TaskFailed { repo: String, reason: String },

    #[error("Installer failed: {0}")]
    #[diagnostic(code(dash_registry::installer))]
    Installer(String),
}

impl RegistryError {
    pub fn transport(url: impl Into<String>, source: ureq::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// The repository could not be reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The repository answered, but not with what the wire contract expects.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus { .. }
                | Self::InvalidBody { .. }
                | Self::InvalidCatalog { .. }
                | Self::BodyTooLarge { .. }
        )
    }
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
