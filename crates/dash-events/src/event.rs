use std::fmt;

/// Repository operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOperation {
    Exists,
    Get,
    Search,
    List,
}

impl fmt::Display for RepoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exists => "exists",
            Self::Get => "get",
            Self::Search => "search",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

/// Action handed off to the installer once a package is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoffAction {
    Install,
    Remove,
    Update,
}

impl fmt::Display for HandoffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Remove => "remove",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// All event types emitted while querying and resolving packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashEvent {
    /// A request against one repository is starting.
    RepoQueryStarted {
        repo: String,
        operation: RepoOperation,
    },
    /// A request against one repository finished successfully.
    RepoQueryCompleted {
        repo: String,
        operation: RepoOperation,
    },
    /// A request against one repository failed; other repositories are unaffected.
    RepoQueryFailed {
        repo: String,
        operation: RepoOperation,
        error: String,
    },
    /// The repository serves the package.
    PackageFound { package: String, repo: String },
    /// The repository answered 404 for the package.
    PackageAbsent { package: String, repo: String },
    /// The package resolved to exactly one repository.
    Resolved { package: String, repo: String },
    /// The package exists in several repositories and no selector was given.
    Ambiguous { package: String, repos: Vec<String> },
    /// A resolved package was passed to the installer.
    InstallHandoff {
        package: String,
        repo: String,
        action: HandoffAction,
    },
}

impl DashEvent {
    /// Repository the event is about, if it concerns a single one.
    pub fn repo(&self) -> Option<&str> {
        match self {
            Self::RepoQueryStarted { repo, .. }
            | Self::RepoQueryCompleted { repo, .. }
            | Self::RepoQueryFailed { repo, .. }
            | Self::PackageFound { repo, .. }
            | Self::PackageAbsent { repo, .. }
            | Self::Resolved { repo, .. }
            | Self::InstallHandoff { repo, .. } => Some(repo),
            Self::Ambiguous { .. } => None,
        }
    }
}
