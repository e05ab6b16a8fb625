use dash_events::{DashEvent, EventSink};
use tracing::{debug, trace};

/// Forwards registry events to the log.
///
/// Failures are reported by the commands themselves, so every event is logged
/// below the default level.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: DashEvent) {
        match event {
            DashEvent::RepoQueryStarted {
                repo,
                operation,
            } => trace!("{operation} query started on repo {repo}"),
            DashEvent::RepoQueryCompleted {
                repo,
                operation,
            } => trace!("{operation} query completed on repo {repo}"),
            DashEvent::RepoQueryFailed {
                repo,
                operation,
                error,
            } => debug!("{operation} query failed on repo {repo}: {error}"),
            DashEvent::PackageFound {
                package,
                repo,
            } => debug!("Package {package} exists in repo {repo}."),
            DashEvent::PackageAbsent {
                package,
                repo,
            } => debug!("Package {package} does not exist in repo {repo}."),
            DashEvent::Resolved {
                package,
                repo,
            } => debug!("Package {package} resolved to repo {repo}"),
            DashEvent::Ambiguous {
                package,
                repos,
            } => debug!("Package {package} is ambiguous between {}", repos.join(", ")),
            DashEvent::InstallHandoff {
                package,
                repo,
                action,
            } => debug!("Handed {action} of {package} from repo {repo} to the installer"),
        }
    }
}
