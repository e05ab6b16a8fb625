//! Hand-off of resolved packages to an installer.
//!
//! Resolution ends here: the package, the repository it came from and its
//! metadata are passed to an [`Installer`]. Performing the installation is the
//! installer's business.

use dash_events::{DashEvent, EventSinkHandle, HandoffAction};
use tracing::debug;

use crate::{
    collection::RepoCollection,
    error::Result,
    metadata::PackageMetadata,
    resolve::ResolvedPackage,
};

/// A resolved package together with the metadata of the chosen repository.
#[derive(Clone, Debug, PartialEq)]
pub struct InstallTarget {
    pub package: ResolvedPackage,
    pub metadata: PackageMetadata,
}

pub trait Installer: Send + Sync {
    fn install(&self, target: &InstallTarget) -> Result<()>;
    fn remove(&self, target: &InstallTarget) -> Result<()>;
    fn update(&self, target: &InstallTarget) -> Result<()>;
}

/// Installer that records the hand-off and performs no local changes.
pub struct HandoffInstaller {
    events: EventSinkHandle,
}

impl HandoffInstaller {
    pub fn new(events: EventSinkHandle) -> Self {
        Self {
            events,
        }
    }

    fn hand_off(&self, target: &InstallTarget, action: HandoffAction) -> Result<()> {
        debug!(
            "Handing {} of {} from repo {} to the installer",
            action, target.package.name, target.package.repo
        );
        debug!(
            "Metadata fields of {}: {}",
            target.package.name,
            target.metadata.keys().join(", ")
        );
        self.events.emit(DashEvent::InstallHandoff {
            package: target.package.name.clone(),
            repo: target.package.repo.clone(),
            action,
        });
        Ok(())
    }
}

impl Installer for HandoffInstaller {
    fn install(&self, target: &InstallTarget) -> Result<()> {
        self.hand_off(target, HandoffAction::Install)
    }

    fn remove(&self, target: &InstallTarget) -> Result<()> {
        self.hand_off(target, HandoffAction::Remove)
    }

    fn update(&self, target: &InstallTarget) -> Result<()> {
        self.hand_off(target, HandoffAction::Update)
    }
}

impl RepoCollection {
    /// Resolves `package`, fetches its metadata from the chosen repository and
    /// passes both to `installer` for `action`.
    pub async fn hand_off(
        &self,
        installer: &dyn Installer,
        action: HandoffAction,
        package: &str,
        selector: Option<&str>,
    ) -> Result<InstallTarget> {
        let resolved = self.resolve(package, selector).await?;
        let metadata = self.get(&resolved.name, &resolved.repo).await?;
        let target = InstallTarget {
            package: resolved,
            metadata,
        };

        match action {
            HandoffAction::Install => installer.install(&target)?,
            HandoffAction::Remove => installer.remove(&target)?,
            HandoffAction::Update => installer.update(&target)?,
        }

        Ok(target)
    }
}
