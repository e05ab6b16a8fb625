use std::{fmt, sync::Arc};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::debug;

use crate::{
    catalog::Catalog,
    error::{RegistryError, Result},
    http_client::Fetch,
    metadata::PackageMetadata,
};

/// Characters escaped when a package name is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A single remote package repository.
///
/// Repositories are cheap to clone; the HTTP capability is shared.
#[derive(Clone)]
pub struct Repository {
    name: String,
    url: String,
    client: Arc<dyn Fetch>,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: Arc<dyn Fetch>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }

    pub fn from_config(repo: &dash_config::repository::Repository, client: Arc<dyn Fetch>) -> Self {
        Self::new(&repo.name, &repo.url, client)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Human-readable summary, e.g. `Package Repo main @ https://pkgs.example.com`.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// URL of the metadata document for `package`.
    pub fn package_url(&self, package: &str) -> Result<String> {
        validate_package_name(package)?;
        Ok(format!(
            "{}/packages/{}.json",
            self.base_url(),
            utf8_percent_encode(package, PATH_SEGMENT)
        ))
    }

    /// URL of the catalog document.
    pub fn catalog_url(&self) -> String {
        format!("{}/all.json", self.base_url())
    }

    /// Whether `package` is published by this repository.
    ///
    /// Only HTTP 404 means absence. Any other non-2xx status is an error.
    pub fn exists(&self, package: &str) -> Result<bool> {
        let url = self.package_url(package)?;
        debug!("Checking if package {} exists in repo {}...", package, self.name);

        let response = self.client.get(&url)?;
        if response.is_not_found() {
            debug!("Package {} not found in repo {}", package, self.name);
            return Ok(false);
        }
        if !response.is_success() {
            return Err(RegistryError::UnexpectedStatus {
                url,
                status: response.status,
            });
        }

        debug!("Package {} exists in repo {}", package, self.name);
        Ok(true)
    }

    /// Fetches the metadata document of `package`.
    pub fn get(&self, package: &str) -> Result<PackageMetadata> {
        if !self.exists(package)? {
            return Err(self.not_found(package));
        }

        let url = self.package_url(package)?;
        debug!("Getting package {} from repo {}...", package, self.name);

        let response = self.client.get(&url)?;
        if response.is_not_found() {
            return Err(self.not_found(package));
        }
        if !response.is_success() {
            return Err(RegistryError::UnexpectedStatus {
                url,
                status: response.status,
            });
        }

        let metadata = PackageMetadata::from_slice(&url, &response.body)?;
        debug!("Got package {} from repo {}", package, self.name);
        Ok(metadata)
    }

    /// Fetches and parses the repository catalog.
    pub fn catalog(&self) -> Result<Catalog> {
        let url = self.catalog_url();
        debug!("Fetching catalog of repo {} from {}", self.name, url);

        let response = self.client.get(&url)?;
        if !response.is_success() {
            return Err(RegistryError::UnexpectedStatus {
                url,
                status: response.status,
            });
        }

        Catalog::from_slice(&url, &response.body)
    }

    /// Package names containing `term`, in catalog order.
    pub fn search(&self, term: &str) -> Result<Vec<String>> {
        debug!("Searching repo {} for {:?}", self.name, term);
        Ok(self.catalog()?.search(term))
    }

    /// Every package name in the catalog.
    pub fn list(&self) -> Result<Vec<String>> {
        debug!("Listing packages in repo {}", self.name);
        Ok(self.catalog()?.into_names())
    }

    fn not_found(&self, package: &str) -> RegistryError {
        RegistryError::PackageNotFound {
            package: package.to_string(),
            repo: self.name.clone(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Package Repo {} @ {}", self.name, self.url)
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

pub(crate) fn validate_package_name(package: &str) -> Result<()> {
    if package.is_empty() {
        return Err(RegistryError::InvalidPackageName(package.to_string()));
    }
    Ok(())
}
