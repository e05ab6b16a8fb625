//! Package lookup across remote repositories.
//!
//! A [`Repository`] answers questions about a single remote repository over
//! HTTP. A [`RepoCollection`] asks all of them at once, keeps per-repository
//! failures apart from results, and decides which repository a package action
//! applies to.
//!
//! # Wire format
//!
//! - `GET <url>/packages/<package>.json`: metadata of one package. A 404
//!   answer means the repository does not serve the package.
//! - `GET <url>/all.json`: the catalog of every package name.

pub mod catalog;
pub mod collection;
pub mod error;
pub mod http_client;
pub mod install;
pub mod metadata;
pub mod repository;
pub mod resolve;

#[cfg(test)]
pub mod test_utils;

pub use catalog::Catalog;
pub use collection::{Lookup, Presence, RepoCollection, RepoResults};
pub use error::{RegistryError, Result};
pub use http_client::{ClientConfig, Fetch, FetchResponse, HttpClient};
pub use install::{HandoffInstaller, InstallTarget, Installer};
pub use metadata::PackageMetadata;
pub use repository::Repository;
pub use resolve::ResolvedPackage;
