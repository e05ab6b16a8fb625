use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Defines a remote repository that serves package metadata.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Repository {
    /// Unique name of the repository.
    pub name: String,

    /// Base URL of the repository.
    /// Package metadata is read from `<url>/packages/<package>.json`
    /// and the catalog from `<url>/all.json`.
    pub url: String,

    /// Whether the repository is enabled.
    /// Default: true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            enabled: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Checks the name and base URL of the repository.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty()
            || self.name.contains('/')
            || self.name.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::InvalidRepository(self.name.clone()));
        }

        let invalid_url = || {
            ConfigError::InvalidRepositoryUrl {
                name: self.name.clone(),
                url: self.url.clone(),
            }
        };
        let parsed = Url::parse(&self.url).map_err(|_| invalid_url())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(invalid_url());
        }

        Ok(())
    }
}
