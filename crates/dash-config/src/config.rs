use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info, warn};

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    error::{ConfigError, Result},
    repository::Repository,
    utils::{parse_duration, xdg_config_home},
};

pub const DEFAULT_TIMEOUT: &str = "30s";
pub const DEFAULT_PARALLEL_LIMIT: usize = 4;
pub const DEFAULT_MAX_BODY_SIZE: u64 = 256 * 1024 * 1024;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "DASH_CONFIG";

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Timeout applied to every HTTP request (e.g., "10s", "1m", "1m30s").
    /// Default: "30s"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Maximum number of repositories queried at the same time.
    /// Default: 4
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_limit: Option<usize>,

    /// User agent sent with every request.
    /// Default: "dash/<version>"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Largest response body accepted from a repository, in bytes.
    /// Default: 268435456 (256 MiB)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_size: Option<u64>,

    /// List of configured repositories, queried in the order they appear.
    #[serde(default)]
    pub repos: Vec<Repository>,
}

/// On-disk format of a configuration file, chosen by its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Location of the configuration file: `$DASH_CONFIG`, or
/// `$XDG_CONFIG_HOME/dash/config.toml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => xdg_config_home().join("dash").join("config.toml"),
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT.to_string()),
            parallel_limit: Some(DEFAULT_PARALLEL_LIMIT),
            user_agent: None,
            max_body_size: None,
            repos: Vec::new(),
        }
    }

    /// Loads and validates the configuration stored at `path`.
    ///
    /// A missing file is bootstrapped with the default configuration (no
    /// repositories): an annotated document for TOML, `{"repos": []}` for
    /// JSON. Failing to write that file only produces a warning.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading config file");

        let mut config = match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, ConfigFormat::from_path(path))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Config file {} not found, using an empty repository list",
                    path.display()
                );
                let config = match ConfigFormat::from_path(path) {
                    ConfigFormat::Toml => Self::default_config(),
                    ConfigFormat::Json => Self::default(),
                };
                if let Err(err) = config.save(path) {
                    warn!("Failed to create default config file: {err}");
                }
                config
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        Ok(config)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Fills in defaults and validates every value.
    ///
    /// Duplicate repository names are allowed: the repository registered last
    /// replaces the earlier one.
    pub fn resolve(&mut self) -> Result<()> {
        self.timeout.get_or_insert_with(|| DEFAULT_TIMEOUT.to_string());
        let parallel_limit = *self.parallel_limit.get_or_insert(DEFAULT_PARALLEL_LIMIT);
        if parallel_limit == 0 {
            return Err(ConfigError::InvalidParallelLimit(parallel_limit));
        }
        self.timeout_duration()?;
        if self.max_body_size == Some(0) {
            return Err(ConfigError::InvalidMaxBodySize(0));
        }

        let mut seen_repos = HashSet::new();
        for repo in &mut self.repos {
            repo.validate()?;
            repo.enabled.get_or_insert(true);

            if !seen_repos.insert(repo.name.clone()) {
                warn!(
                    "Repository '{}' is defined more than once; the last definition wins",
                    repo.name
                );
            }
        }

        Ok(())
    }

    pub fn timeout_duration(&self) -> Result<Duration> {
        let value = self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        match parse_duration(value) {
            Some(millis) if millis > 0 => {
                Ok(Duration::from_millis(
                    u64::try_from(millis).unwrap_or(u64::MAX),
                ))
            }
            _ => Err(ConfigError::InvalidTimeout(value.to_string())),
        }
    }

    pub fn parallel_limit(&self) -> usize {
        self.parallel_limit.unwrap_or(DEFAULT_PARALLEL_LIMIT).max(1)
    }

    pub fn max_body_size(&self) -> u64 {
        self.max_body_size.unwrap_or(DEFAULT_MAX_BODY_SIZE)
    }

    /// Enabled repositories, in configuration order.
    pub fn enabled_repos(&self) -> impl Iterator<Item = &Repository> {
        self.repos.iter().filter(|repo| repo.is_enabled())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let serialized = match ConfigFormat::from_path(path) {
            ConfigFormat::Toml => self.to_annotated_document()?.to_string(),
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(repos) = doc
            .get_mut("repos")
            .and_then(|item| item.as_array_of_tables_mut())
        {
            annotate_toml_array_of_tables::<Repository>(repos)?;
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::with_env;

    fn repo(name: &str, url: &str) -> Repository {
        Repository::new(name, url)
    }

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.timeout.as_deref(), Some("30s"));
        assert_eq!(config.parallel_limit, Some(4));
        assert!(config.user_agent.is_none());
        assert!(config.repos.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
            timeout = "5s"

            [[repos]]
            name = "A"
            url = "http://a/x"

            [[repos]]
            name = "B"
            url = "http://b/y"
            enabled = false
        "#;
        let mut config = Config::parse(content, ConfigFormat::Toml).unwrap();
        config.resolve().unwrap();

        assert_eq!(config.repos.len(), 2);
        assert_eq!(config.timeout_duration().unwrap(), Duration::from_secs(5));
        assert_eq!(config.parallel_limit(), DEFAULT_PARALLEL_LIMIT);

        let enabled: Vec<_> = config.enabled_repos().map(|r| r.name.as_str()).collect();
        assert_eq!(enabled, vec!["A"]);
    }

    #[test]
    fn test_parse_json() {
        let content = r#"{"repos": [{"name": "main", "url": "https://example.com/main"}]}"#;
        let mut config = Config::parse(content, ConfigFormat::Json).unwrap();
        config.resolve().unwrap();

        assert_eq!(config.repos, vec![Repository {
            enabled: Some(true),
            ..repo("main", "https://example.com/main")
        }]);
    }

    #[test]
    fn test_parse_missing_repos_key() {
        let config = Config::parse("timeout = \"1m\"", ConfigFormat::Toml).unwrap();
        assert!(config.repos.is_empty());
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("/etc/dash/config.json")),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.JSON")),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.toml")),
            ConfigFormat::Toml
        );
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Toml);
    }

    #[test]
    fn test_resolve_sets_defaults() {
        let mut config = Config {
            repos: vec![repo("main", "https://example.com")],
            ..Config::default()
        };
        config.resolve().unwrap();

        assert_eq!(config.timeout.as_deref(), Some(DEFAULT_TIMEOUT));
        assert_eq!(config.parallel_limit, Some(DEFAULT_PARALLEL_LIMIT));
        assert_eq!(config.repos[0].enabled, Some(true));
    }

    #[test]
    fn test_resolve_rejects_invalid_repository() {
        let mut config = Config {
            repos: vec![repo("main", "not a url")],
            ..Config::default_config()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidRepositoryUrl { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_invalid_timeout() {
        for timeout in ["soon", "0s", "10"] {
            let mut config = Config {
                timeout: Some(timeout.to_string()),
                ..Config::default_config()
            };
            assert!(
                matches!(config.resolve(), Err(ConfigError::InvalidTimeout(_))),
                "timeout {timeout:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_zero_parallel_limit() {
        let mut config = Config {
            parallel_limit: Some(0),
            ..Config::default_config()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidParallelLimit(0))
        ));
    }

    #[test]
    fn test_resolve_allows_duplicate_names() {
        let mut config = Config {
            repos: vec![
                repo("dup", "https://one.example.com"),
                repo("dup", "https://two.example.com"),
            ],
            ..Config::default_config()
        };
        config.resolve().unwrap();

        let urls: Vec<_> = config.enabled_repos().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://one.example.com", "https://two.example.com"]);
    }

    #[test]
    fn test_resolve_rejects_zero_max_body_size() {
        let mut config = Config {
            max_body_size: Some(0),
            ..Config::default_config()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidMaxBodySize(0))
        ));
        assert_eq!(Config::default_config().max_body_size(), DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn test_load_existing_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[[repos]]\nname = \"main\"\nurl = \"https://example.com/main\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.repos.len(), 1);
        assert_eq!(config.repos[0].name, "main");
    }

    #[test]
    fn test_load_missing_file_bootstraps_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(&path).unwrap();
        assert!(config.repos.is_empty());
        assert!(path.exists());

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.timeout, config.timeout);
        assert_eq!(reloaded.parallel_limit, config.parallel_limit);
    }

    #[test]
    fn test_load_missing_json_bootstraps_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::load(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, serde_json::json!({ "repos": [] }));
        assert_eq!(config.timeout.as_deref(), Some(DEFAULT_TIMEOUT));
        assert_eq!(config.parallel_limit(), DEFAULT_PARALLEL_LIMIT);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "repos = [[[").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config {
            repos: vec![repo("main", "https://example.com/main")],
            ..Config::default_config()
        };
        let doc = config.to_annotated_document().unwrap();
        let parsed = Config::parse(&doc.to_string(), ConfigFormat::Toml).unwrap();

        assert_eq!(parsed.repos, config.repos);
        assert_eq!(parsed.timeout, config.timeout);
    }

    #[test]
    #[serial]
    fn test_default_config_path_env_override() {
        with_env(&[(CONFIG_ENV, Some("/custom/dash.json"))], || {
            assert_eq!(default_config_path(), PathBuf::from("/custom/dash.json"));
        });
    }

    #[test]
    #[serial]
    fn test_default_config_path_xdg() {
        with_env(
            &[(CONFIG_ENV, None), ("XDG_CONFIG_HOME", Some("/tmp/xdg"))],
            || {
                assert_eq!(
                    default_config_path(),
                    PathBuf::from("/tmp/xdg/dash/config.toml")
                );
            },
        );
    }
}
