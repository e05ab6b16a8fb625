use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(dash_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(dash_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("JSON configuration error: {0}")]
    #[diagnostic(
        code(dash_config::json),
        help("Check your config.json syntax; it must be an object with a `repos` list")
    )]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid repository name: {0:?}")]
    #[diagnostic(
        code(dash_config::invalid_repository),
        help("Repository names must be non-empty and cannot contain whitespace or '/'")
    )]
    InvalidRepository(String),

    #[error("Invalid URL for repository '{name}': {url}")]
    #[diagnostic(
        code(dash_config::invalid_repository_url),
        help("Use an absolute http:// or https:// base URL, e.g. https://pkgs.example.com/main")
    )]
    InvalidRepositoryUrl { name: String, url: String },

    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(dash_config::invalid_timeout),
        help("Use a duration such as \"30s\", \"1m\" or \"1m30s\"")
    )]
    InvalidTimeout(String),

    #[error("Invalid parallel limit: {0}")]
    #[diagnostic(
        code(dash_config::invalid_parallel_limit),
        help("parallel_limit must be at least 1")
    )]
    InvalidParallelLimit(usize),

    #[error("Invalid max body size: {0}")]
    #[diagnostic(
        code(dash_config::invalid_max_body_size),
        help("max_body_size is a byte count and must be at least 1")
    )]
    InvalidMaxBodySize(u64),

    #[error("IO error: {0}")]
    #[diagnostic(code(dash_config::io))]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(dash_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(dash_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
