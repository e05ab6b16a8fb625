use dash_config::error::ConfigError;
use dash_registry::RegistryError;
use miette::Diagnostic;
use thiserror::Error;

use crate::cli::Action;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error("Error while {action}")]
    #[diagnostic(code(dash::io))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The {0} action requires a package name")]
    #[diagnostic(
        code(dash::missing_query),
        help("Usage: dash {0} <package> [--repo <name>]")
    )]
    MissingQuery(Action),

    #[error("Every repository failed during {0}")]
    #[diagnostic(
        code(dash::all_repositories_failed),
        help("Check your network connection and the repository URLs in your configuration")
    )]
    AllRepositoriesFailed(Action),

    #[error("Invalid header: {0}")]
    #[diagnostic(code(dash::invalid_header), help("Headers must be given as 'Key: Value'"))]
    InvalidHeader(String),

    #[error("Invalid proxy: {0}")]
    #[diagnostic(
        code(dash::invalid_proxy),
        help("Use a proxy URL such as http://localhost:8080 or socks5://localhost:1080")
    )]
    InvalidProxy(String),

    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(dash::invalid_timeout),
        help("Use a positive duration such as 10s or 1m30s")
    )]
    InvalidTimeout(String),
}

pub type CliResult<T> = std::result::Result<T, CliError>;

/// Adds context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CliError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
