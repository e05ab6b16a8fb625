use std::fmt;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Resolve a package and hand it to the installer
    Install,
    /// Resolve a package and hand its removal to the installer
    Remove,
    /// Resolve a package and hand its update to the installer
    Update,
    /// Search repository catalogs for package names containing the query
    Search,
    /// List every package in every repository
    List,
    /// Show the metadata of a package
    Info,
}

impl Action {
    pub fn requires_query(&self) -> bool {
        !matches!(self, Self::List)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Search => "search",
            Self::List => "list",
            Self::Info => "info",
        };
        f.write_str(name)
    }
}

#[derive(Parser)]
#[command(
    name = "dash",
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Action to perform
    #[arg(value_enum)]
    pub action: Action,

    /// Package name, or search term for `search`
    pub query: Option<String>,

    /// Repository to use, required when a package exists in several
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, env = "DASH_CONFIG")]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P')]
    pub proxy: Option<String>,

    /// Set request headers
    #[arg(required = false, long, short = 'H')]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A')]
    pub user_agent: Option<String>,

    /// Timeout for each HTTP request (e.g. 10s, 1m30s)
    #[arg(long)]
    pub timeout: Option<String>,
}
