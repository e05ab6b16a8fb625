use std::{env, path::PathBuf, sync::Arc, time::Duration};

use dash_config::{
    config::{default_config_path, Config},
    utils::parse_duration,
};
use dash_events::EventSinkHandle;
use dash_registry::{ClientConfig, Fetch, HandoffInstaller, HttpClient, RepoCollection};
use tracing::{debug, trace};
use ureq::Proxy;

use crate::{
    cli::Args,
    error::{CliError, CliResult, ErrorContext},
    sink::TracingSink,
    utils::parse_headers,
};

/// Everything a command needs: the loaded configuration, the repository
/// collection built from it and the installer collaborator.
pub struct AppState {
    config: Config,
    collection: RepoCollection,
    installer: HandoffInstaller,
}

impl AppState {
    pub fn new(args: &Args) -> CliResult<Self> {
        trace!("creating new AppState");
        let path = config_path(args.config.as_deref())?;
        let config = Config::load(&path)?;

        let client = client_config(args, &config)?;
        debug!(
            timeout = ?client.timeout,
            user_agent = ?client.user_agent,
            "configured http client"
        );
        let http: Arc<dyn Fetch> = Arc::new(HttpClient::new(&client));
        let events: EventSinkHandle = Arc::new(TracingSink);

        let collection = RepoCollection::from_config(&config, http, events.clone());
        debug!("{}", collection);

        Ok(Self {
            config,
            collection,
            installer: HandoffInstaller::new(events),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn collection(&self) -> &RepoCollection {
        &self.collection
    }

    pub fn installer(&self) -> &HandoffInstaller {
        &self.installer
    }
}

fn config_path(arg: Option<&str>) -> CliResult<PathBuf> {
    let Some(arg) = arg else {
        return Ok(default_config_path());
    };

    let path = PathBuf::from(arg);
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(env::current_dir()
        .with_context(|| "retrieving current directory".into())?
        .join(path))
}

/// HTTP settings: command-line flags first, then the configuration file.
pub fn client_config(args: &Args, config: &Config) -> CliResult<ClientConfig> {
    let timeout = match args.timeout.as_deref() {
        Some(value) => parse_timeout(value)?,
        None => config.timeout_duration()?,
    };

    let proxy = args
        .proxy
        .as_deref()
        .map(|proxy| Proxy::new(proxy).map_err(|_| CliError::InvalidProxy(proxy.to_string())))
        .transpose()?;

    let headers = args.header.as_deref().map(parse_headers).transpose()?;

    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.user_agent.clone())
        .or_else(|| ClientConfig::default().user_agent);

    Ok(ClientConfig {
        user_agent,
        headers,
        proxy,
        timeout: Some(timeout),
        max_body_size: Some(config.max_body_size()),
    })
}

fn parse_timeout(value: &str) -> CliResult<Duration> {
    match parse_duration(value) {
        Some(millis) if millis > 0 => {
            Ok(Duration::from_millis(
                u64::try_from(millis).unwrap_or(u64::MAX),
            ))
        }
        _ => Err(CliError::InvalidTimeout(value.to_string())),
    }
}
