use clap::Parser;
use cli::{Action, Args};
use dash_events::HandoffAction;
use error::{CliError, CliResult};
use info::show_package;
use install::hand_off_package;
use list::{list_packages, search_packages};
use logging::setup_logging;
use state::AppState;
use tracing::debug;
use utils::set_color;

mod cli;
mod error;
mod info;
mod install;
mod list;
mod logging;
mod sink;
mod state;
mod utils;

async fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_color(false);
    }

    let action = args.action;
    let query = args.query.as_deref();
    let repo = args.repo.as_deref();

    if action.requires_query() && query.is_none() {
        return Err(CliError::MissingQuery(action));
    }

    let state = AppState::new(&args)?;
    debug!(
        "running {} action with {} of {} configured repositories",
        action,
        state.collection().len(),
        state.config().repos.len()
    );

    // Queries are checked above for every action except list.
    let query = query.unwrap_or_default();
    match action {
        Action::Install => hand_off_package(&state, HandoffAction::Install, query, repo).await?,
        Action::Remove => hand_off_package(&state, HandoffAction::Remove, query, repo).await?,
        Action::Update => hand_off_package(&state, HandoffAction::Update, query, repo).await?,
        Action::Search => search_packages(&state, query, repo).await?,
        Action::List => list_packages(&state, repo).await?,
        Action::Info => show_package(&state, query, repo).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
