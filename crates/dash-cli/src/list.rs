use dash_registry::RepoResults;
use nu_ansi_term::Color::{Blue, Cyan, Green, Red};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{debug, error, info, warn};

use crate::{
    cli::Action,
    error::{CliError, CliResult},
    state::AppState,
    utils::Colored,
};

pub async fn search_packages(state: &AppState, term: &str, repo: Option<&str>) -> CliResult<()> {
    debug!(term = term, repo = ?repo, "searching packages");

    let results = match repo {
        Some(repo) => {
            let names = state.collection().search_in(term, repo).await?;
            RepoResults::from_iter([(repo.to_string(), Ok(names))])
        }
        None => state.collection().search(term).await?,
    };

    print_results(Action::Search, "Search Results", &results)
}

pub async fn list_packages(state: &AppState, repo: Option<&str>) -> CliResult<()> {
    debug!(repo = ?repo, "listing packages");

    let results = match repo {
        Some(repo) => {
            let names = state.collection().list_in(repo).await?;
            RepoResults::from_iter([(repo.to_string(), Ok(names))])
        }
        None => state.collection().list().await?,
    };

    print_results(Action::List, "Packages", &results)
}

fn print_results(action: Action, title: &str, results: &RepoResults<Vec<String>>) -> CliResult<()> {
    if results.is_empty() {
        warn!("No repositories configured");
        return Ok(());
    }

    for (repo, result) in results.iter() {
        let prefix = Colored(Green, format!("[{repo}]"));
        match result {
            Ok(names) => {
                for name in names {
                    info!("{} {}", prefix, Colored(Blue, name));
                }
            }
            Err(err) => error!("{} {}", prefix, err),
        }
    }

    info!("\n{}", summary_table(title, results));

    if results.all_failed() {
        return Err(CliError::AllRepositoriesFailed(action));
    }

    let failed = results.failures().count();
    if failed > 0 {
        warn!(
            "{} of {} repositories could not be queried",
            failed,
            results.len()
        );
    }

    Ok(())
}

fn summary_table(title: &str, results: &RepoResults<Vec<String>>) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Repository", "Packages", "Status"]);

    for (repo, result) in results.iter() {
        let (count, status) = match result {
            Ok(names) => (names.len().to_string(), format!("{}", Colored(Cyan, "ok"))),
            Err(_) => ("-".to_string(), format!("{}", Colored(Red, "failed"))),
        };
        builder.push_record([format!("{}", Colored(Green, repo)), count, status]);
    }

    let total: usize = results.successes().map(|(_, names)| names.len()).sum();
    builder.push_record(["Total".to_string(), total.to_string(), String::new()]);

    builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string()
}
