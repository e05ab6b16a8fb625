use dash_events::HandoffAction;
use nu_ansi_term::Color::{Blue, Cyan, Green};
use tracing::{debug, info};

use crate::{error::CliResult, state::AppState, utils::Colored};

/// Resolves `package` and hands it to the installer for `action`.
///
/// `remove` and `update` go through the same resolution as `install`, since
/// there is no local record of installed packages to consult.
pub async fn hand_off_package(
    state: &AppState,
    action: HandoffAction,
    package: &str,
    repo: Option<&str>,
) -> CliResult<()> {
    debug!(package = package, repo = ?repo, %action, "handing off package");

    let target = state
        .collection()
        .hand_off(state.installer(), action, package, repo)
        .await?;

    let version = target
        .metadata
        .str_field("version")
        .map(|version| format!(":{}", Colored(Cyan, version)))
        .unwrap_or_default();

    info!(
        "{} {}{} from repo {}",
        verb(action),
        Colored(Blue, &target.package.name),
        version,
        Colored(Green, &target.package.repo)
    );

    Ok(())
}

fn verb(action: HandoffAction) -> &'static str {
    match action {
        HandoffAction::Install => "Installing",
        HandoffAction::Remove => "Removing",
        HandoffAction::Update => "Updating",
    }
}
