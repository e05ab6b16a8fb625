use dash_registry::PackageMetadata;
use nu_ansi_term::Color::{Blue, Cyan, Green};
use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{debug, info};

use crate::{error::CliResult, state::AppState, utils::Colored};

pub async fn show_package(state: &AppState, package: &str, repo: Option<&str>) -> CliResult<()> {
    debug!(package = package, repo = ?repo, "querying package info");

    let resolved = state.collection().resolve(package, repo).await?;
    let metadata = state
        .collection()
        .get(&resolved.name, &resolved.repo)
        .await?;

    info!(
        "{} from repo {}",
        Colored(Blue, &resolved.name),
        Colored(Green, &resolved.repo)
    );

    match metadata_table(&resolved.name, &metadata) {
        Some(table) => info!("\n{table}"),
        None => info!("{}", metadata.to_pretty_string()),
    }

    Ok(())
}

/// Renders an object document as a field/value table; `None` for any other
/// JSON shape.
fn metadata_table(package: &str, metadata: &PackageMetadata) -> Option<String> {
    let fields = metadata.as_value().as_object()?;
    if fields.is_empty() {
        return None;
    }

    let mut builder = Builder::new();
    for (key, value) in fields {
        let value = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        builder.push_record([format!("{}", Colored(Cyan, key)), value]);
    }

    Some(
        builder
            .build()
            .with(Panel::header(package))
            .with(Style::rounded())
            .with(BorderCorrection {})
            .to_string(),
    )
}
