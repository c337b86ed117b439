//! Command handlers for browsing and importing business listings.

use std::path::Path;

use anyhow::Context;
use bizdash_catalog::payload::{parse_payload, records_from};
use bizdash_catalog::{merge_into_file, Dashboard, LoadOutcome, Source, SourceClient};
use bizdash_core::{AppConfig, SortKey};

use crate::render;

/// Loads the catalog from `source` (or the configured default) into a fresh
/// dashboard.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the load fails.
/// With no earlier list to fall back on, a failed load is fatal here.
async fn load_dashboard(config: &AppConfig, source: Option<&str>) -> anyhow::Result<Dashboard> {
    let client = SourceClient::from_app_config(config)?;
    let source = Source::parse(&source.map_or_else(|| config.source_or_data_path(), String::from));

    let mut dashboard = Dashboard::default();
    match dashboard.load(&client, &source).await {
        LoadOutcome::Failed { error } => {
            anyhow::bail!("failed to load businesses from {source}: {error}")
        }
        outcome => tracing::info!(%source, ?outcome, "catalog loaded"),
    }
    Ok(dashboard)
}

/// Print the listable businesses matching `filter`, ordered by `sort`.
pub(crate) async fn run_list(
    config: &AppConfig,
    source: Option<&str>,
    filter: &str,
    sort: SortKey,
) -> anyhow::Result<()> {
    let dashboard = load_dashboard(config, source).await?;
    let views: Vec<_> = dashboard.query(filter, sort).collect();

    if views.is_empty() {
        println!(
            "no businesses found{}",
            if filter.trim().is_empty() {
                String::new()
            } else {
                format!(" matching \"{}\"", filter.trim())
            }
        );
        return Ok(());
    }

    print!("{}", render::render_list(&views));
    println!(
        "{} of {} businesses shown",
        views.len(),
        dashboard.catalog().len()
    );
    Ok(())
}

/// Print the detail panel for the business with `id`.
pub(crate) async fn run_show(
    config: &AppConfig,
    source: Option<&str>,
    id: &str,
) -> anyhow::Result<()> {
    let mut dashboard = load_dashboard(config, source).await?;
    let view = dashboard.select_detail(id)?;
    print!("{}", render::render_detail(view));
    Ok(())
}

/// Merge the batch in `file` into the data file at `into`.
///
/// # Errors
///
/// Returns an error if `file` cannot be read or is not JSON, or if the data
/// file cannot be read or written.
pub(crate) async fn run_import(file: &Path, into: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let incoming = records_from(parse_payload(&bytes, &file.display().to_string())?);
    let received = incoming.len();

    let outcome = merge_into_file(into, incoming).await?;
    println!(
        "import: {received} received, {} added, {} skipped as duplicates, {} total in {}",
        outcome.added,
        outcome.skipped,
        outcome.total,
        into.display()
    );
    Ok(())
}
