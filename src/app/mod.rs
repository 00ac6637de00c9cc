mod format;
mod tui;


use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::catalog::{Catalog, CatalogSource, load_catalog};
use crate::cli::{Cli, Command};
use crate::paths::default_catalog_path;

use self::format::{format_posted_age, truncate};

const CATALOG_ENV: &str = "STORYREEL_CATALOG";

pub fn run(cli: Cli) -> Result<()> {
    let source =
        resolve_catalog_source(cli.catalog.as_deref(), std::env::var(CATALOG_ENV).ok())?;
    let parsed =
        load_catalog(&source).with_context(|| format!("failed to load stories from {source}"))?;
    info!(%source, authors = parsed.catalog.len(), skipped = parsed.skipped, "catalog ready");
    let catalog = Arc::new(parsed.catalog);

    match cli.command {
        Some(Command::List) => run_list(&catalog, parsed.skipped),
        Some(Command::View { index }) => tui::run_tui(catalog, Some(index)),
        Some(Command::Tui) | None => tui::run_tui(catalog, None),
    }
}

/// `--catalog` wins over the environment, which wins over the config-dir default.
fn resolve_catalog_source(flag: Option<&str>, env_value: Option<String>) -> Result<CatalogSource> {
    if let Some(flag) = flag.filter(|value| !value.trim().is_empty()) {
        return Ok(CatalogSource::from_arg(flag));
    }
    if let Some(value) = env_value.filter(|value| !value.trim().is_empty()) {
        return Ok(CatalogSource::from_arg(&value));
    }
    Ok(CatalogSource::File(default_catalog_path()?))
}

fn run_list(catalog: &Catalog, skipped: usize) -> Result<()> {
    println!(
        "{:<6} {:<20} {:<28} {:<8} {:<8}",
        "INDEX", "ID", "NAME", "STORIES", "POSTED"
    );
    let now = Utc::now();
    for (index, author) in catalog.authors().iter().enumerate() {
        println!(
            "{:<6} {:<20} {:<28} {:<8} {:<8}",
            index,
            truncate(author.id.as_str(), 20),
            truncate(&author.display_name, 28),
            author.stories.len(),
            format_posted_age(author.posted_at, now)
        );
    }
    if skipped > 0 {
        let noun = if skipped == 1 { "entry" } else { "entries" };
        println!("\nSkipped {skipped} malformed author {noun}.");
    }
    Ok(())
}
