use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn default_catalog_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("unable to resolve config directory")?;
    Ok(base.join("storyreel").join("stories.json"))
}

pub fn default_log_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join("storyreel").join("storyreel.log"))
}
