use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing::info;

use super::Catalog;

/// Load the catalog from `path`, or fall back to the embedded catalog.
///
/// The catalog is validated before it is returned, so a broken data file
/// stops the program at startup instead of surfacing mid-voyage.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        let catalog = Catalog::embedded().context("embedded catalog is invalid")?;
        info!(routes = catalog.schedule_len(), "Loaded embedded catalog");
        return Ok(catalog);
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let catalog = Catalog::from_json(&contents)
        .with_context(|| format!("invalid catalog {}", path.display()))?;
    info!(
        path = %path.display(),
        routes = catalog.schedule_len(),
        locations = catalog.fish.len(),
        "Loaded catalog"
    );
    Ok(catalog)
}
