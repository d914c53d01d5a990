//! TOML loading for the equipment catalog.
//!
//! - `default_catalog()` - the catalog embedded at compile time
//! - `load_catalog(path)` - a catalog file supplied at startup

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use super::types::CatalogFile;
use super::Catalog;

/// Default catalog embedded in the binary, from `config/catalog.toml`.
const DEFAULT_CATALOG: &str = include_str!("../../config/catalog.toml");

/// Parse and validate catalog TOML text.
///
/// Fails on malformed TOML, on categories outside the vocabulary, and on any
/// cross-item inconsistency found by [`super::validate_items`].
pub fn parse_catalog(content: &str) -> Result<Catalog> {
    let file: CatalogFile = toml::from_str(content).context("Catalog TOML is malformed")?;
    let catalog = Catalog::from_items(file.items)?;
    Ok(catalog)
}

/// Load a catalog from a TOML file at the given path.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let catalog = parse_catalog(&content)
        .with_context(|| format!("Invalid catalog in {}", path.display()))?;
    info!("Loaded {} catalog items from {:?}", catalog.len(), path);
    Ok(catalog)
}

/// Get the catalog embedded in the binary.
///
/// # Panics
/// Panics if the embedded catalog is invalid (a build-time data bug).
pub fn default_catalog() -> Catalog {
    parse_catalog(DEFAULT_CATALOG).expect("embedded catalog.toml must be a valid catalog")
}
