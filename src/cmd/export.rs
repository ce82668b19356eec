//! JSON export (`roadmap export`).

use std::path::Path;

use anyhow::{Context, Result};

use roadmap::config::RoadmapConfig;
use roadmap::store::export_document;

use super::{open_store, print_missing};

/// Exports what is on disk; an unreadable file is an error rather than an
/// empty export.
pub fn cmd_export(config: &RoadmapConfig, output: Option<&Path>) -> Result<()> {
    let store = open_store(config);
    if !store.exists() {
        print_missing(&store);
        return Ok(());
    }
    let document = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?;
    let json = export_document(&document.roadmap)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported roadmap to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
