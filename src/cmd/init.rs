//! Data file initialization (`roadmap init`).

use anyhow::{Context, Result};
use console::style;

use roadmap::config::RoadmapConfig;

use super::open_store;

pub fn cmd_init(config: &RoadmapConfig, force: bool) -> Result<()> {
    let store = open_store(config);
    let existed = store.exists();
    let written = store
        .initialize(force)
        .context("Failed to initialize roadmap data file")?;

    if !written {
        println!("Roadmap already initialized at {}", store.path().display());
        println!("Use --force to replace it with the sample roadmap.");
        return Ok(());
    }

    if existed {
        println!(
            "{} Replaced {} with the sample roadmap",
            style("!").yellow(),
            store.path().display()
        );
    } else {
        println!(
            "{} Initialized roadmap at {}",
            style("✓").green(),
            store.path().display()
        );
    }
    println!();
    println!("Next steps:");
    println!("  1. Run `roadmap status` to see progress per axis");
    println!("  2. Run `roadmap serve --open` to edit it in the browser");
    Ok(())
}
