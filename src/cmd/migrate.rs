//! Schema backfill (`roadmap migrate`).

use anyhow::{Context, Result};
use console::style;

use roadmap::config::RoadmapConfig;

use super::{open_store, print_missing};

pub fn cmd_migrate(config: &RoadmapConfig, dry_run: bool) -> Result<()> {
    let store = open_store(config);
    if !store.exists() {
        print_missing(&store);
        return Ok(());
    }

    let result = if dry_run {
        store.plan_migration()
    } else {
        store.migrate()
    };
    let report =
        result.with_context(|| format!("Failed to migrate {}", store.path().display()))?;

    if report.is_noop() {
        println!("Roadmap schema is up to date. Nothing to migrate.");
        return Ok(());
    }

    let verb = if dry_run { "Would backfill" } else { "Backfilled" };
    println!(
        "{} status on {} node(s) and progressWeight on {} node(s)",
        verb, report.statuses_backfilled, report.weights_backfilled
    );
    if dry_run {
        println!("{}", style("Dry run: nothing was written.").dim());
    }
    Ok(())
}
