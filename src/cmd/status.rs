//! Progress overview and divergence check (`roadmap status`, `roadmap check`).

use anyhow::Result;
use console::{StyledObject, style};

use roadmap::config::RoadmapConfig;
use roadmap_core::projection::{divergent_nodes, summary};
use roadmap_core::{Status, compute_progress};

use super::load_roadmap;

fn styled_status(status: Status) -> StyledObject<&'static str> {
    let label = style(status.label());
    match status {
        Status::NotStarted => label.dim(),
        Status::InProgress => label.cyan(),
        Status::Review => label.magenta(),
        Status::Completed => label.green(),
        Status::Blocked => label.red(),
    }
}

pub fn cmd_status(config: &RoadmapConfig) -> Result<()> {
    let Some(roadmap) = load_roadmap(config) else {
        return Ok(());
    };
    let s = summary(&roadmap);

    println!();
    println!("{}", style(&s.title).bold());
    println!("{}", "=".repeat(s.title.chars().count()));
    println!();
    println!("Overall progress: {}%", s.progress);
    println!(
        "Items:            {} ({} validated)",
        s.total_items, s.validated_items
    );
    println!("Active axes:      {} of {}", s.active_axes, s.total_axes);
    if s.divergent_items > 0 {
        println!(
            "Divergent items:  {} (run 'roadmap check')",
            style(s.divergent_items).yellow()
        );
    }
    println!();

    if roadmap.root().children.is_empty() {
        println!("No axes yet.");
        println!();
        return Ok(());
    }

    println!("{:<48} {:>8}  Status", "Axis", "Progress");
    println!("{:<48} {:>8}  ------", "-".repeat(48), "--------");
    for axis in &roadmap.root().children {
        println!(
            "{:<48} {:>7}%  {}",
            axis.title,
            compute_progress(axis),
            styled_status(axis.effective_status())
        );
    }
    println!();
    Ok(())
}

/// Fails when any item's status disagrees with its progress, so the
/// command can gate CI.
pub fn cmd_check(config: &RoadmapConfig) -> Result<()> {
    let Some(roadmap) = load_roadmap(config) else {
        return Ok(());
    };
    let divergent = divergent_nodes(&roadmap);

    if divergent.is_empty() {
        println!("{} No divergent items.", style("✓").green());
        return Ok(());
    }

    println!();
    println!("{} divergent item(s):", divergent.len());
    println!();
    for item in &divergent {
        println!(
            "  {} {} [{}] {}",
            style("!").yellow(),
            item.title,
            item.id,
            item.message
        );
        println!("      suggested: {}", styled_status(item.suggested));
    }
    println!();

    anyhow::bail!(
        "{} item(s) have a status that disagrees with their progress",
        divergent.len()
    )
}
