//! Configuration view and validation commands (`roadmap config`).

use anyhow::Result;

use roadmap::config::{RoadmapConfig, RoadmapToml};

use super::super::ConfigCommands;

pub fn cmd_config(config: &RoadmapConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = &config.config_path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Roadmap Configuration");
            println!("=====================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No roadmap.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();
            print_toml(&config.toml);

            println!("Effective values (with env/CLI overrides):");
            println!("  port = {}", config.port);
            println!("  data_file = \"{}\"", config.data_file.display());
            println!("  static_dir = \"{}\"", config.static_dir.display());
            println!("  log_filter = \"{}\"", config.log_filter);
            println!("  log_json = {}", config.log_json);
            println!();

            if !config_path.exists() {
                println!("Run 'roadmap config init' to create a roadmap.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No roadmap.toml found. Using defaults (valid).");
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("roadmap.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = config_path.parent().filter(|p| !p.exists()) {
                std::fs::create_dir_all(parent)?;
            }

            RoadmapToml::default().save(config_path)?;

            println!("Created roadmap.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] port, host, cors, static_dir");
            println!("  - [storage] data_file");
            println!("  - [roadmap] default_title, strict_transitions");
            println!("  - [logging] level, json, directory");
            println!();
        }
    }

    Ok(())
}

fn print_toml(toml: &RoadmapToml) {
    println!("[server]");
    println!("  port = {}", toml.server.port);
    println!("  host = \"{}\"", toml.server.host);
    println!("  cors = {}", toml.server.cors);
    println!("  static_dir = \"{}\"", toml.server.static_dir);
    println!();

    println!("[storage]");
    println!("  data_file = \"{}\"", toml.storage.data_file);
    println!();

    println!("[roadmap]");
    println!("  default_title = \"{}\"", toml.roadmap.default_title);
    println!("  strict_transitions = {}", toml.roadmap.strict_transitions);
    println!();

    println!("[logging]");
    println!("  level = \"{}\"", toml.logging.level);
    println!("  json = {}", toml.logging.json);
    if let Some(dir) = &toml.logging.directory {
        println!("  directory = \"{}\"", dir);
    }
    println!();
}
