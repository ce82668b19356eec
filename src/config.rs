//! Configuration for the roadmap server.
//!
//! Settings are layered file → environment → CLI. The file is
//! `roadmap.toml` in the project directory; every key is optional.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! port = 3001
//! host = "127.0.0.1"
//! cors = true
//! static_dir = "public"
//!
//! [storage]
//! data_file = "data/roadmap.json"
//!
//! [roadmap]
//! default_title = "CustomGPT Expansion & Enhancement"
//! strict_transitions = false
//!
//! [logging]
//! level = "info"
//! json = false
//! directory = ".roadmap/logs"
//! ```
//!
//! Environment overrides: `PORT`, `ROADMAP_DATA_FILE`, `ROADMAP_LOG_JSON`
//! and `RUST_LOG` (wins over `logging.level`).

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "roadmap.toml";

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Permissive CORS so a front-end served elsewhere can call the API.
    #[serde(default = "default_true")]
    pub cors: bool,
    /// Directory of static front-end files, relative to the project.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors: true,
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapSection {
    /// Title given to a freshly seeded roadmap.
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Reject status changes outside the allowed transitions.
    #[serde(default)]
    pub strict_transitions: bool,
}

impl Default for RoadmapSection {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            strict_transitions: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Daily rolling log files are written here when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
        }
    }
}

fn default_port() -> u16 {
    3001
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_data_file() -> String {
    "data/roadmap.json".to_string()
}

fn default_title() -> String {
    roadmap_core::seed::DEFAULT_TITLE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of `roadmap.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadmapToml {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub roadmap: RoadmapSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl RoadmapToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse roadmap.toml")
    }

    /// Returns the default configuration if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize roadmap.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0: the OS will pick a random port".to_string());
        }
        if self.server.host != "localhost" && self.server.host.parse::<IpAddr>().is_err() {
            warnings.push(format!(
                "Invalid server.host '{}': expected an IP address or 'localhost'",
                self.server.host
            ));
        }
        if self.storage.data_file.trim().is_empty() {
            warnings.push("storage.data_file is empty".to_string());
        }
        if self.roadmap.default_title.trim().is_empty() {
            warnings.push("roadmap.default_title is empty".to_string());
        }
        if !is_valid_log_level(&self.logging.level) {
            warnings.push(format!(
                "Invalid logging.level '{}': should be one of {} or a filter directive",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }

        warnings
    }
}

/// Accepts a bare level or an env-filter style directive list
/// (`info,roadmap=debug`).
pub fn is_valid_log_level(level: &str) -> bool {
    let level = level.trim();
    if level.is_empty() {
        return false;
    }
    level.split(',').all(|directive| {
        let lvl = directive.rsplit('=').next().unwrap_or(directive).trim();
        LOG_LEVELS.contains(&lvl.to_lowercase().as_str())
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Effective configuration after environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct RoadmapConfig {
    pub project_dir: PathBuf,
    pub config_path: PathBuf,
    /// Parsed roadmap.toml (defaults when the file is absent)
    pub toml: RoadmapToml,
    pub port: u16,
    pub data_file: PathBuf,
    pub static_dir: PathBuf,
    pub log_filter: String,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
    /// Problems found while applying overrides.
    env_warnings: Vec<String>,
}

impl RoadmapConfig {
    /// Resolve configuration for `project_dir` from the process environment.
    pub fn new(project_dir: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        Self::resolve(project_dir, config_path, |key| std::env::var(key).ok())
    }

    /// Resolve configuration reading overrides through `env`.
    pub fn resolve(
        project_dir: PathBuf,
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_path = config_path.unwrap_or_else(|| project_dir.join(CONFIG_FILE));
        let toml = RoadmapToml::load_or_default(&config_path)?;
        let mut env_warnings = Vec::new();

        let port = match env("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                env_warnings.push(format!("Ignoring invalid PORT '{}'", raw));
                toml.server.port
            }),
            None => toml.server.port,
        };
        let data_file = env("ROADMAP_DATA_FILE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| toml.storage.data_file.clone());
        let log_json = match env("ROADMAP_LOG_JSON") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                env_warnings.push(format!("Ignoring invalid ROADMAP_LOG_JSON '{}'", raw));
                toml.logging.json
            }),
            None => toml.logging.json,
        };
        let log_filter = env("RUST_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| toml.logging.level.clone());

        Ok(Self {
            data_file: project_dir.join(data_file),
            static_dir: project_dir.join(&toml.server.static_dir),
            log_dir: toml.logging.directory.as_ref().map(|d| project_dir.join(d)),
            port,
            log_filter,
            log_json,
            config_path,
            project_dir,
            toml,
            env_warnings,
        })
    }

    /// Apply the `--port` flag.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn host(&self) -> &str {
        &self.toml.server.host
    }

    pub fn default_title(&self) -> &str {
        &self.toml.roadmap.default_title
    }

    pub fn strict_transitions(&self) -> bool {
        self.toml.roadmap.strict_transitions
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        warnings.extend(self.env_warnings.iter().cloned());
        warnings
    }
}
