//! Integration tests for the roadmap CLI
//!
//! These drive the built binary against temporary project directories.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A roadmap command isolated from overrides in the caller's environment.
fn roadmap() -> Command {
    let mut cmd = cargo_bin_cmd!("roadmap");
    cmd.env_remove("PORT")
        .env_remove("ROADMAP_DATA_FILE")
        .env_remove("ROADMAP_LOG_JSON")
        .env_remove("RUST_LOG");
    cmd
}

fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

fn init_project(dir: &TempDir) {
    roadmap()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
}

fn write_data_file(dir: &TempDir, json: &str) {
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("roadmap.json"), json).unwrap();
}

const LEGACY: &str = r#"{
  "roadmap": {
    "id": "root",
    "title": "Legacy",
    "type": "root",
    "progress": 50,
    "axes": [
      { "id": "axis-1", "title": "Search", "type": "axis", "progress": 20 }
    ]
  }
}"#;

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_roadmap_help() {
        roadmap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"));
    }

    #[test]
    fn test_roadmap_version() {
        roadmap().arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        roadmap().arg("frobnicate").assert().failure();
    }
}

// =============================================================================
// Init
// =============================================================================

mod init {
    use super::*;

    #[test]
    fn test_init_creates_data_file() {
        let dir = create_temp_project();

        roadmap()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized roadmap"));

        let content = fs::read_to_string(dir.path().join("data/roadmap.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["roadmap"]["id"], "root");
        assert_eq!(doc["roadmap"]["axes"].as_array().unwrap().len(), 3);
        assert!(doc["lastModified"].is_string());
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = create_temp_project();
        write_data_file(&dir, LEGACY);

        roadmap()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("already initialized"));

        let content = fs::read_to_string(dir.path().join("data/roadmap.json")).unwrap();
        assert_eq!(content, LEGACY);
    }

    #[test]
    fn test_init_force_replaces_existing() {
        let dir = create_temp_project();
        write_data_file(&dir, LEGACY);

        roadmap()
            .current_dir(dir.path())
            .args(["init", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Replaced"));

        let content = fs::read_to_string(dir.path().join("data/roadmap.json")).unwrap();
        assert!(!content.contains("Legacy"));
    }

    #[test]
    fn test_init_with_project_dir_flag() {
        let dir = create_temp_project();

        roadmap()
            .arg("--project-dir")
            .arg(dir.path())
            .arg("init")
            .assert()
            .success();

        assert!(dir.path().join("data/roadmap.json").exists());
    }

    #[test]
    fn test_dotenv_sets_data_file() {
        let dir = create_temp_project();
        fs::write(dir.path().join(".env"), "ROADMAP_DATA_FILE=store/plan.json\n").unwrap();

        init_project(&dir);

        assert!(dir.path().join("store/plan.json").exists());
        assert!(!dir.path().join("data/roadmap.json").exists());
    }
}

// =============================================================================
// Status and check
// =============================================================================

mod status {
    use super::*;

    #[test]
    fn test_status_without_data_file() {
        let dir = create_temp_project();

        roadmap()
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No roadmap found"));
    }

    #[test]
    fn test_status_shows_axes() {
        let dir = create_temp_project();
        init_project(&dir);

        roadmap()
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("CustomGPT Expansion & Enhancement"))
            .stdout(predicate::str::contains("Overall progress: 0%"))
            .stdout(predicate::str::contains("Knowledge Retrieval Enhancement"));
    }

    #[test]
    fn test_status_aggregates_progress() {
        let dir = create_temp_project();
        write_data_file(
            &dir,
            r#"{"roadmap": {"id": "root", "title": "Plan", "type": "root", "axes": [
                {"id": "a", "title": "Alpha", "type": "axis", "progress": 40},
                {"id": "b", "title": "Beta", "type": "axis", "progress": 80}
            ]}}"#,
        );

        roadmap()
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Overall progress: 60%"))
            .stdout(predicate::str::contains("Active axes:      2 of 2"));
    }

    #[test]
    fn test_status_with_unreadable_file_shows_empty_roadmap() {
        let dir = create_temp_project();
        write_data_file(&dir, "{ not json");

        roadmap()
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("CustomGPT Expansion & Enhancement"))
            .stdout(predicate::str::contains("No axes yet."))
            .stderr(predicate::str::contains("Failed to load roadmap"));

        let content = fs::read_to_string(dir.path().join("data/roadmap.json")).unwrap();
        assert_eq!(content, "{ not json");
    }

    #[test]
    fn test_check_clean_roadmap() {
        let dir = create_temp_project();
        init_project(&dir);

        roadmap()
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("No divergent items"));
    }

    #[test]
    fn test_check_reports_divergence() {
        let dir = create_temp_project();
        write_data_file(
            &dir,
            r#"{"roadmap": {"id": "root", "title": "Plan", "type": "root",
                "progress": 10, "status": "completed", "axes": []}}"#,
        );

        roadmap()
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stdout(predicate::str::contains("marked completed at 10%"))
            .stdout(predicate::str::contains("suggested"))
            .stderr(predicate::str::contains("disagrees with their progress"));
    }
}

// =============================================================================
// Export and migrate
// =============================================================================

mod data {
    use super::*;

    #[test]
    fn test_export_to_file() {
        let dir = create_temp_project();
        init_project(&dir);
        let out = dir.path().join("export.json");

        roadmap()
            .current_dir(dir.path())
            .arg("export")
            .arg("--output")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Exported roadmap"));

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(doc["roadmap"]["id"], "root");
        assert!(doc.get("lastModified").is_none());
    }

    #[test]
    fn test_export_to_stdout() {
        let dir = create_temp_project();
        init_project(&dir);

        roadmap()
            .current_dir(dir.path())
            .arg("export")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("{"))
            .stdout(predicate::str::contains("\"roadmap\""));
    }

    #[test]
    fn test_export_unreadable_file_fails() {
        let dir = create_temp_project();
        write_data_file(&dir, "{ not json");

        roadmap()
            .current_dir(dir.path())
            .arg("export")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load"));
    }

    #[test]
    fn test_migrate_dry_run_writes_nothing() {
        let dir = create_temp_project();
        write_data_file(&dir, LEGACY);

        roadmap()
            .current_dir(dir.path())
            .args(["migrate", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Would backfill status on 2 node(s) and progressWeight on 2 node(s)",
            ));

        let content = fs::read_to_string(dir.path().join("data/roadmap.json")).unwrap();
        assert_eq!(content, LEGACY);
    }

    #[test]
    fn test_migrate_backfills_once() {
        let dir = create_temp_project();
        write_data_file(&dir, LEGACY);

        roadmap()
            .current_dir(dir.path())
            .arg("migrate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Backfilled status on 2 node(s)"));

        let content = fs::read_to_string(dir.path().join("data/roadmap.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["roadmap"]["status"], "review");
        assert_eq!(doc["roadmap"]["axes"][0]["status"], "in_progress");
        assert_eq!(doc["roadmap"]["axes"][0]["progressWeight"], 1.0);

        roadmap()
            .current_dir(dir.path())
            .arg("migrate")
            .assert()
            .success()
            .stdout(predicate::str::contains("up to date"));
    }
}

// =============================================================================
// Config
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_init_creates_file() {
        let dir = create_temp_project();

        roadmap()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created roadmap.toml"));

        let content = fs::read_to_string(dir.path().join("roadmap.toml")).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("port = 3001"));

        roadmap()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();

        roadmap()
            .current_dir(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("No roadmap.toml found"))
            .stdout(predicate::str::contains("port = 3001"));
    }

    #[test]
    fn test_config_show_env_override() {
        let dir = create_temp_project();

        roadmap()
            .current_dir(dir.path())
            .env("PORT", "4100")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 4100"));
    }

    #[test]
    fn test_config_validate_defaults() {
        let dir = create_temp_project();

        roadmap()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid."));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = create_temp_project();
        fs::write(
            dir.path().join("roadmap.toml"),
            "[server]\nhost = \"not a host\"\n",
        )
        .unwrap();

        roadmap()
            .current_dir(dir.path())
            .env("PORT", "eighty")
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Invalid server.host"))
            .stdout(predicate::str::contains("Ignoring invalid PORT"));
    }

    #[test]
    fn test_malformed_config_fails() {
        let dir = create_temp_project();
        fs::write(dir.path().join("roadmap.toml"), "[server\nport = ").unwrap();

        roadmap()
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("roadmap.toml"));
    }
}
