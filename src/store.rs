//! JSON document store for the roadmap.
//!
//! The whole tree lives in one pretty-printed file and is read and written
//! wholesale. Saves go through a sibling temp file and a rename so readers
//! never see a half-written document, and an exclusive lock on
//! `<file>.lock` serialises writers across processes. Concurrent saves are
//! last-write-wins.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use roadmap_core::migrate::{self, MigrationReport};
use roadmap_core::seed::{default_roadmap, empty_roadmap};
use roadmap_core::{Node, Roadmap, TreeError};
use serde::{Deserialize, Serialize};

use crate::errors::{RoadmapError, StoreError};

/// On-disk and over-the-wire envelope of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapDocument {
    pub roadmap: Node,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl RoadmapDocument {
    pub fn new(roadmap: Node) -> Self {
        Self {
            roadmap,
            last_modified: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    roadmap: &'a Node,
}

/// Pretty-printed `{ "roadmap": ... }` for download.
pub fn export_document(root: &Node) -> Result<String, StoreError> {
    serde_json::to_string_pretty(&ExportDocument { roadmap: root }).map_err(StoreError::Serialize)
}

pub struct RoadmapStore {
    path: PathBuf,
    default_title: String,
}

impl RoadmapStore {
    pub fn new(path: impl Into<PathBuf>, default_title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_title: default_title.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    pub fn load(&self) -> Result<RoadmapDocument, StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Load the document, or the empty roadmap when it is missing or
    /// unreadable. Read-only views use this so a broken file still renders.
    pub fn load_or_default(&self) -> RoadmapDocument {
        self.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load roadmap, showing an empty one");
            RoadmapDocument::new(empty_roadmap(&self.default_title))
        })
    }

    /// Write `root` as the new document, stamping `lastModified`.
    pub fn save(&self, root: &Node) -> Result<RoadmapDocument, StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let _lock = self.lock()?;
        let document = RoadmapDocument::new(root.clone());
        let content = serde_json::to_string_pretty(&document).map_err(StoreError::Serialize)?;
        let tmp = self.sibling(".tmp");
        std::fs::write(&tmp, content).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        tracing::info!(
            path = %self.path.display(),
            nodes = roadmap_core::model::count_all(root),
            "Roadmap saved"
        );
        Ok(document)
    }

    fn lock(&self) -> Result<FileLock, StoreError> {
        let path = self.lock_path();
        let lock_err = |source| StoreError::Lock {
            path: path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(lock_err)?;
        file.lock_exclusive().map_err(lock_err)?;
        Ok(FileLock(file))
    }

    /// Write the sample roadmap unless a document already exists. Returns
    /// whether anything was written.
    pub fn initialize(&self, force: bool) -> Result<bool, StoreError> {
        if self.exists() && !force {
            tracing::debug!(path = %self.path.display(), "Roadmap already initialized");
            return Ok(false);
        }
        self.save(&default_roadmap(&self.default_title))?;
        tracing::info!(path = %self.path.display(), "Roadmap initialized with sample data");
        Ok(true)
    }

    /// Backfill `status` and `progressWeight` on the stored tree, saving only
    /// when something changed.
    pub fn migrate(&self) -> Result<MigrationReport, StoreError> {
        let mut document = self.load()?;
        let report = migrate::backfill(&mut document.roadmap);
        if report.is_noop() {
            tracing::debug!("Roadmap schema up to date");
        } else {
            self.save(&document.roadmap)?;
            tracing::info!(
                statuses = report.statuses_backfilled,
                weights = report.weights_backfilled,
                "Roadmap migrated"
            );
        }
        Ok(report)
    }

    /// What [`RoadmapStore::migrate`] would change.
    pub fn plan_migration(&self) -> Result<MigrationReport, StoreError> {
        Ok(migrate::plan(&self.load()?.roadmap))
    }
}

struct FileLock(File);

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

/// Async-safe handle to the store.
///
/// Wraps `RoadmapStore` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so file I/O never ties up
/// async worker threads. The mutex also serialises load-modify-save cycles
/// within this process.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<RoadmapStore>>,
}

impl StoreHandle {
    pub fn new(store: RoadmapStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a closure with access to the store on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R, RoadmapError>
    where
        F: FnOnce(&RoadmapStore) -> Result<R, RoadmapError> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = store.lock().map_err(|_| RoadmapError::LockPoisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| RoadmapError::TaskFailed(e.to_string()))?
    }

    /// Evaluate `f` against the stored tree.
    pub async fn read<F, R>(&self, f: F) -> Result<R, RoadmapError>
    where
        F: FnOnce(&Roadmap) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.call(move |store| {
            let document = store.load()?;
            Ok(f(&Roadmap::new(document.roadmap)))
        })
        .await
    }

    /// Load, mutate and save. Nothing is written when `f` fails.
    pub async fn modify<F, R>(&self, f: F) -> Result<R, RoadmapError>
    where
        F: FnOnce(&mut Roadmap) -> Result<R, TreeError> + Send + 'static,
        R: Send + 'static,
    {
        self.call(move |store| {
            let mut roadmap = Roadmap::new(store.load()?.roadmap);
            let result = f(&mut roadmap)?;
            store.save(roadmap.root())?;
            Ok(result)
        })
        .await
    }
}
