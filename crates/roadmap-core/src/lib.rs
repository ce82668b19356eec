//! Derived-state engine for the roadmap tracker.
//!
//! The crate is pure and synchronous: it owns the node model, the tree
//! index used by every view, the progress and status engines, the schema
//! backfill run at startup and the data behind the board/grid/timeline
//! projections. Persistence and HTTP live in the `roadmap` crate.

pub mod error;
pub mod migrate;
pub mod model;
pub mod progress;
pub mod projection;
pub mod seed;
pub mod status;
pub mod tree;

pub use error::TreeError;
pub use model::{ChildCollection, Node, NodeKind};
pub use progress::{ProgressReport, ProgressSource, compute_progress, progress_source};
pub use status::{Status, StatusInsight};
pub use tree::{NodeUpdate, Roadmap};
