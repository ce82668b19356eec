//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled      |
//! |------------|-----------------------|
//! | `serve`    | `Serve`               |
//! | `init`     | `Init`                |
//! | `status`   | `Status`, `Check`     |
//! | `export`   | `Export`              |
//! | `migrate`  | `Migrate`             |
//! | `config`   | `Config`              |

pub mod config;
pub mod export;
pub mod init;
pub mod migrate;
pub mod serve;
pub mod status;

pub use config::cmd_config;
pub use export::cmd_export;
pub use init::cmd_init;
pub use migrate::cmd_migrate;
pub use serve::cmd_serve;
pub use status::{cmd_check, cmd_status};

use roadmap::config::RoadmapConfig;
use roadmap::store::RoadmapStore;
use roadmap_core::Roadmap;

pub(crate) fn open_store(config: &RoadmapConfig) -> RoadmapStore {
    RoadmapStore::new(&config.data_file, config.default_title())
}

/// Load the stored tree for a read-only view, or print a hint and return
/// `None` when there is no data file yet. An unreadable file shows as the
/// empty roadmap.
pub(crate) fn load_roadmap(config: &RoadmapConfig) -> Option<Roadmap> {
    let store = open_store(config);
    if !store.exists() {
        print_missing(&store);
        return None;
    }
    Some(Roadmap::new(store.load_or_default().roadmap))
}

pub(crate) fn print_missing(store: &RoadmapStore) {
    println!();
    println!("No roadmap found at {}", store.path().display());
    println!("Run 'roadmap init' to create one.");
    println!();
}
