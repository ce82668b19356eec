//! HTTP persistence gateway and view API for the roadmap.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │ Browser  │ ───────> │  server.rs  (axum Router, ServerConfig, static)  │
//! │ (public/)│ <─────── │    └─ api.rs  (route handlers, AppState)         │
//! └──────────┘          │         │                                        │
//!                       │         │ StoreHandle::read / modify             │
//!                       │         v                                        │
//!                       │  store.rs  (RoadmapStore, one JSON document)     │
//!                       │         │                                        │
//!                       │         │ Roadmap, projections, engines          │
//!                       │         v                                        │
//!                       │  roadmap-core                                    │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! Every request loads the document, works on it and, for mutations, saves
//! it back whole. There is no cache between requests.

pub mod api;
pub mod server;
