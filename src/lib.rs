//! kfzf - local cluster resource cache
//!
//! Keeps a continuously updated on-disk snapshot of cluster resources, one
//! file per resource type, so shell completion can answer from disk without
//! calling the API server.

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod resources;
pub mod store;
pub mod ui;

pub use error::{KfzfError, KfzfResult};
pub use resources::{K8sResource, Resource, ResourceType};
pub use store::{Store, StoreConfig, StoreState};
