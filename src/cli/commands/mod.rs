//! CLI command implementations

pub mod config;
pub mod ingest;
pub mod show;
pub mod status;

pub use config::execute as config;
pub use ingest::execute as ingest;
pub use show::execute as show;
pub use status::execute as status;
