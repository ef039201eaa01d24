pub mod cli;
pub mod config;
pub mod operations;
pub mod store;
pub mod time;

pub use config::{Config, ConfigError};
pub use operations::{simulate, Command, Dispatcher, Output};
pub use store::{FileRecord, FileStore, SharedFileStore, StoreError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
