//! Connection Book Configuration
//!
//! Domain types, the JSON codec shared by the store file and export files,
//! and atomic persistence of the store file.

pub mod codec;
pub mod storage;
pub mod types;

pub use storage::{data_dir, store_file, write_atomic, ConfigStorage, StorageError};
pub use types::{
    AppSettings, Element, Project, Provider, ShuttleData, TerminalApp, DEFAULT_SSH_PORT,
};
