//! Shuttle - A personal SSH connection manager
//!
//! Keeps an address book of providers, projects and hosts in a local JSON
//! store, and moves it between machines through password-protected exports.

pub mod config;
pub mod launch;
pub mod store;
pub mod transfer;

pub use config::{AppSettings, Element, Project, Provider, ShuttleData, TerminalApp};
pub use launch::{ssh_command, ConnectionDescriptor, TerminalLauncher};
pub use store::{DataStore, ImportSummary, MergeStats, SearchHit};
pub use transfer::{ImportFile, ImportMode, ImportPreview, ImportPrompt, TransferError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
