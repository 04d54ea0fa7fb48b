//! Hub Mirror Library
//!
//! Mirrors multi-platform container images into another registry namespace and writes a
//! restore script that maps every mirrored image back to its original name.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod output;
pub mod registry;

pub use config::{AuthConfig, MirrorConfig, MirrorContent};
pub use error::{MirrorError, Result};
pub use logging::Logger;
pub use mirror::{MirrorOrchestrator, MirrorRecord, SyncStrategy};
pub use registry::{DockerCli, RegistryBackend};
