//! Registry module for mirror transport
//!
//! The mirror logic never talks to a registry directly. It goes through
//! [`RegistryBackend`], which covers login, manifest inspection, image pull/tag/push and
//! manifest list creation and publishing. [`DockerCli`] implements it on top of the
//! `docker` command line.

pub mod docker;

pub use crate::config::AuthConfig;
pub use docker::DockerCli;

use crate::error::Result;
use async_trait::async_trait;

/// Registry capabilities consumed by the mirror pipeline.
///
/// Implementations are shared by every concurrent mirror task, so every method takes
/// `&self` and must be safe to call in parallel.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Authenticate against `server`, or the default registry when `None`.
    async fn login(&self, auth: &AuthConfig, server: Option<&str>) -> Result<()>;

    /// Fetch the raw manifest (list) JSON for `reference`.
    async fn inspect_manifest(&self, reference: &str) -> Result<String>;

    async fn pull(&self, reference: &str) -> Result<()>;

    /// Add `target` as a new name for the local image `source`.
    async fn tag(&self, source: &str, target: &str) -> Result<()>;

    async fn push(&self, reference: &str) -> Result<()>;

    /// Create the manifest list `list` from `members`, replacing any earlier local list
    /// of the same name.
    async fn create_manifest(&self, list: &str, members: &[String]) -> Result<()>;

    /// Publish the manifest list `list` and drop its local build state.
    async fn push_manifest(&self, list: &str) -> Result<()>;
}
