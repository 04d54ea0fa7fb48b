//! Configuration module for a mirror run
//!
//! [`MirrorConfig`] is built once from the command line and then passed by reference to
//! every stage. Nothing reads flags or environment after it is constructed.

use crate::error::{MirrorError, Result};
use crate::mirror::SyncStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MAX_CONTENT: usize = 10;
pub const DEFAULT_OUTPUT_PATH: &str = "output.sh";

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(MirrorError::Configuration(
                "username or password cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// The `content` payload: `{ "hub-mirror": [ "<source>", ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorContent {
    #[serde(rename = "hub-mirror", default)]
    pub images: Vec<String>,
}

impl MirrorContent {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            MirrorError::Configuration(format!("content is not valid hub-mirror JSON: {}", e))
        })
    }

    pub fn new(images: Vec<String>) -> Self {
        Self { images }
    }

    /// Total number of entries, blank ones included.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Non-blank entries paired with their position in the payload.
    pub fn sources(&self) -> impl Iterator<Item = (usize, &str)> {
        self.images
            .iter()
            .map(|s| s.trim())
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
    }
}

/// Immutable configuration for one mirror run
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub content: MirrorContent,
    pub max_content: usize,
    pub auth: AuthConfig,
    /// Destination registry/namespace. `None` pushes under the username.
    pub repository: Option<String>,
    pub output_path: PathBuf,
    pub strategy: SyncStrategy,
}

impl MirrorConfig {
    pub fn new(content: MirrorContent, auth: AuthConfig) -> Self {
        Self {
            content,
            max_content: DEFAULT_MAX_CONTENT,
            auth,
            repository: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            strategy: SyncStrategy::PerPlatform,
        }
    }

    pub fn with_max_content(mut self, max_content: usize) -> Self {
        self.max_content = max_content;
        self
    }

    /// Blank values are treated as unset.
    pub fn with_repository(mut self, repository: Option<String>) -> Self {
        self.repository = repository
            .map(|r| r.trim().trim_end_matches('/').to_string())
            .filter(|r| !r.is_empty());
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Namespace that prefixes every target reference.
    pub fn namespace(&self) -> &str {
        self.repository.as_deref().unwrap_or(&self.auth.username)
    }

    /// Reject a payload with more entries than `max_content`.
    pub fn check_capacity(&self) -> Result<()> {
        if self.content.len() > self.max_content {
            return Err(MirrorError::Configuration(format!(
                "content is too long: {} entries, at most {} allowed",
                self.content.len(),
                self.max_content
            )));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.check_capacity()?;
        self.auth.validate()
    }
}
