//! Destination manifest list assembly

use crate::error::{MirrorError, Result};
use crate::logging::Logger;
use crate::registry::RegistryBackend;
use std::sync::Arc;

/// Combines pushed platform tags into one multi-architecture manifest list.
///
/// Any failure here leaves the destination list half published, so every error this
/// type returns is fatal.
pub struct ManifestAssembler {
    backend: Arc<dyn RegistryBackend>,
    logger: Logger,
}

impl ManifestAssembler {
    pub fn new(backend: Arc<dyn RegistryBackend>, logger: Logger) -> Self {
        Self { backend, logger }
    }

    pub async fn assemble(&self, list: &str, platform_tags: &[String]) -> Result<()> {
        let failed = |message: String| MirrorError::Assembly {
            list: list.to_string(),
            message,
        };

        if platform_tags.is_empty() {
            return Err(failed("no platform tags to combine".to_string()));
        }

        self.logger.detail(&format!(
            "Creating manifest list {} from {} platform tags",
            list,
            platform_tags.len()
        ));
        self.backend
            .create_manifest(list, platform_tags)
            .await
            .map_err(|e| failed(format!("create failed: {}", e)))?;

        self.backend
            .push_manifest(list)
            .await
            .map_err(|e| failed(format!("push failed: {}", e)))?;

        self.logger.step(&format!("Published manifest list {}", list));
        Ok(())
    }
}
