//! Per-platform image synchronization
//!
//! Every entry of a manifest list is pulled by digest, retagged for the destination and
//! pushed. A failure on one entry is logged and skipped; the remaining entries of the
//! same image are still attempted.

use crate::error::{MirrorError, Result};
use crate::logging::Logger;
use crate::mirror::manifest::{ManifestEntry, ManifestList};
use crate::mirror::target::split_tag;
use crate::registry::RegistryBackend;
use std::fmt;
use std::sync::Arc;

const DEFAULT_TAG: &str = "latest";

/// How platform variants are published at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Push each variant under `target-os-arch[-variant]`, then assemble a manifest list
    /// named `target` from them.
    PerPlatform,
    /// Push each variant straight to `target`. Each push replaces the previous one, so
    /// only the last pushed variant stays published.
    Direct,
}

impl SyncStrategy {
    pub fn from_multi_arch(multi_arch: bool) -> Self {
        if multi_arch {
            SyncStrategy::PerPlatform
        } else {
            SyncStrategy::Direct
        }
    }
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStrategy::PerPlatform => write!(f, "per-platform"),
            SyncStrategy::Direct => write!(f, "direct"),
        }
    }
}

/// What one image sync pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// References pushed to the destination, in manifest order.
    pub pushed: Vec<String>,
    /// Whether `pushed` are platform tags waiting to be combined into a manifest list.
    pub needs_assembly: bool,
}

/// `reference` pinned to `digest`, with any tag dropped.
pub fn digest_reference(reference: &str, digest: &str) -> String {
    format!("{}@{}", split_tag(reference).0, digest)
}

/// Platform-qualified destination tag: the platform suffix is appended to the tag.
pub fn platform_tag(destination: &str, suffix: &str) -> String {
    let (name, tag) = split_tag(destination);
    format!("{}:{}-{}", name, tag.unwrap_or(DEFAULT_TAG), suffix)
}

pub struct PlatformSyncWorker {
    backend: Arc<dyn RegistryBackend>,
    logger: Logger,
}

impl PlatformSyncWorker {
    pub fn new(backend: Arc<dyn RegistryBackend>, logger: Logger) -> Self {
        Self { backend, logger }
    }

    /// Sync every variant of `list` from `source` to `target`.
    ///
    /// Fails with the soft `PlatformSync` error only when nothing at all was pushed.
    pub async fn sync_image(
        &self,
        source: &str,
        target: &str,
        list: &ManifestList,
        strategy: SyncStrategy,
    ) -> Result<SyncReport> {
        if !list.is_multi_platform() {
            self.sync_single(source, target).await?;
            return Ok(SyncReport {
                pushed: vec![target.to_string()],
                needs_assembly: false,
            });
        }

        if strategy == SyncStrategy::Direct && list.manifests.len() > 1 {
            self.logger.warning(&format!(
                "{}: direct sync of {} platform variants to one tag keeps only the last one",
                target,
                list.manifests.len()
            ));
        }

        let mut report = SyncReport {
            pushed: Vec::with_capacity(list.manifests.len()),
            needs_assembly: strategy == SyncStrategy::PerPlatform,
        };

        let suffixes = list.platform_suffixes();
        for (i, entry) in list.manifests.iter().enumerate() {
            self.logger.detail(&format!(
                "[{}/{}] {} {}",
                i + 1,
                list.manifests.len(),
                source,
                entry.platform_label()
            ));

            let result = match strategy {
                SyncStrategy::PerPlatform => {
                    let qualified = platform_tag(target, &suffixes[i]);
                    if report.pushed.contains(&qualified) {
                        self.logger.warning(&format!(
                            "Skipped {} ({}): {} was already pushed for this image",
                            entry.digest,
                            entry.platform_label(),
                            qualified
                        ));
                        continue;
                    }
                    self.sync_platform(source, &qualified, entry).await
                }
                SyncStrategy::Direct => self
                    .sync_direct(source, target, entry)
                    .await
                    .map(|()| Some(target.to_string())),
            };

            match result {
                Ok(Some(pushed)) => report.pushed.push(pushed),
                Ok(None) => {}
                Err(e) if !e.is_fatal() => self.logger.warning(&format!("Skipped: {}", e)),
                Err(e) => return Err(e),
            }
        }

        if report.pushed.is_empty() {
            return Err(MirrorError::PlatformSync {
                reference: source.to_string(),
                platform: "all platforms".to_string(),
                message: "no platform variant could be pushed".to_string(),
            });
        }

        if strategy == SyncStrategy::Direct {
            report.pushed.dedup();
        }
        Ok(report)
    }

    /// Push one variant under the platform tag `qualified`. `Ok(None)` means the entry
    /// has no runnable platform and was left out.
    pub async fn sync_platform(
        &self,
        source: &str,
        qualified: &str,
        entry: &ManifestEntry,
    ) -> Result<Option<String>> {
        match &entry.platform {
            Some(platform) if !platform.is_unknown() => {}
            _ => {
                self.logger.detail(&format!(
                    "Ignoring {} ({}): not a runnable platform",
                    entry.digest,
                    entry.platform_label()
                ));
                return Ok(None);
            }
        }

        let pinned = digest_reference(source, &entry.digest);
        self.transfer(&pinned, qualified, &entry.platform_label())
            .await?;
        Ok(Some(qualified.to_string()))
    }

    /// Push one variant straight to `target`.
    pub async fn sync_direct(
        &self,
        source: &str,
        target: &str,
        entry: &ManifestEntry,
    ) -> Result<()> {
        let pinned = digest_reference(source, &entry.digest);
        self.transfer(&pinned, target, &entry.platform_label()).await
    }

    /// Mirror a reference that has no manifest list.
    pub async fn sync_single(&self, source: &str, target: &str) -> Result<()> {
        self.logger.detail(&format!(
            "{} is a single-platform image, mirroring it as is",
            source
        ));
        self.transfer(source, target, "single platform").await
    }

    async fn transfer(&self, from: &str, to: &str, platform: &str) -> Result<()> {
        let failed = |step: &str, e: MirrorError| MirrorError::PlatformSync {
            reference: from.to_string(),
            platform: platform.to_string(),
            message: format!("{} failed: {}", step, e),
        };

        self.backend
            .pull(from)
            .await
            .map_err(|e| failed("pull", e))?;
        self.backend
            .tag(from, to)
            .await
            .map_err(|e| failed("tag", e))?;
        self.backend
            .push(to)
            .await
            .map_err(|e| failed("push", e))?;

        self.logger.step(&format!("Pushed {} ({})", to, platform));
        Ok(())
    }
}
