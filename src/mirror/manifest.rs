//! Manifest list model and inspection
//!
//! Mirrors the JSON printed by `docker manifest inspect` for a multi-platform
//! reference. A single-platform image manifest parses too, with no `manifests` entries.

use crate::error::{MirrorError, Result};
use crate::logging::Logger;
use crate::registry::RegistryBackend;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestList {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub manifests: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub size: i64,
    pub digest: String,
    #[serde(default)]
    pub platform: Option<Platform>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub os: String,
    #[serde(rename = "os.version", default, skip_serializing_if = "String::is_empty")]
    pub os_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
}

impl Platform {
    /// Tag suffix for this platform: `os-architecture[-variant]`.
    pub fn tag_suffix(&self) -> String {
        if self.variant.is_empty() {
            format!("{}-{}", self.os, self.architecture)
        } else {
            format!("{}-{}-{}", self.os, self.architecture, self.variant)
        }
    }

    /// Build attestation manifests are published with an `unknown` platform.
    pub fn is_unknown(&self) -> bool {
        self.os.is_empty()
            || self.architecture.is_empty()
            || self.os == "unknown"
            || self.architecture == "unknown"
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)?;
        if !self.variant.is_empty() {
            write!(f, "/{}", self.variant)?;
        }
        Ok(())
    }
}

impl ManifestEntry {
    /// Platform label for log lines.
    pub fn platform_label(&self) -> String {
        self.platform
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown platform".to_string())
    }
}

impl ManifestList {
    /// Parse inspect output for `reference`. Duplicate digests are a parse fault.
    pub fn parse(reference: &str, raw: &str) -> Result<Self> {
        let list: ManifestList =
            serde_json::from_str(raw).map_err(|e| MirrorError::ManifestParse {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        let mut seen = HashSet::new();
        for entry in &list.manifests {
            if !seen.insert(entry.digest.as_str()) {
                return Err(MirrorError::ManifestParse {
                    reference: reference.to_string(),
                    message: format!("duplicate digest {}", entry.digest),
                });
            }
        }

        Ok(list)
    }

    pub fn is_multi_platform(&self) -> bool {
        !self.manifests.is_empty()
    }

    /// Tag suffix for every entry, in manifest order.
    ///
    /// Runnable entries that share `os-architecture[-variant]` (Windows images built for
    /// several OS versions) get their `os.version` appended. Entries without a platform
    /// yield an empty suffix.
    pub fn platform_suffixes(&self) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for platform in self.runnable_platforms() {
            *counts.entry(platform.tag_suffix()).or_default() += 1;
        }

        self.manifests
            .iter()
            .map(|entry| match &entry.platform {
                Some(platform) => {
                    let suffix = platform.tag_suffix();
                    let shared = counts.get(&suffix).is_some_and(|&n| n > 1);
                    if shared && !platform.is_unknown() && !platform.os_version.is_empty() {
                        format!("{}-{}", suffix, platform.os_version)
                    } else {
                        suffix
                    }
                }
                None => String::new(),
            })
            .collect()
    }

    fn runnable_platforms(&self) -> impl Iterator<Item = &Platform> {
        self.manifests
            .iter()
            .filter_map(|entry| entry.platform.as_ref())
            .filter(|platform| !platform.is_unknown())
    }
}

/// Fetches and parses the manifest list of a source reference.
pub struct ManifestInspector {
    backend: Arc<dyn RegistryBackend>,
    logger: Logger,
}

impl ManifestInspector {
    pub fn new(backend: Arc<dyn RegistryBackend>, logger: Logger) -> Self {
        Self { backend, logger }
    }

    /// A failed inspect call yields the soft `Inspect` error; output that does not
    /// parse yields the fatal `ManifestParse` error.
    pub async fn inspect(&self, reference: &str) -> Result<ManifestList> {
        let raw = self
            .backend
            .inspect_manifest(reference)
            .await
            .map_err(|e| MirrorError::Inspect {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        let list = ManifestList::parse(reference, &raw)?;
        if list.is_multi_platform() {
            self.logger.detail(&format!(
                "{}: {} platform manifests ({})",
                reference,
                list.manifests.len(),
                list.manifests
                    .iter()
                    .map(ManifestEntry::platform_label)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        } else {
            self.logger
                .detail(&format!("{}: single-platform image manifest", reference));
        }
        Ok(list)
    }
}
