//! Concurrent mirroring of every content entry
//!
//! One tokio task per source image. Successful tasks append a [`MirrorRecord`] to a
//! mutex-guarded result set. Soft failures end a task without a record. The first
//! fatal failure is returned at once, and dropping the [`JoinSet`] aborts the tasks
//! still in flight.

use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::logging::Logger;
use crate::mirror::assembler::ManifestAssembler;
use crate::mirror::manifest::ManifestInspector;
use crate::mirror::sync::{PlatformSyncWorker, SyncStrategy};
use crate::mirror::target::{ResolvedTarget, resolve_target};
use crate::registry::RegistryBackend;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// One successfully mirrored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRecord {
    /// Effective source reference, the name restored by the restore script.
    pub source: String,
    pub target: String,
    pub repository: Option<String>,
    /// Position of the source entry in the content payload.
    pub position: usize,
}

pub struct MirrorOrchestrator {
    config: Arc<MirrorConfig>,
    backend: Arc<dyn RegistryBackend>,
    logger: Logger,
}

impl MirrorOrchestrator {
    pub fn new(
        config: Arc<MirrorConfig>,
        backend: Arc<dyn RegistryBackend>,
        logger: Logger,
    ) -> Self {
        Self {
            config,
            backend,
            logger,
        }
    }

    /// Resolve every non-blank entry. Any malformed entry fails the whole batch, and so
    /// do two entries that resolve to the same destination.
    pub fn resolve_all(&self) -> Result<Vec<(usize, ResolvedTarget)>> {
        let namespace = self.config.namespace();
        let jobs: Vec<(usize, ResolvedTarget)> = self
            .config
            .content
            .sources()
            .map(|(position, entry)| {
                resolve_target(entry, namespace).map(|resolved| (position, resolved))
            })
            .collect::<Result<_>>()?;

        check_unique_targets(&jobs)?;
        Ok(jobs)
    }

    /// Mirror every entry and return the records in content order.
    pub async fn run(&self) -> Result<Vec<MirrorRecord>> {
        self.config.check_capacity()?;
        let jobs = self.resolve_all()?;

        self.logger.info(&format!(
            "Mirroring {} images with the {} strategy",
            jobs.len(),
            self.config.strategy
        ));

        let records = Arc::new(Mutex::new(Vec::with_capacity(jobs.len())));
        let mut tasks = JoinSet::new();

        for (position, resolved) in jobs {
            let task = MirrorTask {
                position,
                resolved,
                repository: self.config.repository.clone(),
                strategy: self.config.strategy,
                backend: Arc::clone(&self.backend),
                logger: self.logger.clone(),
            };
            let records = Arc::clone(&records);

            tasks.spawn(async move {
                let source = task.resolved.source.clone();
                match task.execute().await {
                    Ok(record) => {
                        records.lock().await.push(record);
                        Ok(())
                    }
                    Err(e) if !e.is_fatal() => {
                        task.logger
                            .warning(&format!("Skipping {}: {}", source, e));
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(MirrorError::Task(e.to_string()));
                }
            }
        }

        let mut records = std::mem::take(&mut *records.lock().await);
        if records.is_empty() {
            return Err(MirrorError::EmptyResult);
        }
        records.sort_by_key(|r| r.position);
        Ok(records)
    }
}

fn check_unique_targets(jobs: &[(usize, ResolvedTarget)]) -> Result<()> {
    let mut claimed: HashMap<&str, usize> = HashMap::new();
    for (position, resolved) in jobs {
        if let Some(first) = claimed.insert(resolved.target.as_str(), *position) {
            return Err(MirrorError::Configuration(format!(
                "entries #{} and #{} both mirror to {}",
                first, position, resolved.target
            )));
        }
    }
    Ok(())
}

struct MirrorTask {
    position: usize,
    resolved: ResolvedTarget,
    repository: Option<String>,
    strategy: SyncStrategy,
    backend: Arc<dyn RegistryBackend>,
    logger: Logger,
}

impl MirrorTask {
    async fn execute(&self) -> Result<MirrorRecord> {
        let ResolvedTarget { source, target } = &self.resolved;
        self.logger
            .step(&format!("Mirroring {} => {}", source, target));

        let list = ManifestInspector::new(Arc::clone(&self.backend), self.logger.clone())
            .inspect(source)
            .await?;

        let report = PlatformSyncWorker::new(Arc::clone(&self.backend), self.logger.clone())
            .sync_image(source, target, &list, self.strategy)
            .await?;

        if report.needs_assembly {
            ManifestAssembler::new(Arc::clone(&self.backend), self.logger.clone())
                .assemble(target, &report.pushed)
                .await?;
        }

        self.logger
            .success(&format!("Mirrored {} => {}", source, target));
        Ok(MirrorRecord {
            source: source.clone(),
            target: target.clone(),
            repository: self.repository.clone(),
            position: self.position,
        })
    }
}
