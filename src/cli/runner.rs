//! Runner for a complete mirror run

use crate::cli::args::Args;
use crate::config::MirrorConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::mirror::{MirrorOrchestrator, MirrorRecord};
use crate::output::write_restore_script;
use crate::registry::{DockerCli, RegistryBackend};
use std::sync::Arc;

pub struct Runner {
    config: Arc<MirrorConfig>,
    backend: Arc<dyn RegistryBackend>,
    output: Logger,
}

impl Runner {
    /// Build a runner that drives the local docker CLI.
    pub fn new(args: Args) -> Result<Self> {
        let output = Logger::new();
        let config = args.into_config()?;
        let backend = Arc::new(DockerCli::new(output.clone()));
        Ok(Self::with_backend(config, backend, output))
    }

    pub fn with_backend(
        config: MirrorConfig,
        backend: Arc<dyn RegistryBackend>,
        output: Logger,
    ) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            output,
        }
    }

    pub async fn run(&self) -> Result<Vec<MirrorRecord>> {
        self.output.section("Hub Mirror");

        self.validate_configuration()?;
        self.authenticate().await?;

        self.output.subsection("Mirroring images");
        let records = MirrorOrchestrator::new(
            Arc::clone(&self.config),
            Arc::clone(&self.backend),
            self.output.clone(),
        )
        .run()
        .await?;

        self.write_output(&records).await?;

        self.output.success(&format!(
            "Mirrored {} of {} images in {}",
            records.len(),
            self.config.content.sources().count(),
            self.output.elapsed()
        ));

        Ok(records)
    }

    fn validate_configuration(&self) -> Result<()> {
        self.output.subsection("Validating source content");

        self.config.validate()?;

        for (position, source) in self.config.content.sources() {
            self.output.detail(&format!("#{}: {}", position, source));
        }
        self.output.summary_kv(
            "Configuration",
            &[
                ("Images", self.config.content.sources().count().to_string()),
                ("Max content", self.config.max_content.to_string()),
                ("Namespace", self.config.namespace().to_string()),
                ("Strategy", self.config.strategy.to_string()),
                ("Output", self.config.output_path.display().to_string()),
            ],
        );
        Ok(())
    }

    async fn authenticate(&self) -> Result<()> {
        self.output.subsection("Authenticating");
        let server = self.config.repository.as_deref().and_then(registry_host);

        self.backend.login(&self.config.auth, server).await?;

        self.output.success(&format!(
            "Logged in to {} as {}",
            server.unwrap_or("Docker Hub"),
            self.config.auth.username
        ));
        Ok(())
    }

    async fn write_output(&self, records: &[MirrorRecord]) -> Result<()> {
        self.output.subsection("Writing restore script");
        write_restore_script(&self.config.output_path, records).await?;

        let items: Vec<(&str, String)> = records
            .iter()
            .map(|r| (r.source.as_str(), r.target.clone()))
            .collect();
        self.output.summary_kv("Mirrored images", &items);
        self.output.info(&format!(
            "Restore script written to {}",
            self.config.output_path.display()
        ));
        Ok(())
    }
}

/// Login server for a destination repository.
///
/// `registry.example.com/team` logs in to `registry.example.com`. A first segment that
/// does not look like a host (no `.` or `:`, and not `localhost`) is a Docker Hub
/// namespace, so `None` is returned.
fn registry_host(repository: &str) -> Option<&str> {
    let host = repository.split('/').next().unwrap_or(repository);
    if host.contains('.') || host.contains(':') || host == "localhost" {
        Some(host)
    } else {
        None
    }
}
