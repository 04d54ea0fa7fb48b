//! `docker` command line backend

use crate::config::AuthConfig;
use crate::error::{MirrorError, Result};
use crate::logging::Logger;
use crate::registry::RegistryBackend;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const DEFAULT_BINARY: &str = "docker";

struct CommandOutput {
    stdout: String,
    stderr: String,
}

/// Registry backend that shells out to the docker CLI.
///
/// Holds no mutable state, so one instance can serve every mirror task.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    logger: Logger,
}

impl DockerCli {
    pub fn new(logger: Logger) -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            logger,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<CommandOutput> {
        let command_line = format!("{} {}", self.binary, args.join(" "));
        self.logger.debug(&format!("Running: {}", command_line));

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                MirrorError::Command(format!("Failed to start `{}`: {}", command_line, e))
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            // A child that exits without reading stdin closes the pipe early.
            if let Err(e) = pipe.write_all(input.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
            drop(pipe);
        }

        let output = child.wait_with_output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let reason = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            return Err(MirrorError::Command(format!(
                "`{}` exited with {}: {}",
                command_line, output.status, reason
            )));
        }

        Ok(CommandOutput { stdout, stderr })
    }

    fn log_tail(&self, output: &CommandOutput) {
        if let Some(line) = output.stdout.lines().rev().find(|l| !l.trim().is_empty()) {
            self.logger.detail(line.trim());
        }
        if !output.stderr.trim().is_empty() {
            self.logger.debug(output.stderr.trim());
        }
    }
}

#[async_trait]
impl RegistryBackend for DockerCli {
    async fn login(&self, auth: &AuthConfig, server: Option<&str>) -> Result<()> {
        let mut args = vec!["login", "--username", auth.username.as_str(), "--password-stdin"];
        if let Some(server) = server {
            args.push(server);
        }
        let output = self
            .run(&args, Some(auth.password.as_str()))
            .await
            .map_err(|e| MirrorError::Authentication(e.to_string()))?;
        self.log_tail(&output);
        Ok(())
    }

    async fn inspect_manifest(&self, reference: &str) -> Result<String> {
        let output = self.run(&["manifest", "inspect", reference], None).await?;
        Ok(output.stdout)
    }

    async fn pull(&self, reference: &str) -> Result<()> {
        let output = self.run(&["pull", reference], None).await?;
        self.log_tail(&output);
        Ok(())
    }

    async fn tag(&self, source: &str, target: &str) -> Result<()> {
        self.run(&["tag", source, target], None).await?;
        Ok(())
    }

    async fn push(&self, reference: &str) -> Result<()> {
        let output = self.run(&["push", reference], None).await?;
        self.log_tail(&output);
        Ok(())
    }

    async fn create_manifest(&self, list: &str, members: &[String]) -> Result<()> {
        let mut args = vec!["manifest", "create", "--amend", list];
        args.extend(members.iter().map(String::as_str));
        let output = self.run(&args, None).await?;
        self.log_tail(&output);
        Ok(())
    }

    async fn push_manifest(&self, list: &str) -> Result<()> {
        let output = self.run(&["manifest", "push", "--purge", list], None).await?;
        self.log_tail(&output);
        Ok(())
    }
}
