//! Command-line argument parsing

use crate::config::{
    AuthConfig, DEFAULT_MAX_CONTENT, DEFAULT_OUTPUT_PATH, MirrorConfig, MirrorContent,
};
use crate::error::Result;
use crate::mirror::SyncStrategy;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "hub-mirror")]
#[command(about = "Mirror multi-platform Docker images into another registry namespace")]
#[command(version)]
pub struct Args {
    /// Source images, formatted as { "hub-mirror": [] }
    #[arg(long = "content", help = r#"Source images, formatted as { "hub-mirror": [] }"#)]
    pub content: String,

    /// Maximum number of entries allowed in content
    #[arg(
        long = "maxContent",
        visible_alias = "max-content",
        default_value_t = DEFAULT_MAX_CONTENT,
        help = "Maximum number of entries allowed in content"
    )]
    pub max_content: usize,

    /// Registry username
    #[arg(
        long = "username",
        help = "Registry username, also the default destination namespace"
    )]
    pub username: Option<String>,

    /// Registry password
    #[arg(long = "password", help = "Registry password or access token")]
    pub password: Option<String>,

    /// Restore script path
    #[arg(
        long = "outputPath",
        visible_alias = "output-path",
        default_value = DEFAULT_OUTPUT_PATH,
        help = "Where to write the restore script"
    )]
    pub output_path: String,

    /// Destination repository
    #[arg(
        long = "repository",
        default_value = "",
        help = "Destination registry/namespace; empty pushes under the username on Docker Hub"
    )]
    pub repository: String,

    /// Publish per-platform tags and a combined manifest list
    #[arg(
        long = "multiArch",
        visible_alias = "multi-arch",
        default_value_t = true,
        action = ArgAction::Set,
        help = "Push per-platform tags and assemble a manifest list (false pushes every platform to one tag)"
    )]
    pub multi_arch: bool,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Fill credentials and repository from the environment when not given as flags
    pub fn from_env(mut self) -> Self {
        if self.username.is_none() {
            self.username = std::env::var("HUB_MIRROR_USERNAME").ok();
        }

        if self.password.is_none() {
            self.password = std::env::var("HUB_MIRROR_PASSWORD").ok();
        }

        if self.repository.is_empty() {
            if let Ok(repository) = std::env::var("HUB_MIRROR_REPOSITORY") {
                self.repository = repository;
            }
        }

        if std::env::var("HUB_MIRROR_VERBOSE").is_ok() {
            self.verbose = true;
        }

        self
    }

    /// Parse `content` and assemble the run configuration.
    ///
    /// Credentials are checked later, by [`MirrorConfig::validate`], so that an
    /// oversized payload is reported first.
    pub fn into_config(self) -> Result<MirrorConfig> {
        let content = MirrorContent::parse(&self.content)?;
        let auth = AuthConfig::new(
            self.username.unwrap_or_default(),
            self.password.unwrap_or_default(),
        );

        Ok(MirrorConfig::new(content, auth)
            .with_max_content(self.max_content)
            .with_repository(Some(self.repository))
            .with_output_path(self.output_path)
            .with_strategy(SyncStrategy::from_multi_arch(self.multi_arch)))
    }
}
