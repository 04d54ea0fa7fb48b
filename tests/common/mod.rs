//! Shared test helpers: an in-memory registry backend that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use hub_mirror::config::{AuthConfig, MirrorConfig, MirrorContent};
use hub_mirror::error::{MirrorError, Result};
use hub_mirror::registry::RegistryBackend;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login {
        username: String,
        server: Option<String>,
    },
    Inspect(String),
    Pull(String),
    Tag(String, String),
    Push(String),
    CreateManifest(String, Vec<String>),
    PushManifest(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Pull,
    Tag,
    Push,
    CreateManifest,
    PushManifest,
}

#[derive(Default)]
pub struct MockRegistry {
    manifests: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    failures: HashSet<(Op, String)>,
    fail_login: bool,
    calls: Mutex<Vec<Call>>,
    /// Manifest lists as currently published: name -> members.
    published: Mutex<HashMap<String, Vec<String>>>,
}

/// Digest for the `index`-th platform of `reference`, unique per pair.
pub fn digest_for(reference: &str, index: usize) -> String {
    let seed: u64 = reference
        .bytes()
        .fold(index as u64 + 1, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
    format!("sha256:{:016x}{:048x}", seed, index)
}

/// `docker manifest inspect` style output for `platforms` given as (os, arch, variant).
pub fn manifest_list_json(reference: &str, platforms: &[(&str, &str, &str)]) -> String {
    let manifests: Vec<serde_json::Value> = platforms
        .iter()
        .enumerate()
        .map(|(i, (os, architecture, variant))| {
            let mut platform = serde_json::json!({ "architecture": architecture, "os": os });
            if !variant.is_empty() {
                platform["variant"] = serde_json::json!(variant);
            }
            serde_json::json!({
                "mediaType": "application/vnd.oci.image.manifest.v1+json",
                "size": 1024 + i,
                "digest": digest_for(reference, i),
                "platform": platform,
            })
        })
        .collect();

    serde_json::json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.oci.image.index.v1+json",
        "manifests": manifests,
    })
    .to_string()
}

pub const SINGLE_PLATFORM_JSON: &str = r#"{
    "schemaVersion": 2,
    "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
    "config": {
        "mediaType": "application/vnd.docker.container.image.v1+json",
        "size": 1469,
        "digest": "sha256:0000000000000000000000000000000000000000000000000000000000000001"
    },
    "layers": []
}"#;

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a linux/amd64 + linux/arm64 manifest list for `reference`.
    pub fn with_image(self, reference: &str) -> Self {
        self.with_platforms(reference, &[("linux", "amd64", ""), ("linux", "arm64", "v8")])
    }

    pub fn with_platforms(mut self, reference: &str, platforms: &[(&str, &str, &str)]) -> Self {
        self.manifests
            .insert(reference.to_string(), manifest_list_json(reference, platforms));
        self
    }

    pub fn with_raw_manifest(mut self, reference: &str, raw: &str) -> Self {
        self.manifests.insert(reference.to_string(), raw.to_string());
        self
    }

    pub fn with_delay(mut self, reference: &str, delay: Duration) -> Self {
        self.delays.insert(reference.to_string(), delay);
        self
    }

    pub fn failing(mut self, op: Op, reference: &str) -> Self {
        self.failures.insert((op, reference.to_string()));
        self
    }

    pub fn failing_login(mut self) -> Self {
        self.fail_login = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Push(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self, list: &str) -> Option<Vec<String>> {
        self.published.lock().unwrap().get(list).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op, reference: &str) -> Result<()> {
        if self.failures.contains(&(op, reference.to_string())) {
            return Err(MirrorError::Command(format!(
                "{:?} {} rejected by mock registry",
                op, reference
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryBackend for MockRegistry {
    async fn login(&self, auth: &AuthConfig, server: Option<&str>) -> Result<()> {
        self.record(Call::Login {
            username: auth.username.clone(),
            server: server.map(str::to_string),
        });
        if self.fail_login {
            return Err(MirrorError::Authentication(
                "unauthorized: incorrect username or password".to_string(),
            ));
        }
        Ok(())
    }

    async fn inspect_manifest(&self, reference: &str) -> Result<String> {
        self.record(Call::Inspect(reference.to_string()));
        if let Some(delay) = self.delays.get(reference) {
            tokio::time::sleep(*delay).await;
        }
        self.manifests
            .get(reference)
            .cloned()
            .ok_or_else(|| MirrorError::Command(format!("no such manifest: {}", reference)))
    }

    async fn pull(&self, reference: &str) -> Result<()> {
        self.record(Call::Pull(reference.to_string()));
        self.check(Op::Pull, reference)
    }

    async fn tag(&self, source: &str, target: &str) -> Result<()> {
        self.record(Call::Tag(source.to_string(), target.to_string()));
        self.check(Op::Tag, target)
    }

    async fn push(&self, reference: &str) -> Result<()> {
        self.record(Call::Push(reference.to_string()));
        self.check(Op::Push, reference)
    }

    async fn create_manifest(&self, list: &str, members: &[String]) -> Result<()> {
        self.record(Call::CreateManifest(list.to_string(), members.to_vec()));
        self.check(Op::CreateManifest, list)
    }

    async fn push_manifest(&self, list: &str) -> Result<()> {
        self.record(Call::PushManifest(list.to_string()));
        self.check(Op::PushManifest, list)?;

        let members = self
            .calls()
            .into_iter()
            .rev()
            .find_map(|c| match c {
                Call::CreateManifest(name, members) if name == list => Some(members),
                _ => None,
            })
            .unwrap_or_default();
        // Amend semantics: a republished list replaces the previous one.
        self.published
            .lock()
            .unwrap()
            .insert(list.to_string(), members);
        Ok(())
    }
}

pub fn auth() -> AuthConfig {
    AuthConfig::new("alice".to_string(), "secret".to_string())
}

pub fn config(images: &[&str]) -> MirrorConfig {
    MirrorConfig::new(
        MirrorContent::new(images.iter().map(|s| s.to_string()).collect()),
        auth(),
    )
}
