//! Destination name derivation
//!
//! A source entry is either a plain reference (`nginx:latest`) or a reference with an
//! override name (`foo/bar:1.0$myalias`). The destination is always
//! `<namespace>/<stem>`, where the stem has every `/` replaced by `.` so that nested
//! source paths fit registries that only allow one level under the namespace.

use crate::error::{MirrorError, Result};

pub const OVERRIDE_DELIMITER: char = '$';
const DIGEST_DELIMITER: char = '@';

/// Effective source and derived destination for one content entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Reference used for inspect and pull (override suffix removed).
    pub source: String,
    pub target: String,
}

/// Derive the destination reference for `entry` under `namespace`.
///
/// Rejected override forms: more than one `$`, an empty side, an override name that
/// carries its own tag, and a base reference without a tag to borrow. Digest-pinned
/// sources (`name@sha256:...`) are rejected too, since a digest cannot become a tag.
pub fn resolve_target(entry: &str, namespace: &str) -> Result<ResolvedTarget> {
    if entry.contains(DIGEST_DELIMITER) {
        return Err(MirrorError::Configuration(format!(
            "'{}' is pinned by digest, mirror it by tag instead",
            entry
        )));
    }

    let (source, stem) = match entry.split_once(OVERRIDE_DELIMITER) {
        Some((base, alias)) => {
            if alias.contains(OVERRIDE_DELIMITER) {
                return Err(invalid_override(entry, "more than one '$' delimiter"));
            }
            if base.is_empty() || alias.is_empty() {
                return Err(invalid_override(entry, "both sides of '$' must be non-empty"));
            }
            if alias.contains(':') {
                return Err(invalid_override(
                    entry,
                    "override name must not carry a tag, the source tag is reused",
                ));
            }
            let tag = split_tag(base)
                .1
                .ok_or_else(|| invalid_override(entry, "source has no tag to reuse"))?;
            (base.to_string(), format!("{}:{}", alias, tag))
        }
        None => (entry.to_string(), entry.to_string()),
    };

    let target = format!("{}/{}", namespace, stem.replace('/', "."));
    Ok(ResolvedTarget { source, target })
}

/// Split a reference into name and tag.
///
/// A `@digest` suffix is dropped first, so `nginx@sha256:abc` is the name `nginx`
/// with no tag. The tag is then whatever follows the last `:`, as long as no `/`
/// follows it, so a registry port (`localhost:5000/app`) is not mistaken for a tag.
pub fn split_tag(reference: &str) -> (&str, Option<&str>) {
    let reference = reference
        .split_once(DIGEST_DELIMITER)
        .map_or(reference, |(name, _)| name);
    match reference.rsplit_once(':') {
        Some((name, tag)) if !tag.is_empty() && !tag.contains('/') => (name, Some(tag)),
        _ => (reference, None),
    }
}

fn invalid_override(entry: &str, reason: &str) -> MirrorError {
    MirrorError::Configuration(format!("invalid override in '{}': {}", entry, reason))
}
