//! Image mirroring pipeline
//!
//! For every source entry: [`resolve_target`] derives the destination,
//! [`ManifestInspector`] fetches the manifest list, [`PlatformSyncWorker`] copies each
//! platform variant and [`ManifestAssembler`] republishes the combined list.
//! [`MirrorOrchestrator`] runs all entries concurrently and collects the results.

pub mod assembler;
pub mod manifest;
pub mod orchestrator;
pub mod sync;
pub mod target;

pub use assembler::ManifestAssembler;
pub use manifest::{ManifestEntry, ManifestInspector, ManifestList, Platform};
pub use orchestrator::{MirrorOrchestrator, MirrorRecord};
pub use sync::{PlatformSyncWorker, SyncReport, SyncStrategy};
pub use target::{ResolvedTarget, resolve_target};
