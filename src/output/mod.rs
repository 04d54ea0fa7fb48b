//! Restore script rendering
//!
//! The restore script lets a consumer pull every mirrored image from the destination and
//! tag it back under its original name.

use crate::error::Result;
use crate::mirror::MirrorRecord;
use std::fmt::Write as _;
use std::path::Path;

const SHEBANG: &str = "#!/bin/sh";

/// Render the restore script for `records`, one block per record in the given order.
pub fn render_restore_script(records: &[MirrorRecord]) -> String {
    let mut script = String::from(SHEBANG);
    script.push('\n');

    for record in records {
        script.push('\n');
        if let Some(repository) = &record.repository {
            script.push_str("# if your repository is private, please login...\n");
            let _ = writeln!(
                script,
                "# docker login {} --username={{your username}}",
                repository
            );
        }
        let _ = writeln!(script, "docker pull {}", record.target);
        let _ = writeln!(script, "docker tag {} {}", record.target, record.source);
    }

    script
}

/// Write the restore script to `path` and make it executable.
pub async fn write_restore_script(path: &Path, records: &[MirrorRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, render_restore_script(records)).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    }

    Ok(())
}
