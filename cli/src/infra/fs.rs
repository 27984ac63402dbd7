//! Filesystem helpers shared by the YAML-backed stores.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Per-user data directory (`~/.outline-gcp`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn data_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))
        .map(|h| h.join(".outline-gcp"))
}

/// Write `content` to `path` atomically (temp file then rename), readable by
/// the owner only.
///
/// # Errors
///
/// Returns an error if the directory, temp file, or rename fails.
pub fn write_private(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    std::fs::write(&temp_path, content)
        .with_context(|| format!("cannot write {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("cannot set permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("cannot finalize {}", path.display()))
}
