//! Shared helpers used by the `lexgated` service binary.

use lx_config::ServiceConfig;
use lx_quota::{KvStore, SqliteKvStore, SystemClock};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Build-time service version string.
///
/// When `LEXGATED_VERSION` is provided in the build environment (for example
/// by CI release workflows), that value is used. Otherwise we fall back to the
/// crate package version.
pub const DAEMON_VERSION: &str = match option_env!("LEXGATED_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

// ---------------------------------------------------------------------------
// PID file management
// ---------------------------------------------------------------------------

/// Reads the service PID from `path`, returning `None` if missing or invalid.
pub fn read_pid_file(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Writes the current process PID to `path`.
pub fn write_pid_file(path: &Path) -> anyhow::Result<()> {
    fs::write(path, std::process::id().to_string())?;
    Ok(())
}

/// Removes the PID file at `path` if it exists.
pub fn remove_pid_file(path: &Path) {
    let _ = fs::remove_file(path);
}

/// Returns `true` when a process with `pid` appears to be alive.
pub fn is_process_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::kill(pid as i32, 0) == 0 }
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}

// ---------------------------------------------------------------------------
// Store maintenance
// ---------------------------------------------------------------------------

/// Deletes expired usage and entitlement entries from the configured store.
pub fn purge_store(config: &ServiceConfig) -> anyhow::Result<usize> {
    let path = config.resolved_store_path()?;
    if !path.exists() {
        anyhow::bail!("Store not found at {}", path.display());
    }
    let store = SqliteKvStore::open(&path, Arc::new(SystemClock))?;
    store.purge_expired()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lx_config::ConfigPaths;
    use std::time::Duration;

    #[test]
    fn read_pid_file_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pid");
        fs::write(&path, "12345").unwrap();
        assert_eq!(read_pid_file(&path), Some(12345));
    }

    #[test]
    fn read_pid_file_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pid");
        fs::write(&path, "999\n").unwrap();
        assert_eq!(read_pid_file(&path), Some(999));
    }

    #[test]
    fn read_pid_file_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_pid_file(&dir.path().join("missing.pid")), None);
    }

    #[test]
    fn read_pid_file_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pid");
        fs::write(&path, "not-a-pid").unwrap();
        assert_eq!(read_pid_file(&path), None);
    }

    #[test]
    fn write_read_remove_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexgated.pid");
        write_pid_file(&path).unwrap();
        assert_eq!(read_pid_file(&path), Some(std::process::id()));
        remove_pid_file(&path);
        assert!(!path.exists());
        remove_pid_file(&path);
    }

    #[test]
    fn is_process_alive_self() {
        assert!(is_process_alive(std::process::id()));
    }

    #[test]
    fn purge_store_missing_db_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.set_paths(ConfigPaths::at(dir.path()));
        assert!(purge_store(&config).is_err());
    }

    #[test]
    fn purge_store_keeps_live_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.set_paths(ConfigPaths::at(dir.path()));
        let path = config.resolved_store_path().unwrap();
        {
            let store = SqliteKvStore::open(&path, Arc::new(SystemClock)).unwrap();
            store
                .put("usage:c1:2026-01-01", "{}", Some(Duration::from_secs(3600)))
                .unwrap();
        }
        assert_eq!(purge_store(&config).unwrap(), 0);
    }
}
