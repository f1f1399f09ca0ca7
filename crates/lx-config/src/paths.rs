//! On-disk layout: a single directory holding the TOML config, the PID file
//! of a running `lexgated` and the SQLite key-value database.

use std::path::PathBuf;

use anyhow::Context;

const DIR_NAME: &str = ".lexgate";
const CONFIG_FILE: &str = "config.toml";
const PID_FILE: &str = "lexgated.pid";
const STORE_FILE: &str = "kv.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// `~/.lexgate`.
    pub fn from_home() -> anyhow::Result<Self> {
        let home = dirs::home_dir().context("no home directory to place .lexgate in")?;
        Ok(Self::at(home.join(DIR_NAME)))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn pid_path(&self) -> PathBuf {
        self.root.join(PID_FILE)
    }

    /// Default database location when the config does not name one.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_FILE)
    }

    /// Creates the directory, parents included. A no-op if it exists.
    pub fn create_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_side_by_side() {
        let paths = ConfigPaths::at("/srv/lexgate");
        assert_eq!(paths.config_path(), PathBuf::from("/srv/lexgate/config.toml"));
        assert_eq!(paths.pid_path(), PathBuf::from("/srv/lexgate/lexgated.pid"));
        assert_eq!(paths.store_path(), PathBuf::from("/srv/lexgate/kv.db"));
    }

    #[test]
    fn home_layout_uses_dot_lexgate() {
        if let Ok(paths) = ConfigPaths::from_home() {
            assert!(paths.config_path().ends_with(".lexgate/config.toml"));
        }
    }

    #[test]
    fn create_dir_makes_parents_and_tolerates_reruns() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a").join("b");
        let paths = ConfigPaths::at(&root);

        paths.create_dir().unwrap();
        paths.create_dir().unwrap();
        assert!(root.is_dir());
    }
}
