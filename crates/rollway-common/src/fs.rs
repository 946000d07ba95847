// fs.rs — user-directory layout
//
// All writable game state lives under one per-user data directory:
// config, accounts, replays and downloaded addons. Paths are resolved
// once and handed around as a value so tests can point everything at a
// temp dir.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const REPLAY_DIR: &str = "Replays";
pub const REPLAY_EXT: &str = ".nbr";

#[derive(Debug, Clone)]
pub struct UserDirs {
    root: PathBuf,
}

impl UserDirs {
    /// Resolve the platform data directory for the game.
    pub fn locate(app: &str) -> io::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no user data directory")
        })?;
        Self::at(base.join(app))
    }

    /// Root the layout at an explicit directory.
    pub fn at(root: PathBuf) -> io::Result<Self> {
        let dirs = Self { root };
        fs::create_dir_all(dirs.replays())?;
        fs::create_dir_all(dirs.downloads())?;
        Ok(dirs)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("configrc")
    }

    pub fn account_file(&self) -> PathBuf {
        self.root.join("accountrc")
    }

    pub fn replays(&self) -> PathBuf {
        self.root.join(REPLAY_DIR)
    }

    pub fn replay_file(&self, name: &str) -> PathBuf {
        self.replays().join(format!("{name}{REPLAY_EXT}"))
    }

    pub fn downloads(&self) -> PathBuf {
        self.root.join(crate::package::PACKAGE_DIR)
    }
}

pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

pub fn file_rename(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// Write-then-rename so a crash mid-save never leaves a half-written
/// file where the real one was.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = UserDirs::at(dir.path().to_path_buf()).unwrap();
        assert!(dirs.replays().is_dir());
        assert!(dirs.downloads().is_dir());
        assert_eq!(dirs.replay_file("Last"), dirs.replays().join("Last.nbr"));
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accountrc");

        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two");
        assert!(!path.with_extension("tmp").exists());
    }
}
