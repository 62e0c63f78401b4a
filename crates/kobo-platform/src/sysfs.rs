//! Device file access.
//! Real sysfs/procfs on the device, an alternate root on a host, or the
//! in-memory [`MockSysFs`](crate::mock_sysfs::MockSysFs) for tests.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::SysFsError;

/// Trait for reading and writing small device files
///
/// Implementations:
/// - [`HostSysFs`] for the real filesystem
/// - `MockSysFs` for simulators and tests
pub trait SysFs: Send + Sync {
    /// Read a whole file as a string
    ///
    /// # Arguments
    /// * `path` - Absolute device path (e.g., "/sys/class/power_supply/battery/capacity")
    fn read_to_string(&self, path: &str) -> Result<String, SysFsError>;

    /// Replace the contents of a file
    fn write(&self, path: &str, value: &str) -> Result<(), SysFsError>;

    /// Read a file and trim surrounding whitespace
    fn read_trimmed(&self, path: &str) -> Result<String, SysFsError> {
        self.read_to_string(path).map(|raw| raw.trim().to_string())
    }
}

/// Filesystem-backed [`SysFs`] rooted at a directory
#[derive(Debug, Clone)]
pub struct HostSysFs {
    root: PathBuf,
}

impl HostSysFs {
    /// Access files under `root`; device paths are resolved relative to it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The live device root (`/`).
    pub fn device() -> Self {
        Self::new("/")
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Default for HostSysFs {
    fn default() -> Self {
        Self::device()
    }
}

fn map_io(path: &str, err: std::io::Error) -> SysFsError {
    if err.kind() == ErrorKind::NotFound {
        SysFsError::NotFound(path.to_string())
    } else {
        SysFsError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

impl SysFs for HostSysFs {
    fn read_to_string(&self, path: &str) -> Result<String, SysFsError> {
        fs::read_to_string(self.resolve(path)).map_err(|err| map_io(path, err))
    }

    fn write(&self, path: &str, value: &str) -> Result<(), SysFsError> {
        fs::write(self.resolve(path), value).map_err(|err| map_io(path, err))
    }
}
