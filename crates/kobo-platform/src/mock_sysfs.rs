//! Mock device files for simulators and tests
//!
//! Provides an in-memory [`SysFs`] so detection and power code can run
//! without a device.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::SysFsError;
use crate::sysfs::SysFs;

#[derive(Default)]
struct MockState {
    files: BTreeMap<String, String>,
    writes: Vec<(String, String)>,
    read_only: Vec<String>,
}

/// In-memory device files
///
/// Every write is recorded in order so tests can assert on what reached the
/// hardware.
#[derive(Default)]
pub struct MockSysFs {
    state: Mutex<MockState>,
}

impl MockSysFs {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock for a device that reports `code` in its version file
    pub fn with_device_code(code: u16) -> Self {
        let fs = Self::new();
        fs.set_device_code(code);
        fs
    }

    /// Add or replace a file
    pub fn add_file(&self, path: &str, content: &str) {
        self.lock().files.insert(path.to_string(), content.to_string());
    }

    /// Remove a file so reads report `NotFound`
    pub fn remove_file(&self, path: &str) {
        self.lock().files.remove(path);
    }

    /// Make writes to `path` fail with an I/O error
    pub fn make_read_only(&self, path: &str) {
        self.lock().read_only.push(path.to_string());
    }

    /// Write a Kobo version file carrying `code` as device id
    pub fn set_device_code(&self, code: u16) {
        self.add_file(
            crate::device::VERSION_FILE,
            &format!(
                "N000000000000,4.1.15,4.38.21908,4.1.15,4.1.15,00000000-0000-0000-0000-000000000{code:03}\n"
            ),
        );
    }

    /// Current content of a file
    pub fn contents(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).cloned()
    }

    /// All writes so far, oldest first
    pub fn writes(&self) -> Vec<(String, String)> {
        self.lock().writes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SysFs for MockSysFs {
    fn read_to_string(&self, path: &str) -> Result<String, SysFsError> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| SysFsError::NotFound(path.to_string()))
    }

    fn write(&self, path: &str, value: &str) -> Result<(), SysFsError> {
        let mut state = self.lock();
        if state.read_only.iter().any(|p| p == path) {
            return Err(SysFsError::Io {
                path: path.to_string(),
                message: String::from("Permission denied"),
            });
        }
        state.files.insert(path.to_string(), value.to_string());
        state.writes.push((path.to_string(), value.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_recorded_and_readable() {
        let fs = MockSysFs::new();
        fs.write("/sys/a", "1").unwrap();
        fs.write("/sys/a", "2").unwrap();
        assert_eq!(fs.read_to_string("/sys/a").unwrap(), "2");
        assert_eq!(fs.writes().len(), 2);
    }

    #[test]
    fn read_only_files_reject_writes() {
        let fs = MockSysFs::new();
        fs.add_file("/sys/a", "1");
        fs.make_read_only("/sys/a");
        assert!(fs.write("/sys/a", "2").is_err());
        assert_eq!(fs.contents("/sys/a").as_deref(), Some("1"));
    }
}
