//! Author: [Seclususs](https://github.com/seclususs)

use crate::daemon::types::DevctlError;
use crate::registry::bootup::BootupEntry;

/// Resolves raw configured paths into usable ones. `None` means no usable path.
pub trait PathValidator {
    fn check_path(&self, raw: &str) -> Option<String>;
    /// Returns the first usable path of `raw`, if any.
    fn check_paths(&self, raw: &[String]) -> Option<String> {
        raw.iter().find_map(|p| self.check_path(p))
    }
}

/// One-line text files such as sysfs and procfs nodes.
#[cfg_attr(test, mockall::automock)]
pub trait ValueFile {
    fn read_one_line(&self, path: &str) -> Result<String, DevctlError>;
    fn write_value(&self, path: &str, value: &str) -> Result<(), DevctlError>;
}

pub trait BootupStore {
    fn set_bootup(&self, entry: BootupEntry) -> Result<(), DevctlError>;
}
