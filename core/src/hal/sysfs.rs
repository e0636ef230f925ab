//! Author: [Seclususs](https://github.com/seclususs)

use crate::common::traits::{PathValidator, ValueFile};
use crate::daemon::types;
use crate::hal::filesystem;
use crate::utils::strings;

use std::{fs, path};

#[derive(Debug, Clone)]
pub struct AllowedRoots(Vec<path::PathBuf>);

impl AllowedRoots {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<path::Path>,
    {
        let roots = roots
            .into_iter()
            .map(|r| fs::canonicalize(r.as_ref()).unwrap_or_else(|_| r.as_ref().to_path_buf()))
            .collect();
        Self(roots)
    }
    pub fn as_slice(&self) -> &[path::PathBuf] {
        &self.0
    }
}

impl Default for AllowedRoots {
    fn default() -> Self {
        Self::new(filesystem::DEFAULT_ALLOWED_ROOTS)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SysfsPathValidator {
    roots: AllowedRoots,
}

impl SysfsPathValidator {
    pub fn new(roots: AllowedRoots) -> Self {
        Self { roots }
    }
}

impl PathValidator for SysfsPathValidator {
    fn check_path(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if strings::is_blank(raw) {
            return None;
        }
        match filesystem::validate_path_secure(raw, self.roots.as_slice()) {
            Ok(_) => Some(raw.to_string()),
            Err(e) => {
                log::debug!("Path check failed: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SysfsFile {
    roots: AllowedRoots,
}

impl SysfsFile {
    pub fn new(roots: AllowedRoots) -> Self {
        Self { roots }
    }
}

impl ValueFile for SysfsFile {
    fn read_one_line(&self, path: &str) -> Result<String, types::DevctlError> {
        filesystem::read_one_line(path, self.roots.as_slice())
    }
    fn write_value(&self, path: &str, value: &str) -> Result<(), types::DevctlError> {
        filesystem::write_value(path, value, self.roots.as_slice())
    }
}
