//! Author: [Seclususs](https://github.com/seclususs)

use crate::daemon::types;
use crate::utils::strings;

use std::{fs, io, path};

pub const DEFAULT_ALLOWED_ROOTS: [&str; 2] = ["/proc/", "/sys/"];

const MAX_VALUE_LEN: usize = 4095;

pub fn validate_path_secure(
    path_str: &str,
    allowed_roots: &[path::PathBuf],
) -> Result<path::PathBuf, types::DevctlError> {
    let path = path::Path::new(path_str);
    let canonical_path = fs::canonicalize(path).map_err(|e| {
        types::DevctlError::InvalidPath(format!("Path resolution failed for {path_str}: {e}"))
    })?;
    if allowed_roots
        .iter()
        .any(|root| canonical_path.starts_with(root))
    {
        Ok(canonical_path)
    } else {
        Err(types::DevctlError::PermissionDenied(format!(
            "Access denied: {}",
            canonical_path.display()
        )))
    }
}

pub fn open_file_for_read(
    path: &str,
    allowed_roots: &[path::PathBuf],
) -> Result<fs::File, types::DevctlError> {
    validate_path_secure(path, allowed_roots)?;
    fs::OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(types::DevctlError::IoError)
}

pub fn read_one_line(
    path: &str,
    allowed_roots: &[path::PathBuf],
) -> Result<String, types::DevctlError> {
    let file = open_file_for_read(path, allowed_roots)?;
    let mut line = String::new();
    io::BufRead::read_line(&mut io::BufReader::new(file), &mut line).map_err(|e| {
        log::debug!("Read failed for {path}: {e}");
        types::DevctlError::IoError(e)
    })?;
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(line)
}

pub fn write_value(
    path: &str,
    value: &str,
    allowed_roots: &[path::PathBuf],
) -> Result<(), types::DevctlError> {
    validate_path_secure(path, allowed_roots)?;
    if !strings::validate_value(value) {
        return Err(types::DevctlError::InvalidInput(format!(
            "Invalid characters in value for {path}: '{value}'"
        )));
    }
    if value.len() > MAX_VALUE_LEN {
        return Err(types::DevctlError::InvalidInput(format!(
            "Value too long for {path}: {} bytes",
            value.len()
        )));
    }
    let mut payload = Vec::with_capacity(value.len() + 1);
    payload.extend_from_slice(value.as_bytes());
    payload.push(b'\n');
    let fd = rustix::fs::openat(
        rustix::fs::CWD,
        path,
        rustix::fs::OFlags::WRONLY | rustix::fs::OFlags::TRUNC | rustix::fs::OFlags::CLOEXEC,
        rustix::fs::Mode::empty(),
    )
    .map_err(|e| {
        log::debug!("Openat failed for {path}: {e}");
        types::DevctlError::from(e)
    })?;
    rustix::io::write(&fd, &payload).map_err(|e| {
        log::debug!("Write raw failed '{value}' -> {path}: {e}");
        types::DevctlError::from(e)
    })?;
    Ok(())
}
