//! Author: [Seclususs](https://github.com/seclususs)

use std::{error, fmt, io};

#[derive(Debug)]
pub enum DevctlError {
    IoError(io::Error),
    InvalidPath(String),
    PermissionDenied(String),
    InvalidInput(String),
    ConfigError(String),
    StoreError(String),
}

impl fmt::Display for DevctlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevctlError::IoError(e) => write!(f, "I/O Error: {e}"),
            DevctlError::InvalidPath(s) => write!(f, "Invalid Path: {s}"),
            DevctlError::PermissionDenied(s) => write!(f, "Permission Denied: {s}"),
            DevctlError::InvalidInput(s) => write!(f, "Invalid Input: {s}"),
            DevctlError::ConfigError(s) => write!(f, "Config Error: {s}"),
            DevctlError::StoreError(s) => write!(f, "Bootup Store Error: {s}"),
        }
    }
}

impl error::Error for DevctlError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DevctlError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DevctlError {
    fn from(err: io::Error) -> Self {
        DevctlError::IoError(err)
    }
}

impl From<rustix::io::Errno> for DevctlError {
    fn from(err: rustix::io::Errno) -> Self {
        DevctlError::IoError(err.into())
    }
}

impl From<toml::de::Error> for DevctlError {
    fn from(err: toml::de::Error) -> Self {
        DevctlError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for DevctlError {
    fn from(err: serde_json::Error) -> Self {
        DevctlError::StoreError(err.to_string())
    }
}
