//! Author: [Seclususs](https://github.com/seclususs)

use crate::config::defaults::{DEFAULT_MULTIFILE, DEFAULT_STARTUP};

use serde::Deserialize;

/// Declarative attributes of a file-backed preference, already resolved
/// against any resource tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferenceAttributes {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_path_list: Option<Vec<String>>,
    #[serde(default = "default_startup")]
    pub startup: bool,
    #[serde(default = "default_multifile")]
    pub multifile: bool,
}

fn default_startup() -> bool {
    DEFAULT_STARTUP
}

fn default_multifile() -> bool {
    DEFAULT_MULTIFILE
}

impl Default for PreferenceAttributes {
    fn default() -> Self {
        Self {
            file_path: None,
            file_path_list: None,
            startup: DEFAULT_STARTUP,
            multifile: DEFAULT_MULTIFILE,
        }
    }
}

impl PreferenceAttributes {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }
    pub fn with_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_path_list: Some(paths.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
    pub fn startup(mut self, startup: bool) -> Self {
        self.startup = startup;
        self
    }
    pub fn multifile(mut self, multifile: bool) -> Self {
        self.multifile = multifile;
        self
    }
}
