//! Author: [Seclususs](https://github.com/seclususs)

//! TOML description of a preference screen.
//!
//! ```toml
//! [strings]
//! governor = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor"
//!
//! [arrays]
//! read_ahead = ["/sys/block/mmcblk0/queue/read_ahead_kb", "/sys/block/sda/queue/read_ahead_kb"]
//!
//! [[preference]]
//! key = "cpu_governor"
//! file_path = "@string/governor"
//!
//! [[preference]]
//! key = "read_ahead"
//! file_path_list = "@array/read_ahead"
//! multifile = true
//! ```

use crate::config::attributes::PreferenceAttributes;
use crate::config::defaults::{
    ARRAY_RESOURCE_PREFIX, DEFAULT_MULTIFILE, DEFAULT_STARTUP, STRING_RESOURCE_PREFIX,
};
use crate::controllers::preference_impl::{AutoEditTextPreference, Collaborators};
use crate::daemon::looper::Looper;
use crate::daemon::types;

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::{fs, path};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathListSource {
    Inline(Vec<String>),
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferenceEntry {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_path_list: Option<PathListSource>,
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

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferenceScreen {
    #[serde(default)]
    pub strings: HashMap<String, String>,
    #[serde(default)]
    pub arrays: HashMap<String, Vec<String>>,
    #[serde(default, rename = "preference")]
    pub preferences: Vec<PreferenceEntry>,
}

impl PreferenceScreen {
    pub fn from_toml_str(content: &str) -> Result<Self, types::DevctlError> {
        let screen: PreferenceScreen = toml::from_str(content)?;
        screen.check_keys()?;
        Ok(screen)
    }

    fn check_keys(&self) -> Result<(), types::DevctlError> {
        let mut seen = HashSet::new();
        for entry in &self.preferences {
            if entry.key.trim().is_empty() {
                return Err(types::DevctlError::ConfigError(
                    "Preference with empty key".to_string(),
                ));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(types::DevctlError::ConfigError(format!(
                    "Duplicate preference key: {}",
                    entry.key
                )));
            }
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<path::Path>) -> Result<Self, types::DevctlError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn resolve_string(&self, raw: &str) -> Result<String, types::DevctlError> {
        match raw.strip_prefix(STRING_RESOURCE_PREFIX) {
            Some(name) => self.strings.get(name).cloned().ok_or_else(|| {
                types::DevctlError::ConfigError(format!("Unknown string resource: {raw}"))
            }),
            None => Ok(raw.to_string()),
        }
    }

    fn resolve_list(&self, source: &PathListSource) -> Result<Vec<String>, types::DevctlError> {
        match source {
            PathListSource::Inline(paths) => {
                paths.iter().map(|p| self.resolve_string(p)).collect()
            }
            PathListSource::Reference(raw) => {
                let name = raw.strip_prefix(ARRAY_RESOURCE_PREFIX).ok_or_else(|| {
                    types::DevctlError::ConfigError(format!("Expected an array resource: {raw}"))
                })?;
                self.arrays.get(name).cloned().ok_or_else(|| {
                    types::DevctlError::ConfigError(format!("Unknown array resource: {raw}"))
                })
            }
        }
    }

    pub fn resolve_attributes(
        &self,
        entry: &PreferenceEntry,
    ) -> Result<PreferenceAttributes, types::DevctlError> {
        Ok(PreferenceAttributes {
            file_path: entry
                .file_path
                .as_deref()
                .map(|p| self.resolve_string(p))
                .transpose()?,
            file_path_list: entry
                .file_path_list
                .as_ref()
                .map(|l| self.resolve_list(l))
                .transpose()?,
            startup: entry.startup,
            multifile: entry.multifile,
        })
    }

    /// Creates one preference per entry and loads its current value.
    pub fn build(
        &self,
        collaborators: &Collaborators,
        looper: &Rc<Looper>,
    ) -> Result<Vec<AutoEditTextPreference>, types::DevctlError> {
        let mut prefs = Vec::with_capacity(self.preferences.len());
        for entry in &self.preferences {
            let attrs = self.resolve_attributes(entry)?;
            let pref = AutoEditTextPreference::new(
                entry.key.as_str(),
                &attrs,
                collaborators.clone(),
                Rc::clone(looper),
            );
            pref.load_current_value();
            prefs.push(pref);
        }
        log::info!(
            "Screen: {} preferences, {} supported",
            prefs.len(),
            prefs.iter().filter(|p| p.is_supported()).count()
        );
        Ok(prefs)
    }
}
