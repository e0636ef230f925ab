//! Author: [Seclususs](https://github.com/seclususs)

use crate::common::traits::PathValidator;
use crate::config::attributes::PreferenceAttributes;

/// Backing files of a preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Unsupported,
    Single(String),
    /// `primary` is the first usable entry of `paths` and is the one read back.
    Multi {
        primary: String,
        paths: Vec<String>,
    },
}

impl Target {
    /// A declared single path wins over a declared list. A list only stays a
    /// list when `multifile` is set and at least one entry validates.
    pub fn resolve(attrs: &PreferenceAttributes, validator: &dyn PathValidator) -> Self {
        if let Some(raw) = attrs.file_path.as_deref() {
            return Self::from_path(raw, validator).unwrap_or_default();
        }
        if let Some(raw) = attrs.file_path_list.as_deref() {
            return Self::from_paths(raw, attrs.multifile, validator).unwrap_or_default();
        }
        Target::Unsupported
    }

    pub fn from_path(raw: &str, validator: &dyn PathValidator) -> Option<Self> {
        validator.check_path(raw).map(Target::Single)
    }

    pub fn from_paths(
        raw: &[String],
        multifile: bool,
        validator: &dyn PathValidator,
    ) -> Option<Self> {
        let primary = validator.check_paths(raw)?;
        if multifile {
            let paths = raw
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            Some(Target::Multi { primary, paths })
        } else {
            Some(Target::Single(primary))
        }
    }

    pub fn is_supported(&self) -> bool {
        match self {
            Target::Unsupported => false,
            Target::Single(path) => !path.is_empty(),
            Target::Multi { primary, paths } => !primary.is_empty() || !paths.is_empty(),
        }
    }

    pub fn primary(&self) -> Option<&str> {
        match self {
            Target::Unsupported => None,
            Target::Single(path) | Target::Multi { primary: path, .. } => Some(path.as_str()),
        }
    }

    pub fn fan_out(&self) -> Option<&[String]> {
        match self {
            Target::Multi { paths, .. } => Some(paths.as_slice()),
            _ => None,
        }
    }
}
