//! This file is part of DeviceControl.
//! Licensed under the GNU GPL v3 or later.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod common;
pub mod config;
pub mod controllers;
pub mod daemon;
pub mod hal;
pub mod registry;
pub mod utils;

pub use common::traits::{BootupStore, PathValidator, ValueFile};
pub use config::attributes::PreferenceAttributes;
pub use config::screen::PreferenceScreen;
pub use controllers::preference_impl::{AutoEditTextPreference, ChangeListener, Collaborators};
pub use controllers::preference_logic::Target;
pub use daemon::logging::init as init_logging;
pub use daemon::looper::{CancelToken, Looper};
pub use daemon::types::DevctlError;
pub use hal::sysfs::{AllowedRoots, SysfsFile, SysfsPathValidator};
pub use registry::bootup::{BootupEntry, JsonBootupStore, MemoryBootupStore};
