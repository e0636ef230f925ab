//! Author: [Seclususs](https://github.com/seclususs)

pub const REFRESH_DELAY_MS: u64 = 200;
pub const BOOTUP_CATEGORY: &str = "default";
pub const DEFAULT_STARTUP: bool = true;
pub const DEFAULT_MULTIFILE: bool = false;
pub const STRING_RESOURCE_PREFIX: &str = "@string/";
pub const ARRAY_RESOURCE_PREFIX: &str = "@array/";
