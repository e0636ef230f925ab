pub mod filesystem;
pub mod sysfs;
