//! Author: [Seclususs](https://github.com/seclususs)

/// Installs the log backend. Called once by the embedding entry point.
#[cfg(target_os = "android")]
pub fn init() {
    use android_logger::Config;
    use log::LevelFilter;

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };
    android_logger::init_once(
        Config::default()
            .with_tag("DeviceControl")
            .with_max_level(level),
    );
}

// Host builds leave backend selection to the embedding binary.
#[cfg(not(target_os = "android"))]
pub fn init() {}
