pub mod logging;
pub mod looper;
pub mod types;
