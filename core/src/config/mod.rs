pub mod attributes;
pub mod defaults;
pub mod screen;
