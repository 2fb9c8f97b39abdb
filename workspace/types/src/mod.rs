pub mod config;
pub mod defaults;
pub mod package;
pub mod package_type;
