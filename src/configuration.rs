//! Process configuration, loaded from a TOML file.

pub mod config;

pub use config::Config;
