//! Configuration, saved settings, and per-command context assembly.

pub mod app_config;
pub mod context;
pub mod settings;

pub use app_config::{AppConfig, ConfigStore};
pub use settings::*;
