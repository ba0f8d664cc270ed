//! Configuration management module
//!
//! Responsible for loading the provider configuration file and the
//! environment-driven service settings

pub mod file;
pub mod settings;

pub use file::{AppConfig, ProviderConfig, ServerConfig};
pub use settings::{LoggingConfig, Settings};
